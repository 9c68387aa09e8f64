//! Animated background state: decorative dots and expiring ripples.
//!
//! DESIGN
//! ======
//! Pure presentation state, no backend interaction. Ripples are appended with
//! a random palette color and removed by a per-ripple tokio timer once their
//! animation would have finished. The ambient "light rain" is a single
//! interval task; starting it twice keeps the first task. All timers hold weak
//! references, so dropping the store stops them.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

pub const RIPPLE_PALETTE: [&str; 4] = ["#EC4899", "#6366F1", "#F59E0B", "#2DD4BF"];
pub const AMBIENT_INTERVAL: Duration = Duration::from_millis(1500);
pub const CLICK_RIPPLE_LIFETIME: Duration = Duration::from_secs(2);
pub const AMBIENT_RIPPLE_LIFETIME: Duration = Duration::from_secs(4);
pub const CLICK_RIPPLE_OPACITY: f32 = 0.4;
pub const AMBIENT_RIPPLE_OPACITY: f32 = 0.2;

/// CSS-style placement of a decorative dot. Unset edges are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DotPosition {
    pub top: Option<&'static str>,
    pub left: Option<&'static str>,
    pub bottom: Option<&'static str>,
    pub right: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dot {
    pub id: u32,
    pub color: &'static str,
    /// Diameter in pixels.
    pub size: u32,
    /// Animation delay in seconds (negative starts mid-cycle).
    pub delay: i32,
    pub position: DotPosition,
}

#[must_use]
pub fn initial_dots() -> Vec<Dot> {
    vec![
        Dot {
            id: 1,
            color: "pink-500",
            size: 80,
            delay: 0,
            position: DotPosition { top: Some("10%"), left: Some("5%"), ..DotPosition::default() },
        },
        Dot {
            id: 2,
            color: "indigo-500",
            size: 56,
            delay: -3,
            position: DotPosition { bottom: Some("20%"), right: Some("10%"), ..DotPosition::default() },
        },
        Dot {
            id: 3,
            color: "yellow-500",
            size: 96,
            delay: -6,
            position: DotPosition { top: Some("50%"), left: Some("30%"), ..DotPosition::default() },
        },
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ripple {
    pub id: Uuid,
    /// Page coordinates in pixels.
    pub x: f64,
    pub y: f64,
    pub color: &'static str,
    pub opacity: f32,
    pub lifetime: Duration,
    pub ambient: bool,
}

/// Visible page area used to place ambient ripples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    pub dots: Vec<Dot>,
    pub ripples: Vec<Ripple>,
}

impl Default for Background {
    fn default() -> Self {
        Self { dots: initial_dots(), ripples: Vec::new() }
    }
}

struct BackgroundInner {
    state: watch::Sender<Background>,
    ambient: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundInner {
    fn create_ripple(self: &Arc<Self>, x: f64, y: f64, ambient: bool) -> Uuid {
        let (lifetime, opacity) = if ambient {
            (AMBIENT_RIPPLE_LIFETIME, AMBIENT_RIPPLE_OPACITY)
        } else {
            (CLICK_RIPPLE_LIFETIME, CLICK_RIPPLE_OPACITY)
        };
        let id = Uuid::new_v4();
        let color = RIPPLE_PALETTE[rand::rng().random_range(0..RIPPLE_PALETTE.len())];
        self.state.send_modify(|bg| {
            bg.ripples.push(Ripple { id, x, y, color, opacity, lifetime, ambient });
        });

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Some(inner) = weak.upgrade() {
                inner.state.send_modify(|bg| bg.ripples.retain(|r| r.id != id));
            }
        });
        id
    }
}

impl Drop for BackgroundInner {
    fn drop(&mut self) {
        if let Some(task) = self.ambient.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }
}

/// Cloneable handle; must be used within a tokio runtime.
#[derive(Clone)]
pub struct BackgroundStore {
    inner: Arc<BackgroundInner>,
}

impl Default for BackgroundStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Background::default());
        Self { inner: Arc::new(BackgroundInner { state, ambient: Mutex::new(None) }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Background {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Background> {
        self.inner.state.subscribe()
    }

    /// Add a ripple at `(x, y)` and schedule its removal.
    pub fn create_ripple(&self, x: f64, y: f64, ambient: bool) -> Uuid {
        self.inner.create_ripple(x, y, ambient)
    }

    /// Ripple on a background click. Clicks landing on page content are ignored.
    pub fn handle_click(&self, x: f64, y: f64, inside_content: bool) -> Option<Uuid> {
        if inside_content {
            return None;
        }
        Some(self.create_ripple(x, y, false))
    }

    /// Start ambient ripples at random points of `viewport`.
    /// Returns `false` if ambient ripples are already running.
    pub fn start_ambient(&self, viewport: Viewport) -> bool {
        let mut ambient = self.inner.ambient.lock().unwrap_or_else(PoisonError::into_inner);
        if ambient.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }

        let weak: Weak<BackgroundInner> = Arc::downgrade(&self.inner);
        *ambient = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + AMBIENT_INTERVAL, AMBIENT_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let (x, y) = random_point(viewport);
                inner.create_ripple(x, y, true);
            }
        }));
        true
    }

    /// Stop ambient ripples. Returns `false` if none were running.
    pub fn stop_ambient(&self) -> bool {
        match self.inner.ambient.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn ambient_running(&self) -> bool {
        self.inner
            .ambient
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

fn random_point(viewport: Viewport) -> (f64, f64) {
    let mut rng = rand::rng();
    let width = viewport.width.max(0.0);
    let height = (viewport.height + viewport.scroll_y).max(0.0);
    let x = if width > 0.0 { rng.random_range(0.0..width) } else { 0.0 };
    let y = if height > 0.0 { rng.random_range(0.0..height) } else { 0.0 };
    (x, y)
}
