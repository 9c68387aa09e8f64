//! Transient toast message state.
//!
//! DESIGN
//! ======
//! One toast is visible at a time. Showing a new toast replaces the message
//! and restarts the hide timer, so a quick succession of toasts stays visible
//! for the full duration of the last one. The timer is a tokio task holding
//! only a weak reference; dropping the store cancels it.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
}

struct ToastInner {
    state: watch::Sender<Toast>,
    timer: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            timer.abort();
        }
    }
}

/// Cloneable handle; clones share the same toast.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastInner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Toast::default());
        Self { inner: Arc::new(ToastInner { state, timer: Mutex::new(None), generation: AtomicU64::new(0) }) }
    }

    #[must_use]
    pub fn current(&self) -> Toast {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Toast> {
        self.inner.state.subscribe()
    }

    /// Show `message` for `duration`, replacing any visible toast.
    ///
    /// Must be called within a tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        let mut timer = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(Toast { message: message.into(), kind, visible: true });

        let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.generation.load(Ordering::SeqCst) == generation {
                inner.state.send_modify(|toast| toast.visible = false);
            }
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success, DEFAULT_TOAST_DURATION);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error, DEFAULT_TOAST_DURATION);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info, DEFAULT_TOAST_DURATION);
    }

    /// Hide immediately and cancel the pending timer.
    pub fn dismiss(&self) {
        if let Some(timer) = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner).take() {
            timer.abort();
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_if_modified(|toast| {
            let was_visible = toast.visible;
            toast.visible = false;
            was_visible
        });
    }
}
