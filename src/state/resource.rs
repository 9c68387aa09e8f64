//! Reactive backend-backed resource.
//!
//! DESIGN
//! ======
//! A [`Resource`] exposes `{ data, loading, error }` through a `watch`
//! channel and re-fetches when its declared dependencies change. The
//! dependency set is the [`Tracked`] type: the fetcher's own parameters plus
//! the session credential. Because every resource tracks the credential by
//! construction, none can serve results fetched under a previous login.
//!
//! With no credential the resource resets to the empty default without
//! issuing a request. Failures land in the `error` slot and never propagate
//! to the caller; previous data is kept while the credential is unchanged.
//! A credential switch clears the data before the new fetch starts. A result
//! whose fetch was superseded by a newer one is discarded.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::net::api::{ApiClient, ApiError};
use crate::state::session::Token;

/// Observable state of a resource.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<ApiError>,
}

/// Full dependency set of a resource fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked<P> {
    pub params: P,
    pub credential: Option<Token>,
}

/// One backend read. Implementors only see their declared parameters.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Params: Clone + PartialEq + Send + Sync + 'static;
    type Output: Clone + Default + Send + Sync + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    /// Fetch the resource for `params`.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the underlying request.
    async fn fetch(&self, api: &ApiClient, params: &Self::Params) -> Result<Self::Output, ApiError>;
}

struct ResourceInner<F: Fetcher> {
    fetcher: F,
    api: ApiClient,
    state: watch::Sender<ResourceState<F::Output>>,
    tracked: Mutex<Option<Tracked<F::Params>>>,
    generation: AtomicU64,
}

/// Cloneable handle; clones share state.
pub struct Resource<F: Fetcher> {
    inner: Arc<ResourceInner<F>>,
}

impl<F: Fetcher> Clone for Resource<F> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<F: Fetcher> Resource<F> {
    #[must_use]
    pub fn new(api: ApiClient, fetcher: F) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            inner: Arc::new(ResourceInner {
                fetcher,
                api,
                state,
                tracked: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> ResourceState<F::Output> {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn data(&self) -> F::Output {
        self.inner.state.borrow().data.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<F::Output>> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Dependency set the resource would fetch under right now.
    #[must_use]
    pub fn dependencies(&self, params: &F::Params) -> Tracked<F::Params> {
        Tracked { params: params.clone(), credential: self.inner.api.session().credential() }
    }

    /// Fetch unconditionally.
    pub async fn refresh(&self, params: &F::Params) {
        let deps = self.dependencies(params);
        self.run(deps).await;
    }

    /// Fetch only if the dependency set differs from the last fetch.
    /// Returns `true` when a fetch (or empty reset) ran.
    pub async fn sync(&self, params: &F::Params) -> bool {
        let deps = self.dependencies(params);
        {
            let tracked = self.inner.tracked.lock().unwrap_or_else(PoisonError::into_inner);
            if tracked.as_ref() == Some(&deps) {
                return false;
            }
        }
        self.run(deps).await;
        true
    }

    /// Keep the resource in sync with `params` and the session until either
    /// channel closes or the returned task is aborted.
    pub fn watch(&self, mut params: watch::Receiver<F::Params>) -> JoinHandle<()> {
        let resource = self.clone();
        let mut session = self.inner.api.session().subscribe();
        tokio::spawn(async move {
            loop {
                let current = params.borrow_and_update().clone();
                drop(session.borrow_and_update());
                resource.sync(&current).await;

                tokio::select! {
                    changed = params.changed() => if changed.is_err() { break },
                    changed = session.changed() => if changed.is_err() { break },
                }
            }
            tracing::debug!(resource = F::NAME, "resource watcher stopped");
        })
    }

    async fn run(&self, deps: Tracked<F::Params>) {
        let previous = self.inner.tracked.lock().unwrap_or_else(PoisonError::into_inner).replace(deps.clone());
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if deps.credential.is_none() {
            self.inner.state.send_modify(|state| {
                state.data = F::Output::default();
                state.loading = false;
                state.error = None;
            });
            return;
        }

        // Data fetched under another credential must not outlive the switch.
        let credential_changed = previous.is_some_and(|p| p.credential != deps.credential);
        self.inner.state.send_modify(|state| {
            if credential_changed {
                state.data = F::Output::default();
                state.error = None;
            }
            state.loading = true;
        });
        let result = self.inner.fetcher.fetch(&self.inner.api, &deps.params).await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(resource = F::NAME, "discarding superseded fetch result");
            return;
        }

        self.inner.state.send_modify(|state| {
            state.loading = false;
            match result {
                Ok(data) => {
                    state.data = data;
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!(resource = F::NAME, error = %e, "resource fetch failed");
                    state.error = Some(e);
                }
            }
        });
    }
}
