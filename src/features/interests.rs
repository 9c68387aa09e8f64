//! Activities the user has marked as interesting.
//!
//! DESIGN
//! ======
//! The list is a [`Resource`] like any other read. Mutations are only sent
//! with a credential (an anonymous user has no interest list to change) and
//! refresh the list afterwards so the resource reflects the backend.

#[cfg(test)]
#[path = "interests_test.rs"]
mod interests_test;

use async_trait::async_trait;
use reqwest::Method;

use crate::net::api::{ApiClient, ApiError, RequestOptions};
use crate::net::types::{Activity, InterestRequest};
use crate::state::resource::{Fetcher, Resource};

/// `GET /users/me/interests`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterestsFetcher;

#[async_trait]
impl Fetcher for InterestsFetcher {
    type Params = ();
    type Output = Vec<Activity>;

    const NAME: &'static str = "interests";

    async fn fetch(&self, api: &ApiClient, _params: &()) -> Result<Vec<Activity>, ApiError> {
        api.request_json("/users/me/interests", RequestOptions::get()).await
    }
}

fn interest_path(activity_id: i64) -> String {
    format!("/users/me/interests/{activity_id}")
}

#[derive(Clone)]
pub struct Interests {
    list: Resource<InterestsFetcher>,
}

impl Interests {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { list: Resource::new(api, InterestsFetcher) }
    }

    #[must_use]
    pub fn list(&self) -> &Resource<InterestsFetcher> {
        &self.list
    }

    /// Re-read the interest list.
    pub async fn fetch(&self) {
        self.list.refresh(&()).await;
    }

    #[must_use]
    pub fn contains(&self, activity_id: i64) -> bool {
        self.list.state().data.iter().any(|a| a.id == activity_id)
    }

    /// Mark `activity_id` as interesting.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a credential, otherwise the
    /// request's error.
    pub async fn add(&self, activity_id: i64) -> Result<(), ApiError> {
        self.mutate(Method::POST, activity_id).await
    }

    /// Remove `activity_id` from the interest list.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a credential, otherwise the
    /// request's error.
    pub async fn remove(&self, activity_id: i64) -> Result<(), ApiError> {
        self.mutate(Method::DELETE, activity_id).await
    }

    async fn mutate(&self, method: Method, activity_id: i64) -> Result<(), ApiError> {
        let api = self.list.api();
        if !api.session().is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let options = RequestOptions::method(method).json(&InterestRequest { activity_id });
        api.request(&interest_path(activity_id), options).await?;
        self.fetch().await;
        Ok(())
    }
}
