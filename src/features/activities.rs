//! Activity browsing.

#[cfg(test)]
#[path = "activities_test.rs"]
mod activities_test;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::net::api::{ApiClient, ApiError, RequestOptions};
use crate::net::types::Activity;
use crate::state::resource::{Fetcher, Resource};

/// Filter parameters sent as the `/activities` query string.
///
/// Keys are kept sorted so two queries with the same filters compare equal
/// regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityQuery(BTreeMap<String, String>);

impl ActivityQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActivityQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `GET /activities?<query>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivitiesFetcher;

#[async_trait]
impl Fetcher for ActivitiesFetcher {
    type Params = ActivityQuery;
    type Output = Vec<Activity>;

    const NAME: &'static str = "activities";

    async fn fetch(&self, api: &ApiClient, params: &ActivityQuery) -> Result<Vec<Activity>, ApiError> {
        api.request_json("/activities", RequestOptions::get().query(params.pairs())).await
    }
}

pub type ActivitiesFeed = Resource<ActivitiesFetcher>;

#[must_use]
pub fn activities_feed(api: ApiClient) -> ActivitiesFeed {
    Resource::new(api, ActivitiesFetcher)
}
