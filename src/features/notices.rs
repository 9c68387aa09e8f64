//! Notices about activities the user follows.

#[cfg(test)]
#[path = "notices_test.rs"]
mod notices_test;

use async_trait::async_trait;

use crate::net::api::{ApiClient, ApiError, RequestOptions};
use crate::net::types::Notice;
use crate::state::resource::{Fetcher, Resource};

/// `GET /notices`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoticesFetcher;

#[async_trait]
impl Fetcher for NoticesFetcher {
    type Params = ();
    type Output = Vec<Notice>;

    const NAME: &'static str = "notices";

    async fn fetch(&self, api: &ApiClient, _params: &()) -> Result<Vec<Notice>, ApiError> {
        api.request_json("/notices", RequestOptions::get()).await
    }
}

pub type Notices = Resource<NoticesFetcher>;

#[must_use]
pub fn notices(api: ApiClient) -> Notices {
    Resource::new(api, NoticesFetcher)
}

/// Notices attached to `activity_id`, in backend order.
#[must_use]
pub fn for_activity(notices: &[Notice], activity_id: i64) -> Vec<&Notice> {
    notices.iter().filter(|n| n.activity_id == Some(activity_id)).collect()
}
