//! Current user's profile and account mutations.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::net::api::{ApiClient, ApiError, RequestOptions};
use crate::net::transport::FilePart;
use crate::net::types::{PasswordChange, ProfileUpdate, UserProfile};
use crate::state::resource::{Fetcher, Resource};

/// Multipart field name the backend reads the avatar from.
pub const AVATAR_FIELD: &str = "avatar";

/// `GET /users/me`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileFetcher;

#[async_trait]
impl Fetcher for ProfileFetcher {
    type Params = ();
    type Output = Option<UserProfile>;

    const NAME: &'static str = "profile";

    async fn fetch(&self, api: &ApiClient, _params: &()) -> Result<Option<UserProfile>, ApiError> {
        api.request_json("/users/me", RequestOptions::get()).await.map(Some)
    }
}

/// Image to upload as the user's avatar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct UserApi {
    profile: Resource<ProfileFetcher>,
}

impl UserApi {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { profile: Resource::new(api, ProfileFetcher) }
    }

    #[must_use]
    pub fn profile(&self) -> &Resource<ProfileFetcher> {
        &self.profile
    }

    /// `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`].
    pub async fn fetch_me(&self) -> Result<UserProfile, ApiError> {
        self.profile.api().request_json("/users/me", RequestOptions::get()).await
    }

    /// `PUT /users/me`, then refresh the profile resource.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`].
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        let body = self
            .profile
            .api()
            .request("/users/me", RequestOptions::method(Method::PUT).json(update))
            .await?;
        self.profile.refresh(&()).await;
        Ok(body)
    }

    /// `PUT /users/me/password`.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`].
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Value, ApiError> {
        self.profile
            .api()
            .request("/users/me/password", RequestOptions::method(Method::PUT).json(change))
            .await
    }

    /// `POST /users/me/avatar` as multipart, then refresh the profile resource.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`].
    pub async fn upload_avatar(&self, upload: AvatarUpload) -> Result<Value, ApiError> {
        let file = FilePart {
            field: AVATAR_FIELD.to_owned(),
            file_name: upload.file_name,
            mime: upload.mime,
            bytes: upload.bytes,
        };
        let body = self
            .profile
            .api()
            .request("/users/me/avatar", RequestOptions::method(Method::POST).file(file))
            .await?;
        self.profile.refresh(&()).await;
        Ok(body)
    }
}
