//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per catalog endpoint.
//! When API routes change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET an arbitrary path, for routes without a dedicated helper
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    pub async fn list_artists(&self) -> Response {
        self.get_path("/artists").await
    }

    pub async fn get_artist(&self, id: i64) -> Response {
        self.get_path(&format!("/artists/{}", id)).await
    }

    pub async fn list_albums(&self) -> Response {
        self.get_path("/albums").await
    }

    pub async fn get_album(&self, id: i64) -> Response {
        self.get_path(&format!("/albums/{}", id)).await
    }

    pub async fn list_songs(&self) -> Response {
        self.get_path("/songs").await
    }

    pub async fn get_song(&self, id: i64) -> Response {
        self.get_path(&format!("/songs/{}", id)).await
    }

    pub async fn get_songs_by_year(&self, year: i32) -> Response {
        self.get_path(&format!("/songs/year/{}", year)).await
    }
}
