//! CatalogStore trait definition.
//!
//! The server only talks to the catalog through this trait, so a substitute
//! backend can be injected wherever a real database is not wanted.

use super::errors::StoreError;
use super::models::{Album, Artist, Song};
use async_trait::async_trait;

/// Outcome of a single-entity lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The query ran and matched a row.
    Found(T),
    /// The query ran and matched no rows.
    NotFound,
    /// The query could not be run or its row could not be read.
    Failed(StoreError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<Option<T>, StoreError>> for Lookup<T> {
    fn from(result: Result<Option<T>, StoreError>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Failed(err),
        }
    }
}

/// Read-only access to the catalog.
///
/// Every method issues exactly one query. List methods return rows in
/// backend order and yield an empty vector when nothing matches.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_artists(&self) -> Result<Vec<Artist>, StoreError>;

    async fn get_artist(&self, id: i64) -> Lookup<Artist>;

    async fn list_albums(&self) -> Result<Vec<Album>, StoreError>;

    async fn get_album(&self, id: i64) -> Lookup<Album>;

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError>;

    async fn get_song(&self, id: i64) -> Lookup<Song>;

    /// All songs whose `year` equals `year`.
    async fn get_songs_by_year(&self, year: i32) -> Result<Vec<Song>, StoreError>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self);
}
