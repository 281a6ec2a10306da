//! MySQL-backed catalog store.
//!
//! Connections come from a `sqlx` pool, checked out per query. Dropping a
//! query future (client disconnect, request timeout) abandons the query and
//! returns its connection to the pool.

use super::errors::StoreError;
use super::models::{Album, Artist, EntityKind, Song};
use super::record_query;
use super::schema::*;
use super::trait_def::{CatalogStore, Lookup};
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, Row};
use std::time::{Duration, Instant};
use tracing::info;

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;
type RowParser<T> = fn(&MySqlRow) -> Result<T, StoreError>;

#[derive(Clone)]
pub struct MysqlCatalogStore {
    pool: MySqlPool,
}

impl MysqlCatalogStore {
    /// Create the pool. No connection is opened until the first query, so
    /// call [`CatalogStore::ping`] to verify reachability.
    pub fn new(
        connect_options: MySqlConnectOptions,
        pool_size: u32,
        acquire_timeout: Duration,
    ) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(connect_options);
        info!(
            "MySQL pool created (max {} connections, acquire timeout {:?})",
            pool_size, acquire_timeout
        );
        MysqlCatalogStore { pool }
    }

    async fn fetch_all<T>(
        &self,
        operation: &'static str,
        query: MySqlQuery<'_>,
        parse: RowParser<T>,
    ) -> Result<Vec<T>, StoreError> {
        let start = Instant::now();
        let result = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows.iter().map(parse).collect(),
            Err(err) => Err(map_sqlx_error(err)),
        };
        record_query(operation, start, result.as_ref().err());
        result
    }

    async fn fetch_optional<T>(
        &self,
        operation: &'static str,
        query: MySqlQuery<'_>,
        parse: RowParser<T>,
    ) -> Lookup<T> {
        let start = Instant::now();
        let result = match query.fetch_optional(&self.pool).await {
            Ok(Some(row)) => parse(&row).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(map_sqlx_error(err)),
        };
        record_query(operation, start, result.as_ref().err());
        result.into()
    }

    fn parse_artist_row(row: &MySqlRow) -> Result<Artist, StoreError> {
        check_arity(row, EntityKind::Artist, ARTIST_COLUMN_COUNT)?;
        let column = |err| decode_error(EntityKind::Artist, err);
        Ok(Artist {
            id: row.try_get(0).map_err(column)?,
            name: row.try_get(1).map_err(column)?,
            country: row.try_get(2).map_err(column)?,
            formed_year: row.try_get(3).map_err(column)?,
        })
    }

    fn parse_album_row(row: &MySqlRow) -> Result<Album, StoreError> {
        check_arity(row, EntityKind::Album, ALBUM_COLUMN_COUNT)?;
        let column = |err| decode_error(EntityKind::Album, err);
        Ok(Album {
            id: row.try_get(0).map_err(column)?,
            title: row.try_get(1).map_err(column)?,
            release_year: row.try_get(2).map_err(column)?,
            price: row.try_get(3).map_err(column)?,
            artist_id: row.try_get(4).map_err(column)?,
        })
    }

    fn parse_song_row(row: &MySqlRow) -> Result<Song, StoreError> {
        check_arity(row, EntityKind::Song, SONG_COLUMN_COUNT)?;
        let column = |err| decode_error(EntityKind::Song, err);
        Ok(Song {
            id: row.try_get(0).map_err(column)?,
            title: row.try_get(1).map_err(column)?,
            album_id: row.try_get(2).map_err(column)?,
            duration: row.try_get(3).map_err(column)?,
            year: row.try_get(4).map_err(column)?,
        })
    }
}

fn check_arity(row: &MySqlRow, entity: EntityKind, expected: usize) -> Result<(), StoreError> {
    let actual = row.columns().len();
    if actual != expected {
        return Err(StoreError::materialization(
            entity,
            format!("expected {} columns, got {}", expected, actual),
        ));
    }
    Ok(())
}

fn decode_error(entity: EntityKind, err: sqlx::Error) -> StoreError {
    StoreError::materialization(entity, err)
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl CatalogStore for MysqlCatalogStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query(PING)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| StoreError::Connection(err.to_string()))
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, StoreError> {
        self.fetch_all(
            "list_artists",
            sqlx::query(SELECT_ALL_ARTISTS),
            Self::parse_artist_row,
        )
        .await
    }

    async fn get_artist(&self, id: i64) -> Lookup<Artist> {
        self.fetch_optional(
            "get_artist",
            sqlx::query(SELECT_ARTIST_BY_ID).bind(id),
            Self::parse_artist_row,
        )
        .await
    }

    async fn list_albums(&self) -> Result<Vec<Album>, StoreError> {
        self.fetch_all(
            "list_albums",
            sqlx::query(SELECT_ALL_ALBUMS),
            Self::parse_album_row,
        )
        .await
    }

    async fn get_album(&self, id: i64) -> Lookup<Album> {
        self.fetch_optional(
            "get_album",
            sqlx::query(SELECT_ALBUM_BY_ID).bind(id),
            Self::parse_album_row,
        )
        .await
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError> {
        self.fetch_all(
            "list_songs",
            sqlx::query(SELECT_ALL_SONGS),
            Self::parse_song_row,
        )
        .await
    }

    async fn get_song(&self, id: i64) -> Lookup<Song> {
        self.fetch_optional(
            "get_song",
            sqlx::query(SELECT_SONG_BY_ID).bind(id),
            Self::parse_song_row,
        )
        .await
    }

    async fn get_songs_by_year(&self, year: i32) -> Result<Vec<Song>, StoreError> {
        self.fetch_all(
            "get_songs_by_year",
            sqlx::query(SELECT_SONGS_BY_YEAR).bind(year),
            Self::parse_song_row,
        )
        .await
    }

    async fn close(&self) {
        info!("Closing MySQL pool...");
        self.pool.close().await;
    }
}
