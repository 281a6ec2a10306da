//! SQLite-backed catalog store.
//!
//! Reads go through a fixed pool of read-only connections, picked
//! round-robin and driven on the blocking thread pool. Each query installs a
//! progress handler tied to the awaiting future: if that future is dropped,
//! the statement is interrupted instead of running to completion.

use super::errors::StoreError;
use super::models::{Album, Artist, EntityKind, Song};
use super::record_query;
use super::schema::*;
use super::trait_def::{CatalogStore, Lookup};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, Params, Row};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::info;

/// Number of VM instructions between cancellation checks.
const PROGRESS_CHECK_OPS: i32 = 1000;

type RowParser<T> = fn(&Row) -> Result<T, StoreError>;
type PooledConnection = Arc<Mutex<Connection>>;

#[derive(Clone)]
pub struct SqliteCatalogStore {
    /// Emptied by `close`; queries in flight keep their connection until done.
    read_pool: Arc<RwLock<Vec<PooledConnection>>>,
    read_index: Arc<AtomicUsize>,
}

/// Flags the running query as abandoned when the awaiting future goes away.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl SqliteCatalogStore {
    /// Open a catalog database file.
    ///
    /// # Arguments
    /// * `db_path` - Path to an existing SQLite database with the catalog schema
    /// * `read_pool_size` - Number of connections for concurrent reads
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();
        let read_pool_size = read_pool_size.max(1);

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open catalog database at {:?}", db_path))?;
            read_pool.push(Arc::new(Mutex::new(conn)));
        }

        info!(
            "Opened SQLite catalog at {:?} with {} read connections",
            db_path, read_pool_size
        );

        Ok(SqliteCatalogStore {
            read_pool: Arc::new(RwLock::new(read_pool)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn next_read_conn(&self) -> Result<PooledConnection, StoreError> {
        let pool = self
            .read_pool
            .read()
            .map_err(|_| StoreError::Connection("read pool lock poisoned".to_string()))?;
        if pool.is_empty() {
            return Err(StoreError::Connection("catalog store is closed".to_string()));
        }
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % pool.len();
        Ok(pool[index].clone())
    }

    /// Run `f` on a pooled connection without blocking the async runtime.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.next_read_conn()?;
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_on_drop = CancelOnDrop(cancelled.clone());
        let start = Instant::now();

        let task = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Connection("connection mutex poisoned".to_string()))?;
            if cancelled.load(Ordering::Relaxed) {
                return Err(StoreError::Interrupted);
            }
            let flag = cancelled.clone();
            conn.progress_handler(
                PROGRESS_CHECK_OPS,
                Some(move || flag.load(Ordering::Relaxed)),
            );
            let result = f(&conn);
            conn.progress_handler(0, None::<fn() -> bool>);
            result
        });

        let result = match task.await {
            Ok(result) => result,
            Err(err) => Err(StoreError::Query(format!("query task failed: {}", err))),
        };
        record_query(operation, start, result.as_ref().err());
        result
    }

    fn parse_artist_row(row: &Row) -> Result<Artist, StoreError> {
        let column = |err| decode_error(EntityKind::Artist, err);
        Ok(Artist {
            id: row.get(0).map_err(column)?,
            name: row.get(1).map_err(column)?,
            country: row.get(2).map_err(column)?,
            formed_year: row.get(3).map_err(column)?,
        })
    }

    fn parse_album_row(row: &Row) -> Result<Album, StoreError> {
        let column = |err| decode_error(EntityKind::Album, err);
        Ok(Album {
            id: row.get(0).map_err(column)?,
            title: row.get(1).map_err(column)?,
            release_year: row.get(2).map_err(column)?,
            price: decimal_column(row, 3, EntityKind::Album)?,
            artist_id: row.get(4).map_err(column)?,
        })
    }

    fn parse_song_row(row: &Row) -> Result<Song, StoreError> {
        let column = |err| decode_error(EntityKind::Song, err);
        Ok(Song {
            id: row.get(0).map_err(column)?,
            title: row.get(1).map_err(column)?,
            album_id: row.get(2).map_err(column)?,
            duration: row.get(3).map_err(column)?,
            year: row.get(4).map_err(column)?,
        })
    }
}

// SQLite has no decimal type; prices are stored as REAL.
fn decimal_column(row: &Row, index: usize, entity: EntityKind) -> Result<Decimal, StoreError> {
    let raw: f64 = row.get(index).map_err(|err| decode_error(entity, err))?;
    Decimal::from_f64(raw).ok_or_else(|| {
        StoreError::materialization(entity, format!("column {} value {} is not a decimal", index, raw))
    })
}

fn query_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    entity: EntityKind,
    expected_columns: usize,
    parse: RowParser<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare_cached(sql).map_err(map_sqlite_error)?;
    let actual_columns = stmt.column_count();
    if actual_columns != expected_columns {
        return Err(StoreError::materialization(
            entity,
            format!("expected {} columns, got {}", expected_columns, actual_columns),
        ));
    }

    let mut rows = stmt.query(params).map_err(map_sqlite_error)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next().map_err(map_sqlite_error)? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn query_optional<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    entity: EntityKind,
    expected_columns: usize,
    parse: RowParser<T>,
) -> Result<Option<T>, StoreError> {
    Ok(query_rows(conn, sql, params, entity, expected_columns, parse)?
        .into_iter()
        .next())
}

fn decode_error(entity: EntityKind, err: rusqlite::Error) -> StoreError {
    StoreError::materialization(entity, err)
}

fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::OperationInterrupted => StoreError::Interrupted,
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::SystemIoFailure => StoreError::Connection(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        },
        _ => StoreError::Query(err.to_string()),
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.run("ping", |conn| {
            conn.query_row(PING, [], |r| r.get::<_, i64>(0))
                .map(|_| ())
                .map_err(map_sqlite_error)
        })
        .await
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, StoreError> {
        self.run("list_artists", |conn| {
            query_rows(
                conn,
                SELECT_ALL_ARTISTS,
                params![],
                EntityKind::Artist,
                ARTIST_COLUMN_COUNT,
                Self::parse_artist_row,
            )
        })
        .await
    }

    async fn get_artist(&self, id: i64) -> Lookup<Artist> {
        self.run("get_artist", move |conn| {
            query_optional(
                conn,
                SELECT_ARTIST_BY_ID,
                params![id],
                EntityKind::Artist,
                ARTIST_COLUMN_COUNT,
                Self::parse_artist_row,
            )
        })
        .await
        .into()
    }

    async fn list_albums(&self) -> Result<Vec<Album>, StoreError> {
        self.run("list_albums", |conn| {
            query_rows(
                conn,
                SELECT_ALL_ALBUMS,
                params![],
                EntityKind::Album,
                ALBUM_COLUMN_COUNT,
                Self::parse_album_row,
            )
        })
        .await
    }

    async fn get_album(&self, id: i64) -> Lookup<Album> {
        self.run("get_album", move |conn| {
            query_optional(
                conn,
                SELECT_ALBUM_BY_ID,
                params![id],
                EntityKind::Album,
                ALBUM_COLUMN_COUNT,
                Self::parse_album_row,
            )
        })
        .await
        .into()
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError> {
        self.run("list_songs", |conn| {
            query_rows(
                conn,
                SELECT_ALL_SONGS,
                params![],
                EntityKind::Song,
                SONG_COLUMN_COUNT,
                Self::parse_song_row,
            )
        })
        .await
    }

    async fn get_song(&self, id: i64) -> Lookup<Song> {
        self.run("get_song", move |conn| {
            query_optional(
                conn,
                SELECT_SONG_BY_ID,
                params![id],
                EntityKind::Song,
                SONG_COLUMN_COUNT,
                Self::parse_song_row,
            )
        })
        .await
        .into()
    }

    async fn get_songs_by_year(&self, year: i32) -> Result<Vec<Song>, StoreError> {
        self.run("get_songs_by_year", move |conn| {
            query_rows(
                conn,
                SELECT_SONGS_BY_YEAR,
                params![year],
                EntityKind::Song,
                SONG_COLUMN_COUNT,
                Self::parse_song_row,
            )
        })
        .await
    }

    async fn close(&self) {
        let released = {
            let mut pool = self
                .read_pool
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            pool.drain(..).count()
        };
        info!("Released {} SQLite catalog connections", released);
    }
}
