//! Test fixture creation for the catalog database
//!
//! The catalog is read-only to the server, so fixtures are written with
//! direct SQL inserts into a temporary SQLite file.

use super::constants::*;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG_SCHEMA: &str = "
    CREATE TABLE artists (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        country TEXT NOT NULL,
        formed_year INTEGER NOT NULL
    );
    CREATE TABLE albums (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        release_year INTEGER NOT NULL,
        price REAL NOT NULL,
        artist_id INTEGER NOT NULL
    );
    CREATE TABLE songs (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        album_id INTEGER NOT NULL,
        duration TEXT NOT NULL,
        year INTEGER NOT NULL
    );
";

fn create_catalog_file() -> Result<(TempDir, PathBuf, Connection)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");
    let conn = Connection::open(&db_path)?;
    conn.execute_batch(CATALOG_SCHEMA)?;
    Ok((dir, db_path, conn))
}

/// Creates a catalog with the schema but no rows.
/// Returns (temp_dir, catalog_db_path)
pub fn create_empty_catalog() -> Result<(TempDir, PathBuf)> {
    let (dir, db_path, _conn) = create_catalog_file()?;
    Ok((dir, db_path))
}

/// Creates a temporary test catalog with 2 artists, 2 albums, 4 songs
/// Returns (temp_dir, catalog_db_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let (dir, db_path, conn) = create_catalog_file()?;

    let mut artists = conn.prepare("INSERT INTO artists VALUES (?1, ?2, ?3, ?4)")?;
    artists.execute(params![
        ARTIST_1_ID,
        ARTIST_1_NAME,
        ARTIST_1_COUNTRY,
        ARTIST_1_FORMED_YEAR
    ])?;
    artists.execute(params![ARTIST_2_ID, ARTIST_2_NAME, "FR", 1961])?;

    let mut albums = conn.prepare("INSERT INTO albums VALUES (?1, ?2, ?3, ?4, ?5)")?;
    albums.execute(params![
        ALBUM_1_ID,
        ALBUM_1_TITLE,
        1991,
        ALBUM_1_PRICE,
        ARTIST_1_ID
    ])?;
    albums.execute(params![ALBUM_2_ID, ALBUM_2_TITLE, 2003, 9.99, ARTIST_2_ID])?;

    let mut songs = conn.prepare("INSERT INTO songs VALUES (?1, ?2, ?3, ?4, ?5)")?;
    songs.execute(params![
        SONG_1_ID,
        SONG_1_TITLE,
        ALBUM_1_ID,
        SONG_1_DURATION,
        YEAR_WITH_THREE_SONGS
    ])?;
    songs.execute(params![
        SONG_2_ID,
        "Middle Track",
        ALBUM_1_ID,
        "00:04:10",
        YEAR_WITH_THREE_SONGS
    ])?;
    songs.execute(params![
        SONG_3_ID,
        "Closing Track",
        ALBUM_1_ID,
        "00:06:02",
        YEAR_WITH_THREE_SONGS
    ])?;
    songs.execute(params![
        SONG_4_ID,
        "Smooth Jazz",
        ALBUM_2_ID,
        "00:05:30",
        YEAR_WITH_ONE_SONG
    ])?;

    drop(artists);
    drop(albums);
    drop(songs);
    conn.close().map_err(|(_, err)| err)?;

    Ok((dir, db_path))
}
