//! Query text for every catalog read.
//!
//! Each entity declares its column list explicitly. The materializers in the
//! backend stores read columns by position, so the order here must match the
//! field order of the corresponding model. Placeholders use `?`, which both
//! MySQL and SQLite accept.

pub const ARTIST_COLUMN_COUNT: usize = 4;
pub const ALBUM_COLUMN_COUNT: usize = 5;
pub const SONG_COLUMN_COUNT: usize = 5;

pub const SELECT_ALL_ARTISTS: &str = "SELECT id, name, country, formed_year FROM artists";

pub const SELECT_ARTIST_BY_ID: &str =
    "SELECT id, name, country, formed_year FROM artists WHERE id = ?";

pub const SELECT_ALL_ALBUMS: &str =
    "SELECT id, title, release_year, price, artist_id FROM albums";

pub const SELECT_ALBUM_BY_ID: &str =
    "SELECT id, title, release_year, price, artist_id FROM albums WHERE id = ?";

// `duration` may be a TIME column; the cast hands it over as formatted text.
pub const SELECT_ALL_SONGS: &str =
    "SELECT id, title, album_id, CAST(duration AS CHAR) AS duration, year FROM songs";

pub const SELECT_SONG_BY_ID: &str =
    "SELECT id, title, album_id, CAST(duration AS CHAR) AS duration, year FROM songs WHERE id = ?";

pub const SELECT_SONGS_BY_YEAR: &str =
    "SELECT id, title, album_id, CAST(duration AS CHAR) AS duration, year FROM songs WHERE year = ?";

/// Liveness probe used at startup.
pub const PING: &str = "SELECT 1";
