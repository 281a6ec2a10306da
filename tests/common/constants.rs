//! Shared constants for end-to-end tests
//!
//! When test data changes, update only this file.

// ============================================================================
// Test Catalog IDs
// ============================================================================

/// Artist "Test", formed in the US in 1990
pub const ARTIST_1_ID: i64 = 1;
pub const ARTIST_1_NAME: &str = "Test";
pub const ARTIST_1_COUNTRY: &str = "US";
pub const ARTIST_1_FORMED_YEAR: i32 = 1990;

/// Artist "Jazz Ensemble"
pub const ARTIST_2_ID: i64 = 2;
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";

/// Album "First Album" by Test
pub const ALBUM_1_ID: i64 = 10;
pub const ALBUM_1_TITLE: &str = "First Album";
pub const ALBUM_1_PRICE: f64 = 12.5;

/// Album "Jazz Collection" by Jazz Ensemble
pub const ALBUM_2_ID: i64 = 20;
pub const ALBUM_2_TITLE: &str = "Jazz Collection";

/// Songs on First Album, all from 1991
pub const SONG_1_ID: i64 = 100;
pub const SONG_1_TITLE: &str = "Opening Track";
pub const SONG_1_DURATION: &str = "00:03:45";
pub const SONG_2_ID: i64 = 101;
pub const SONG_3_ID: i64 = 102;

/// Song on Jazz Collection, from 2003
pub const SONG_4_ID: i64 = 200;

pub const YEAR_WITH_THREE_SONGS: i32 = 1991;
pub const YEAR_WITH_ONE_SONG: i32 = 2003;
pub const YEAR_WITHOUT_SONGS: i32 = 1850;

/// An id no fixture uses
pub const MISSING_ID: i64 = 999_999;

pub const ARTIST_COUNT: usize = 2;
pub const ALBUM_COUNT: usize = 2;
pub const SONG_COUNT: usize = 4;

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for a spawned server to answer its first request
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
