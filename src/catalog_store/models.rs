//! Catalog entity models.
//!
//! Field order in each struct is the JSON order and the column order used by
//! the queries in [`super::schema`]. Keep the three in sync.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity the catalog serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artist,
    Album,
    Song,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Song => "song",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let capitalized = match self {
            EntityKind::Artist => "Artist",
            EntityKind::Album => "Album",
            EntityKind::Song => "Song",
        };
        write!(f, "{}", capitalized)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub formed_year: i32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub release_year: i32,
    /// Serialized as a JSON number.
    pub price: Decimal,
    pub artist_id: i64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub album_id: i64,
    /// Stored formatted (e.g. "00:03:45"), never parsed.
    pub duration: String,
    pub year: i32,
}
