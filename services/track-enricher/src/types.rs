use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Suffix iTunes uses for the 100px thumbnail, and the one we swap in
pub const ARTWORK_SUFFIX_SMALL: &str = "100x100bb.jpg";
pub const ARTWORK_SUFFIX_LARGE: &str = "1080x1080bb.jpg";

/// One song block as written in songs.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub artist: String,
    pub description_paragraphs: Vec<String>
}

impl RawRecord {
    /// Search term sent to iTunes, "<title> by <artist>"
    pub fn search_term(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// Top search hit, only ever built by `validate::validate`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub track_censored_name: String,
    pub artist_name: String,
    pub track_view_url: String,
    pub preview_url: String,
    pub artwork_url100: String,
    pub release_date: DateTime<Utc>,

    // checked only when present
    pub track_name: Option<String>,
    pub artist_view_url: Option<String>,
    pub primary_genre_name: Option<String>
}

/// Entry of the generated catalog read by the site build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub description_paragraphs: Vec<String>,
    pub artwork_url: String,
    pub track_view_url: String,
    pub audio_preview_url: String
}

impl Track {
    pub fn from_lookup(record: RawRecord, result: SearchResult) -> Self {
        Self {
            title: record.title,
            artist: record.artist,
            description_paragraphs: record.description_paragraphs,
            artwork_url: upscale_artwork(&result.artwork_url100),
            track_view_url: result.track_view_url,
            audio_preview_url: result.preview_url
        }
    }
}

/// Swaps the 100px artwork suffix for the 1080px one. Urls without the
/// suffix are returned as is.
pub fn upscale_artwork(url: &str) -> String {
    match url.strip_suffix(ARTWORK_SUFFIX_SMALL) {
        Some(stem) => format!("{stem}{ARTWORK_SUFFIX_LARGE}"),
        None => url.to_string()
    }
}
