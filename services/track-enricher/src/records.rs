//!
//! src/records.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Splits the hand written songs catalog into blocks and
//! each block into a title, artist and description
//!

use thiserror::Error;
use tracing::warn;

use crate::types::RawRecord;

pub const BLOCK_DELIMITER: &str = "---";

/// Malformed block. Logged and skipped, never fatal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("block {block}: missing title")]
    MissingTitle { block: usize },
    #[error("block {block}: missing artist for {title:?}")]
    MissingArtist { block: usize, title: String }
}

/// Yields the raw text between delimiter lines, in catalog order
pub fn blocks(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let curr = rest?;
        let mut offset = 0;
        for line in curr.split_inclusive('\n') {
            if line.trim() == BLOCK_DELIMITER {
                rest = Some(&curr[offset + line.len()..]);
                return Some(&curr[..offset]);
            }
            offset += line.len();
        }
        rest = None;
        Some(curr)
    })
}

/// Parses one block. `block` is the 1-based position used in diagnostics
pub fn parse_record(block: usize, raw: &str) -> Result<RawRecord, RecordParseError> {
    let mut lines = raw.trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let title = lines.next()
        .ok_or(RecordParseError::MissingTitle { block })?
        .to_string();
    let artist = lines.next()
        .ok_or_else(|| RecordParseError::MissingArtist {
            block, title: title.clone()
        })?
        .to_string();
    let description_paragraphs = lines.map(str::to_string).collect();

    Ok( RawRecord { title, artist, description_paragraphs } )
}

/// Single pass over the catalog text
pub fn records(text: &str) -> impl Iterator<Item = Result<RawRecord, RecordParseError>> + '_ {
    blocks(text)
        .enumerate()
        .map(|(i, raw)| parse_record(i + 1, raw))
}

/// Well formed records only. Malformed blocks are reported and dropped
pub fn parse_catalog(text: &str) -> (Vec<RawRecord>, usize) {
    let mut skipped = 0;
    let parsed = records(text)
        .filter_map(|r| match r {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "record.skip");
                skipped += 1;
                None
            }
        })
        .collect();
    (parsed, skipped)
}
