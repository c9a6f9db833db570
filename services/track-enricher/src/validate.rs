//!
//! src/validate.rs  Andrew Belles  Oct 3rd, 2025
//!
//! Checks raw iTunes search responses against the shape the
//! catalog depends on and returns a typed top result
//!

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::types::{ARTWORK_SUFFIX_SMALL, SearchResult};

/// Schema violation in a search response. `field` is a json path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: missing")]
    Missing { field: String },
    #[error("{field}: expected {expected}")]
    WrongType { field: String, expected: &'static str },
    #[error("{field}: expected literal {expected}, found {found}")]
    Literal { field: String, expected: String, found: String },
    #[error("{field}: invalid url {value:?} ({reason})")]
    InvalidUrl { field: String, value: String, reason: String },
    #[error("{field}: {value:?} does not match *{pattern}")]
    Pattern { field: String, value: String, pattern: &'static str },
    #[error("{field}: unparseable date {value:?}")]
    InvalidDate { field: String, value: String },
    #[error("{field}: no results")]
    EmptyResults { field: String }
}

/// Accessor over a json object that reports failures with full paths
struct Fields<'a> {
    path: String,
    object: &'a Map<String, Value>
}

impl<'a> Fields<'a> {
    fn new(path: &str, value: &'a Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or_else(|| ValidationError::WrongType {
            field: if path.is_empty() { "$".to_string() } else { path.to_string() },
            expected: "object"
        })?;
        Ok( Self { path: path.to_string(), object } )
    }

    fn field(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn get(&self, key: &str) -> Result<&'a Value, ValidationError> {
        self.object.get(key)
            .ok_or_else(|| ValidationError::Missing { field: self.field(key) })
    }

    fn string(&self, key: &str) -> Result<&'a str, ValidationError> {
        self.get(key)?.as_str().ok_or_else(|| ValidationError::WrongType {
            field: self.field(key),
            expected: "string"
        })
    }

    fn optional_string(&self, key: &str) -> Result<Option<&'a str>, ValidationError> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.string(key).map(Some)
        }
    }

    fn literal(&self, key: &str, expected: &str) -> Result<(), ValidationError> {
        let found = self.string(key)?;
        if found == expected {
            Ok(())
        } else {
            Err(ValidationError::Literal {
                field: self.field(key),
                expected: format!("{expected:?}"),
                found: format!("{found:?}")
            })
        }
    }

    fn url(&self, key: &str) -> Result<&'a str, ValidationError> {
        let value = self.string(key)?;
        check_url(&self.field(key), value)
    }

    fn optional_url(&self, key: &str) -> Result<Option<&'a str>, ValidationError> {
        match self.optional_string(key)? {
            Some(value) => check_url(&self.field(key), value).map(Some),
            None => Ok(None)
        }
    }

    fn date(&self, key: &str) -> Result<DateTime<Utc>, ValidationError> {
        let value = self.string(key)?;
        parse_release_date(value).ok_or_else(|| ValidationError::InvalidDate {
            field: self.field(key),
            value: value.to_string()
        })
    }
}

fn check_url<'v>(field: &str, value: &'v str) -> Result<&'v str, ValidationError> {
    let parsed = Url::parse(value).map_err(|e| ValidationError::InvalidUrl {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string()
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(value),
        other => Err(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("unsupported scheme {other}")
        })
    }
}

/// RFC 3339 timestamps, or bare dates read as midnight UTC
pub fn parse_release_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Validates a whole search response and returns its single result
pub fn validate(raw: &Value) -> Result<SearchResult, ValidationError> {
    let root = Fields::new("", raw)?;

    let count = root.get("resultCount")?;
    match count.as_u64() {
        Some(1) => {},
        Some(_) => return Err(ValidationError::Literal {
            field: root.field("resultCount"),
            expected: "1".to_string(),
            found: count.to_string()
        }),
        None => return Err(ValidationError::WrongType {
            field: root.field("resultCount"),
            expected: "integer"
        })
    }

    let results = root.get("results")?
        .as_array()
        .ok_or_else(|| ValidationError::WrongType {
            field: root.field("results"),
            expected: "array"
        })?;
    let first = results.first()
        .ok_or_else(|| ValidationError::EmptyResults { field: root.field("results") })?;

    validate_result(&Fields::new("results[0]", first)?)
}

fn validate_result(hit: &Fields<'_>) -> Result<SearchResult, ValidationError> {
    hit.literal("wrapperType", "track")?;
    hit.literal("kind", "song")?;

    let track_censored_name = hit.string("trackCensoredName")?.to_string();
    let artist_name         = hit.string("artistName")?.to_string();
    let track_view_url      = hit.url("trackViewUrl")?.to_string();
    let preview_url         = hit.url("previewUrl")?.to_string();

    let artwork_url100 = hit.url("artworkUrl100")?;
    if !artwork_url100.ends_with(ARTWORK_SUFFIX_SMALL) {
        return Err(ValidationError::Pattern {
            field: hit.field("artworkUrl100"),
            value: artwork_url100.to_string(),
            pattern: ARTWORK_SUFFIX_SMALL
        });
    }

    let release_date = hit.date("releaseDate")?;

    let track_name         = hit.optional_string("trackName")?.map(str::to_string);
    let artist_view_url    = hit.optional_url("artistViewUrl")?.map(str::to_string);
    let primary_genre_name = hit.optional_string("primaryGenreName")?.map(str::to_string);

    Ok( SearchResult {
        track_censored_name,
        artist_name,
        track_view_url,
        preview_url,
        artwork_url100: artwork_url100.to_string(),
        release_date,
        track_name,
        artist_view_url,
        primary_genre_name
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use super::*;

    /// Trimmed copy of a real iTunes response
    pub(crate) fn sample_response(title: &str, artist: &str) -> Value {
        json!({
            "resultCount": 1,
            "results": [{
                "wrapperType": "track",
                "kind": "song",
                "artistName": artist,
                "trackName": title,
                "trackCensoredName": title,
                "artistViewUrl": "https://music.apple.com/us/artist/k%C3%A1ryyn/1440475659?uo=4",
                "trackViewUrl": "https://music.apple.com/us/album/anthem-for-those-who-know/1721614181?i=1721614182&uo=4",
                "previewUrl": "https://audio-ssl.itunes.apple.com/itunes-assets/AudioPreview116/v4/ba/54/a2/mzaf_3670417671198364661.plus.aac.p.m4a",
                "artworkUrl30": "https://is1-ssl.mzstatic.com/image/thumb/Music116/v4/2b/4b/03/5400863154967.jpg/30x30bb.jpg",
                "artworkUrl60": "https://is1-ssl.mzstatic.com/image/thumb/Music116/v4/2b/4b/03/5400863154967.jpg/60x60bb.jpg",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/thumb/Music116/v4/2b/4b/03/5400863154967.jpg/100x100bb.jpg",
                "releaseDate": "2024-01-09T12:00:00Z",
                "primaryGenreName": "Electronic"
            }]
        })
    }

    fn with_hit(key: &str, value: Value) -> Value {
        let mut v = sample_response("Anthem For Those Who Know", "KÁRYYN");
        v["results"][0][key] = value;
        v
    }

    fn without_hit(key: &str) -> Value {
        let mut v = sample_response("Anthem For Those Who Know", "KÁRYYN");
        if let Some(hit) = v["results"][0].as_object_mut() {
            hit.remove(key);
        }
        v
    }

    #[test]
    fn accepts_sample_response() {
        let r = validate(&sample_response("Anthem For Those Who Know", "KÁRYYN")).unwrap();
        assert_eq!(r.track_censored_name, "Anthem For Those Who Know");
        assert_eq!(r.artist_name, "KÁRYYN");
        assert!(r.artwork_url100.ends_with("/100x100bb.jpg"));
        assert_eq!(r.release_date, Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap());
        assert_eq!(r.primary_genre_name.as_deref(), Some("Electronic"));
        assert_eq!(r.track_name.as_deref(), Some("Anthem For Those Who Know"));
    }

    #[test]
    fn rejects_result_count_other_than_one() {
        for count in [json!(0), json!(2)] {
            let mut v = sample_response("a", "b");
            v["resultCount"] = count;
            assert!(matches!(
                validate(&v),
                Err(ValidationError::Literal { field, .. }) if field == "resultCount"
            ));
        }
    }

    #[test]
    fn rejects_missing_or_non_integer_result_count() {
        let mut v = sample_response("a", "b");
        v["resultCount"] = json!("1");
        assert!(matches!(validate(&v), Err(ValidationError::WrongType { .. })));

        let v = json!({ "results": [] });
        assert_eq!(
            validate(&v),
            Err(ValidationError::Missing { field: "resultCount".to_string() })
        );
    }

    #[test]
    fn rejects_empty_results() {
        let v = json!({ "resultCount": 1, "results": [] });
        assert_eq!(
            validate(&v),
            Err(ValidationError::EmptyResults { field: "results".to_string() })
        );
    }

    #[test]
    fn rejects_non_object_root_and_hit() {
        assert!(matches!(
            validate(&json!([1, 2])),
            Err(ValidationError::WrongType { field, expected: "object" }) if field == "$"
        ));
        let v = json!({ "resultCount": 1, "results": ["nope"] });
        assert!(matches!(
            validate(&v),
            Err(ValidationError::WrongType { field, .. }) if field == "results[0]"
        ));
    }

    #[test]
    fn rejects_wrong_discriminators() {
        let v = with_hit("wrapperType", json!("collection"));
        assert!(matches!(
            validate(&v),
            Err(ValidationError::Literal { field, .. }) if field == "results[0].wrapperType"
        ));
        let v = with_hit("kind", json!("music-video"));
        assert!(matches!(
            validate(&v),
            Err(ValidationError::Literal { field, .. }) if field == "results[0].kind"
        ));
    }

    #[test]
    fn reports_missing_required_field_path() {
        for key in [
            "trackCensoredName", "artistName", "trackViewUrl",
            "previewUrl", "artworkUrl100", "releaseDate"
        ] {
            assert_eq!(
                validate(&without_hit(key)),
                Err(ValidationError::Missing { field: format!("results[0].{key}") })
            );
        }
    }

    #[test]
    fn rejects_wrong_field_type() {
        let v = with_hit("artistName", json!(42));
        assert_eq!(
            validate(&v),
            Err(ValidationError::WrongType {
                field: "results[0].artistName".to_string(),
                expected: "string"
            })
        );
    }

    #[test]
    fn rejects_invalid_urls() {
        let v = with_hit("previewUrl", json!("not a url"));
        assert!(matches!(
            validate(&v),
            Err(ValidationError::InvalidUrl { field, .. }) if field == "results[0].previewUrl"
        ));
        let v = with_hit("trackViewUrl", json!("ftp://music.apple.com/x"));
        assert!(matches!(validate(&v), Err(ValidationError::InvalidUrl { .. })));
    }

    #[test]
    fn rejects_artwork_without_thumbnail_suffix() {
        let v = with_hit("artworkUrl100", json!("https://is1-ssl.mzstatic.com/a.jpg/600x600bb.jpg"));
        assert!(matches!(
            validate(&v),
            Err(ValidationError::Pattern { field, .. }) if field == "results[0].artworkUrl100"
        ));
    }

    #[test]
    fn rejects_unparseable_release_date() {
        let v = with_hit("releaseDate", json!("last tuesday"));
        assert!(matches!(validate(&v), Err(ValidationError::InvalidDate { .. })));
    }

    #[test]
    fn accepts_bare_release_date() {
        let r = validate(&with_hit("releaseDate", json!("1999-12-31"))).unwrap();
        assert_eq!(r.release_date, Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let mut v = without_hit("trackName");
        v["results"][0]["primaryGenreName"] = Value::Null;
        if let Some(hit) = v["results"][0].as_object_mut() {
            hit.remove("artistViewUrl");
        }
        let r = validate(&v).unwrap();
        assert!(r.track_name.is_none());
        assert!(r.primary_genre_name.is_none());
        assert!(r.artist_view_url.is_none());
    }

    #[test]
    fn optional_fields_are_type_checked_when_present() {
        let v = with_hit("primaryGenreName", json!(["Electronic"]));
        assert!(matches!(validate(&v), Err(ValidationError::WrongType { .. })));
        let v = with_hit("artistViewUrl", json!("::"));
        assert!(matches!(validate(&v), Err(ValidationError::InvalidUrl { .. })));
    }

    #[test]
    fn parse_release_date_handles_offsets() {
        let d = parse_release_date("2024-01-09T14:00:00+02:00").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap());
        assert!(parse_release_date("2024-13-01").is_none());
    }
}
