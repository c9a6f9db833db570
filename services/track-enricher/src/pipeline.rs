//!
//! src/pipeline.rs  Andrew Belles  Oct 3rd, 2025
//!
//! Drives songs.txt through lookup, validation and transformation
//! one record at a time, then writes the catalog once
//!
//!

use std::path::PathBuf;

use tracing::{debug, error, info, info_span, warn, Instrument};
use tracing_error::SpanTrace;

use crate::config::{CatalogConfig, ItunesConfig};
use crate::errors::EnricherError;
use crate::fetch::{SearchQuery, SearchService};
use crate::records::parse_catalog;
use crate::sink::CatalogWriter;
use crate::types::{RawRecord, Track};
use crate::validate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Reading,
    ParsingRecords,
    LookingUp,
    Validating,
    Transforming,
    Writing,
    Done,
    Failed
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle           => "idle",
            Stage::Reading        => "reading",
            Stage::ParsingRecords => "parsing_records",
            Stage::LookingUp      => "looking_up",
            Stage::Validating     => "validating",
            Stage::Transforming   => "transforming",
            Stage::Writing        => "writing",
            Stage::Done           => "done",
            Stage::Failed         => "failed"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub parsed: usize,
    pub skipped: usize,
    pub tracks: usize,
    pub output: Option<PathBuf> // None on dry runs
}

pub struct Enricher<S: SearchService> {
    search: S,
    itunes: ItunesConfig,
    catalog: CatalogConfig,
    sink: CatalogWriter,
    stage: Stage
}

impl<S: SearchService> Enricher<S> {
    pub fn new(search: S, itunes: &ItunesConfig, catalog: &CatalogConfig) -> Self {
        Self {
            search,
            itunes: itunes.clone(),
            catalog: catalog.clone(),
            sink: CatalogWriter::new(&catalog.output_path),
            stage: Stage::Idle
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, next: Stage) {
        debug!(from = self.stage.as_str(), to = next.as_str(), "pipeline.stage");
        self.stage = next;
    }

    /// Full run. Any error leaves the previous catalog on disk untouched
    pub async fn run(&mut self) -> Result<RunSummary, EnricherError> {
        info!(
            input = %self.catalog.input_path.display(),
            output = %self.sink.path().display(),
            dry_run = self.catalog.dry_run,
            "enricher.start"
        );

        match self.run_stages().await {
            Ok(summary) => {
                self.enter(Stage::Done);
                info!(
                    parsed = summary.parsed,
                    skipped = summary.skipped,
                    tracks = summary.tracks,
                    "enricher.done"
                );
                Ok(summary)
            },
            Err(e) => {
                error!(
                    stage = self.stage.as_str(),
                    error = %e,
                    span_trace = %SpanTrace::capture(),
                    "enricher.failed"
                );
                self.enter(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self) -> Result<RunSummary, EnricherError> {
        self.enter(Stage::Reading);
        let path = &self.catalog.input_path;
        let text = tokio::fs::read_to_string(path).await.map_err(|e|
            EnricherError::Read(format!("{}: {e}", path.display())))?;

        self.enter(Stage::ParsingRecords);
        let (records, skipped) = parse_catalog(&text);
        let parsed = records.len();
        info!(records = parsed, skipped, "records.parsed");

        let tracks = self.enrich(records).await?;

        self.enter(Stage::Writing);
        let output = if self.catalog.dry_run {
            print!("{}", CatalogWriter::render(&tracks)?);
            None
        } else {
            let path = self.sink.write(&tracks)?;
            info!(path = %path.display(), tracks = tracks.len(), "catalog.write");
            Some(path)
        };

        Ok( RunSummary {
            parsed,
            skipped,
            tracks: tracks.len(),
            output
        })
    }

    /// Looks up every record in order. The next lookup only starts once the
    /// previous track is in the collection
    pub async fn enrich(&mut self, records: Vec<RawRecord>) -> Result<Vec<Track>, EnricherError> {
        let mut tracks = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let span = info_span!("record", index, title = %record.title);
            let track = self.enrich_one(record).instrument(span).await?;
            tracks.push(track);
        }
        Ok(tracks)
    }

    async fn enrich_one(&mut self, record: RawRecord) -> Result<Track, EnricherError> {
        self.enter(Stage::LookingUp);
        let query = SearchQuery::for_record(&record, &self.itunes);
        let raw = self.search.search(&query).await?;

        self.enter(Stage::Validating);
        let result = validate(&raw)?;

        if !result.artist_name.eq_ignore_ascii_case(&record.artist) {
            warn!(
                expected = %record.artist,
                found = %result.artist_name,
                "lookup.artist_mismatch"
            );
        }
        info!(
            matched = %result.track_censored_name,
            release = %result.release_date.date_naive(),
            genre = result.primary_genre_name.as_deref().unwrap_or("-"),
            "lookup.done"
        );
        debug!(
            track_name = ?result.track_name,
            artist_view_url = ?result.artist_view_url,
            "lookup.extra"
        );

        self.enter(Stage::Transforming);
        Ok(Track::from_lookup(record, result))
    }
}
