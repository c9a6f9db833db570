//!
//! src/main.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Build step that enriches songs.txt with iTunes metadata
//! and writes the json catalog the site is generated from
//!
//!

mod config;
mod errors;
mod logging;

mod fetch;
mod pipeline;
mod records;
mod sink;
mod types;
mod validate;

use crate::errors::EnricherError;

// one record at a time, nothing to gain from more threads
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EnricherError> {
    let cfgs    = config::load_config()?;
    let _logger = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service="track-enricher",
        version=%env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let itunes   = fetch::ItunesClient::new(&cfgs.http, &cfgs.itunes)?;
    let mut enricher = pipeline::Enricher::new(itunes, &cfgs.itunes, &cfgs.catalog);

    let summary = enricher.run().await?;
    tracing::info!(
        stage = enricher.stage().as_str(),
        tracks = summary.tracks,
        output = ?summary.output,
        "finished"
    );

    Ok(())
}
