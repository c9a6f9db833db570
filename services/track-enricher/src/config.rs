use url::Url;
use std::{path::PathBuf, time};
use crate::EnricherError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 8000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HTTP_POOL_MAX_IDLE: usize = 1;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

/// Constants for the iTunes search endpoint
pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const ITUNES_HOST: &str = "itunes.apple.com";
pub const ITUNES_MEDIA: &str = "music";
pub const ITUNES_ENTITY: &str = "musicTrack";
pub const ITUNES_LIMIT: u32 = 1;

/// Constants for catalog paths
pub const DEFAULT_INPUT: &str = "songs.txt";
pub const DEFAULT_OUTPUT: &str = "src/generated/tracks.json";

/// Wrapper over a lookup to return an invalid enviroment var error
fn env_check<F>(env: &F, s: &str) -> Result<String, EnricherError>
where
    F: Fn(&str) -> Option<String>
{
    match env(s) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EnricherError::Config(format!("{s} was not set"))),
    }
}

/// Lookup with a fallback when the var is unset or blank
fn env_or<F>(env: &F, s: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>
{
    env_check(env, s).unwrap_or_else(|_| default.to_string())
}

fn env_flag<F>(env: &F, s: &str) -> bool
where
    F: Fn(&str) -> Option<String>
{
    match env(s) {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"
        ),
        None => false
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

///
/// Configuration for the songs catalog on disk
///
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub input_path: PathBuf,  // human authored songs.txt
    pub output_path: PathBuf, // generated json consumed by site build
    pub dry_run: bool         // print catalog instead of writing
}

fn build_catalog<F>(env: &F) -> CatalogConfig
where
    F: Fn(&str) -> Option<String>
{
    let input_path  = env_or(env, "ENRICHER_INPUT", DEFAULT_INPUT);
    let output_path = env_or(env, "ENRICHER_OUTPUT", DEFAULT_OUTPUT);
    let dry_run     = env_flag(env, "ENRICHER_DRY_RUN");

    CatalogConfig {
        input_path: PathBuf::from(input_path),
        output_path: PathBuf::from(output_path),
        dry_run
    }
}

///
/// Configuration for the iTunes search api
///
#[derive(Debug, Clone)]
pub struct ItunesConfig {
    pub base_url: Url,  // https://itunes.apple.com/search
    pub media: String,  // music
    pub entity: String, // musicTrack
    pub limit: u32      // always 1, validator expects a single result
}

fn build_itunes<F>(env: &F) -> Result<ItunesConfig, EnricherError>
where
    F: Fn(&str) -> Option<String>
{
    let base_url = env_or(env, "ITUNES_SEARCH_URL", ITUNES_SEARCH_URL);

    let base_url = Url::parse(&base_url)
        .map_err(|e| EnricherError::Config(
                format!("ITUNES_SEARCH_URL invalid {e}")
        ))?;

    // https and hostname check
    ensure_https(&base_url)
        .map_err(EnricherError::Config)?;
    ensure_host(&base_url, ITUNES_HOST)
        .map_err(EnricherError::Config)?;

    Ok( ItunesConfig {
        base_url,
        media: ITUNES_MEDIA.to_string(),
        entity: ITUNES_ENTITY.to_string(),
        limit: ITUNES_LIMIT
    })
}

///
/// Configuration for Http timeouts, pooling, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
        }
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<LogFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json"   => Some(LogFormat::Json),
            _ => None
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,track_enricher=debug,reqwest=warn".to_string(),
            format: LogFormat::Pretty,
            include_file_line: false,
            include_target: true,
        }
    }
}

fn build_logging<F>(env: &F) -> Result<LoggingConfig, EnricherError>
where
    F: Fn(&str) -> Option<String>
{
    let mut logging = LoggingConfig::default();
    if let Ok(format) = env_check(env, "LOG_FORMAT") {
        logging.format = LogFormat::parse(&format)
            .ok_or_else(|| EnricherError::Config(
                format!("LOG_FORMAT must be json or pretty (got {format})")
            ))?;
    }
    // json lines are machine read, keep file:line for triage
    logging.include_file_line = logging.format == LogFormat::Json;
    Ok(logging)
}

///
/// AppConfig which holds everything the pipeline needs
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub itunes: ItunesConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig
}

/// Builds config from an arbitrary variable lookup
pub fn config_from<F>(env: F) -> Result<AppConfig, EnricherError>
where
    F: Fn(&str) -> Option<String>
{
    let catalog = build_catalog(&env);
    let itunes  = build_itunes(&env)?;
    let http    = HttpConfig::default();
    let logging = build_logging(&env)?;

    Ok( AppConfig { catalog, itunes, http, logging } )
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, EnricherError> {
    dotenvy::dotenv().ok();
    config_from(|s| std::env::var(s).ok())
}
