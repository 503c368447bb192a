use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;

pub mod config;
pub mod describe;
pub mod filter;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod post;
pub mod source;
pub mod telemetry;
pub mod timing;

#[cfg(test)]
mod test_helpers;

use crate::config::{Config, ConfigError};
use crate::describe::VisionClient;
use crate::filter::{GenderMapError, Policy};
use crate::http::{IsahcTransport, TransportError};
use crate::models::Picture;
use crate::pipeline::{AcquireError, Pipeline};
use crate::source::Commons;

#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    GenderMap(GenderMapError),
    TelemetryInitError(anyhow::Error),
    HttpClient(TransportError),
    Acquire(AcquireError),
    Io(io::Error),
    PostingFailed(Vec<&'static str>),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::Config(_) => 2,
            Error::GenderMap(_) => 2,
            Error::TelemetryInitError(_) => 4,
            Error::HttpClient(_) => 5,
            Error::Acquire(_) => 6,
            Error::Io(_) => 7,
            Error::PostingFailed(_) => 8,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(err) => write!(f, "Configuration error: {}", err),
            Error::GenderMap(err) => write!(f, "Invalid gendered word map: {}", err),
            Error::TelemetryInitError(err) => write!(f, "Failed to init telemetry: {:#}", err),
            Error::HttpClient(err) => write!(f, "Failed to build HTTP client: {}", err),
            Error::Acquire(err) => write!(f, "No picture to post: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::PostingFailed(destinations) => {
                write!(f, "Posting failed for: {}", destinations.join(", "))
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Path to the TOML configuration file.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "config.toml",
        env = "PICDESCBOT_CONFIG"
    )]
    pub config: PathBuf,

    /// Vision service API key, overrides the one in the config file.
    #[structopt(long, env = "PICDESCBOT_VISION_API_KEY", hide_env_values = true)]
    pub vision_api_key: Option<String>,

    /// Ask on stdin before posting each picture.
    #[structopt(long)]
    pub manual: bool,

    /// Describe this Commons file instead of a random one.
    #[structopt(long, env = "PICDESCBOT_FILENAME")]
    pub filename: Option<String>,

    /// How many discarded candidates to tolerate before giving up.
    #[structopt(long, default_value = "20", env = "PICDESCBOT_MAX_RETRIES")]
    pub max_retries: u32,

    /// Don't reject pictures because of their vision tags.
    #[structopt(long)]
    pub allow_all_tags: bool,

    /// Print the picture as JSON instead of posting it.
    #[structopt(long)]
    pub dry_run: bool,
}

/// The vision service client and repository source wired up from configuration.
pub type BotPipeline = Pipeline<Commons<Arc<IsahcTransport>>, VisionClient<Arc<IsahcTransport>>>;

/// Build the policy, transport and pipeline the bot and the inspection tools share.
pub fn build(config: &Config) -> Result<(Arc<Policy>, Arc<IsahcTransport>, BotPipeline), Error> {
    let policy = Arc::new(Policy::from_config(&config.filters).map_err(Error::GenderMap)?);
    let transport = Arc::new(
        IsahcTransport::new(&config.user_agent, config.http_timeout()).map_err(Error::HttpClient)?,
    );

    let commons_endpoint = config.mediawiki_endpoint().map_err(Error::Config)?;
    let vision_endpoint = config.vision_endpoint().map_err(Error::Config)?;

    let timing = config.timing();
    let source = Commons::new(transport.clone(), commons_endpoint, policy.clone());
    let describer = VisionClient::new(
        transport.clone(),
        vision_endpoint,
        config.vision.api_key.clone(),
        timing,
    );
    let pipeline = Pipeline::new(source, describer, policy.clone(), timing)
        .with_max_fetch_attempts(config.max_fetch_attempts);

    Ok((policy, transport, pipeline))
}

pub fn load_config(args: &Args) -> Result<Config, Error> {
    let mut config = Config::load(&args.config).map_err(Error::Config)?;
    if let Some(key) = &args.vision_api_key {
        config.vision.api_key = key.clone();
    }
    if args.allow_all_tags {
        config.filters.tags.clear();
    }
    if config.vision.api_key.is_empty() {
        return Err(Error::Config(ConfigError::Validation(
            "no vision API key configured".to_string(),
        )));
    }
    Ok(config)
}

/// Prompt until the operator answers `y` or `n`.
fn approve<R: BufRead, W: Write>(picture: &Picture, input: &mut R, output: &mut W) -> io::Result<bool> {
    writeln!(output, "{}", picture.url())?;
    writeln!(output, "{}", picture.caption())?;
    loop {
        write!(output, "Post this? [y/n]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed before an answer",
            ));
        }
        match line.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

pub fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();
    let config = load_config(&args)?;

    telemetry::init(config.log_directory.as_deref()).map_err(Error::TelemetryInitError)?;

    let (policy, transport, pipeline) = build(&config)?;

    let picture = loop {
        let picture = pipeline
            .acquire(args.filename.as_deref(), args.max_retries)
            .map_err(Error::Acquire)?;
        if !args.manual {
            break picture;
        }
        let stdin = io::stdin();
        if approve(&picture, &mut stdin.lock(), &mut io::stdout()).map_err(Error::Io)? {
            break picture;
        }
        tracing::info!(caption = picture.caption(), "rejected by operator");
    };

    if args.dry_run {
        let json = serde_json::to_string_pretty(&picture)
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        println!("{}", json);
        return Ok(());
    }

    let destinations = post::destinations(&config, transport, policy);
    if destinations.is_empty() {
        tracing::warn!("no destinations configured, nothing was posted");
    }

    let mut failed = Vec::new();
    for destination in &destinations {
        match destination.send(&picture) {
            Ok(id) => println!("{}: posted {} ({})", destination.name(), id, picture.caption()),
            Err(err) => {
                tracing::error!(destination = destination.name(), error = %err, "posting failed");
                failed.push(destination.name());
            },
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::PostingFailed(failed))
    }
}
