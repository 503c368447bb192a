use std::sync::Arc;

use structopt::StructOpt;

use picdescbot::filter::Policy;
use picdescbot::http::IsahcTransport;
use picdescbot::source::Commons;
use picdescbot_cli::report;

/// Fetch one Commons file and show whether the bot would use it.
#[derive(StructOpt)]
struct Args {
    /// Path to the bot's TOML configuration file.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "config.toml",
        env = "PICDESCBOT_CONFIG"
    )]
    config: std::path::PathBuf,

    /// Commons file name, with or without the `File:` prefix.
    #[structopt(name = "FILENAME")]
    filename: String,
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::from_args();

    let config = match picdescbot_cli::load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(2);
        },
    };

    let policy = match Policy::from_config(&config.filters) {
        Ok(policy) => Arc::new(policy),
        Err(err) => {
            log::error!("Invalid gendered word map: {}", err);
            std::process::exit(2);
        },
    };
    let endpoint = match config.mediawiki_endpoint() {
        Ok(endpoint) => endpoint,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(2);
        },
    };
    let transport = match IsahcTransport::new(&config.user_agent, config.http_timeout()) {
        Ok(transport) => transport,
        Err(err) => {
            log::error!("Failed to build HTTP client: {}", err);
            std::process::exit(5);
        },
    };

    let commons = Commons::new(transport, endpoint, policy);
    match commons.inspect(Some(args.filename.as_str())) {
        Ok(verdict) => print!("{}", report::verdict(&verdict)),
        Err(err) => {
            log::error!("Couldn't fetch {}: {}", args.filename, err);
            std::process::exit(1);
        },
    }
}
