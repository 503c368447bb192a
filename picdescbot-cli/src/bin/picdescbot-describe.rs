use structopt::StructOpt;

use picdescbot::describe::{Describer, VisionClient};
use picdescbot_cli::report;

/// Ask the vision service about one picture URL and show what the bot would do with the answer.
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

    /// Print the raw description as JSON.
    #[structopt(long)]
    json: bool,

    /// Picture URL.
    #[structopt(name = "URL")]
    url: String,
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

    let (_, transport, pipeline) = match picdescbot::build(&config) {
        Ok(built) => built,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(u8::from(err).into());
        },
    };
    let endpoint = match config.vision_endpoint() {
        Ok(endpoint) => endpoint,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(2);
        },
    };
    let client = VisionClient::new(
        transport,
        endpoint,
        config.vision.api_key.clone(),
        config.timing(),
    );

    let description = match client.describe(&args.url) {
        Ok(Some(description)) => description,
        Ok(None) => {
            log::error!("The vision service gave no usable answer for {}", args.url);
            std::process::exit(1);
        },
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        },
    };

    if args.json {
        match serde_json::to_string_pretty(&description) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                log::error!("Couldn't serialize description: {}", err);
                std::process::exit(1);
            },
        }
    } else {
        let outcome = pipeline.evaluate(&description);
        print!("{}", report::description(&description, &outcome));
    }
}
