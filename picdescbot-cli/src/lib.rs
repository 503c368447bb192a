pub mod report;

use std::path::Path;

use picdescbot::config::Config;

/// Load the bot's configuration, letting `PICDESCBOT_VISION_API_KEY` override the key.
pub fn load_config(path: &Path) -> Result<Config, picdescbot::Error> {
    let mut config = Config::load(path).map_err(picdescbot::Error::Config)?;
    if let Ok(key) = std::env::var("PICDESCBOT_VISION_API_KEY") {
        config.vision.api_key = key;
    }
    Ok(config)
}
