use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::time::UtcTime,
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

pub(crate) fn init(log_directory: Option<&Path>) -> Result<()> {
    let fmt_env_filter = env_filter_merge_from_environment("info", "PICDESCBOT_LOG_LEVEL")?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(fmt_env_filter);

    // Everything goes to all.log, filtered.log only gets discarded
    // candidates and failures.
    let (all_layer, filtered_layer) = match log_directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).with_context(|| {
                anyhow!("Failed to create log directory {}", directory.display())
            })?;
            let all = log_file(&directory.join("all.log"))?;
            let filtered = log_file(&directory.join("filtered.log"))?;
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(all))
                        .with_ansi(false)
                        .with_timer(UtcTime::rfc_3339())
                        .with_filter(LevelFilter::INFO),
                ),
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(filtered))
                        .with_ansi(false)
                        .with_timer(UtcTime::rfc_3339())
                        .with_filter(LevelFilter::WARN),
                ),
            )
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(all_layer)
        .with(filtered_layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| anyhow!("Failed to open log file {}", path.display()))
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Ok(env_value) = std::env::var(env_var) {
        for env_directive in env_value.split(',') {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}
