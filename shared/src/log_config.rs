use core::fmt;
use std::fmt::Display;

use clap_verbosity_flag::{InfoLevel, LevelFilter, Verbosity};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(clap::Parser, Clone, Debug)]
pub struct LogConfig {
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    #[clap(long, env, default_value_t = LogFormat::Text, help = "Logging format")]
    pub log_format: LogFormat,
}

impl LogConfig {
    pub fn level(&self) -> Option<Level> {
        match self.verbosity.log_level_filter() {
            LevelFilter::Off => None,
            LevelFilter::Error => Some(Level::ERROR),
            LevelFilter::Warn => Some(Level::WARN),
            LevelFilter::Info => Some(Level::INFO),
            LevelFilter::Debug => Some(Level::DEBUG),
            LevelFilter::Trace => Some(Level::TRACE),
        }
    }

    /// Installs the global subscriber. `RUST_LOG`, when set, overrides the
    /// verbosity flags. Logs go to stderr so command output stays parseable.
    pub fn init(&self) {
        let Some(log_level) = self.level() else {
            return;
        };
        let filter = EnvFilter::builder()
            .with_default_directive(
                tracing::level_filters::LevelFilter::from_level(log_level)
                    .into(),
            )
            .from_env_lossy();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        match self.log_format {
            LogFormat::Text => subscriber.init(),
            LogFormat::Json => subscriber.json().flatten_event(true).init(),
        };
    }
}
