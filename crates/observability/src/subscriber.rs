use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "STOCKFINDER_LOG_FORMAT";

/// Output format of the fmt subscriber.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable single-line output for local runs.
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_VAR) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                eprintln!("{LOG_FORMAT_VAR}={raw:?} not recognised; using json");
                Self::Json
            }),
            Err(_) => Self::Json,
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" | "pretty" | "text" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Install the global subscriber. Filter comes from `RUST_LOG`, defaulting to `info`.
///
/// Returns without error when a subscriber is already installed.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    tracing::debug!(?format, "tracing initialised");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Compact ".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn init_twice_is_harmless() {
        init(LogFormat::Json);
        init(LogFormat::Compact);
        tracing::info!("still logging");
    }
}
