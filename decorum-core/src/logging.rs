use crate::config::DecorumConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Subscriber settings read from `decorum.tracing.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` still wins when set.
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
        }
    }
}

impl TracingSettings {
    pub fn from_config(config: &DecorumConfig) -> Self {
        Self {
            filter: config.get_or("decorum.tracing.filter", DEFAULT_FILTER.to_string()),
            json: config.get_or("decorum.tracing.json", false),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialise the global `tracing` subscriber with a standard `fmt` layer.
///
/// Respects the `RUST_LOG` environment variable. Falls back to `info` when
/// `RUST_LOG` is not set.
///
/// Call this once, at the very start of `main`. Later calls are ignored.
pub fn init_tracing() {
    init_tracing_with(&TracingSettings::default());
}

/// Like [`init_tracing`], with the filter and output format taken from
/// `settings`.
pub fn init_tracing_with(settings: &TracingSettings) {
    let builder = tracing_subscriber::fmt().with_env_filter(settings.env_filter());
    // Fails only when a global subscriber is already installed.
    let _ = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
