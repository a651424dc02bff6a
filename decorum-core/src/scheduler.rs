//! Registration modes and the debounced registration timer.

use crate::config::{ConfigError, DecorumConfig};
use crate::registry::ControllerRegistry;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// When a controller's configuration is handed to its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    /// Registration happens only on an explicit [`ControllerRegistry::seal`].
    #[default]
    Explicit,
    /// Every declaration re-arms a short timer; registration happens once
    /// the declarations for a controller stop arriving.
    Debounced,
}

impl std::str::FromStr for RegistrationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(RegistrationMode::Explicit),
            "debounced" => Ok(RegistrationMode::Debounced),
            _ => Err(ConfigError::TypeMismatch {
                key: "decorum.registration.mode".into(),
                expected: "explicit | debounced",
            }),
        }
    }
}

/// Registration settings of a [`ControllerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationSettings {
    pub mode: RegistrationMode,
    /// Debounce delay. Zero means "next timer turn".
    pub delay: Duration,
}

impl RegistrationSettings {
    pub fn explicit() -> Self {
        Self::default()
    }

    pub fn debounced() -> Self {
        Self {
            mode: RegistrationMode::Debounced,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Read `decorum.registration.mode` and `decorum.registration.delay`
    /// (milliseconds).
    pub fn from_config(config: &DecorumConfig) -> Result<Self, ConfigError> {
        let mode = match config.get::<String>("decorum.registration.mode") {
            Ok(raw) => raw.parse()?,
            Err(ConfigError::NotFound(_)) => RegistrationMode::default(),
            Err(e) => return Err(e),
        };
        let delay_ms = match config.get::<u64>("decorum.registration.delay") {
            Ok(ms) => ms,
            Err(ConfigError::NotFound(_)) => 0,
            Err(e) => return Err(e),
        };
        Ok(Self {
            mode,
            delay: Duration::from_millis(delay_ms),
        })
    }

    pub fn is_debounced(&self) -> bool {
        self.mode == RegistrationMode::Debounced
    }
}

/// Handle to an armed registration timer.
#[derive(Debug)]
pub struct PendingRegistration {
    handle: AbortHandle,
}

impl PendingRegistration {
    /// Disarm the timer. A no-op if it already fired.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

/// Arm a timer that seals `C` after `delay`.
///
/// Returns `None` outside a tokio runtime; the caller then has to seal
/// explicitly.
pub(crate) fn arm<C: Send + Sync + 'static>(
    registry: &ControllerRegistry,
    delay: Duration,
) -> Option<PendingRegistration> {
    let controller = std::any::type_name::<C>();
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime,
        Err(_) => {
            warn!(
                controller,
                "Debounced registration needs a tokio runtime; call `seal()` instead"
            );
            return None;
        }
    };

    let registry = registry.clone();
    let task = runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        match registry.seal::<C>() {
            Ok(outcome) => debug!(controller, ?outcome, "Debounced registration fired"),
            Err(err) => warn!(controller, error = %err, "Debounced registration failed"),
        }
    });
    Some(PendingRegistration {
        handle: task.abort_handle(),
    })
}
