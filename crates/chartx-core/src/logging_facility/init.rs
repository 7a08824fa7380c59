//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Default directives: every ChartX crate at the profile's level
const CRATE_TARGETS: [&str; 5] = [
    "chartx",
    "chartx_core",
    "chartx_store",
    "chartx_engine",
    "chartx_cli",
];

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    fn default_level(&self) -> &'static str {
        match self {
            Profile::Development => "debug",
            Profile::Production | Profile::Test => "info",
        }
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn default_filter(&self) -> String {
        let level = self.default_level();
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// This function should be called once at application startup.
/// It sets up the tracing subscriber based on the selected profile.
///
/// # Profiles
///
/// - **Development**: Human-readable logs on stderr with debug level
/// - **Production**: JSON structured logs on stderr with info level
/// - **Test**: Capture mode for test assertions
///
/// Output goes to stderr so that command output on stdout stays machine
/// readable.
///
/// # Example
///
/// ```
/// use chartx_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()))
        };
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter())
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_env_filter(filter())
                    .init();
            }
            Profile::Test => {
                // Test capture is initialized separately via init_test_capture()
                tracing_subscriber::registry().init();
            }
        }
    });
}
