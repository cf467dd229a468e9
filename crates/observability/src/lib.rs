//! Process-wide tracing setup shared by the binaries.

/// Subscriber construction (filter, output format).
pub mod subscriber;

pub use subscriber::LogFormat;

/// Initialize tracing for the process using `RUST_LOG` and `STOCKFINDER_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init(LogFormat::from_env());
}
