//! Logging utilities
//!
//! The crate logs through the `log` facade; hosts pick the sink. [`init`]
//! wires up `env_logger` the way the demo binary wants it.

pub use log::{debug, info, warn, error, trace};

/// Initialize `env_logger`, honouring `RUST_LOG` and falling back to `default_level`
pub fn init(default_level: &str) {
    let level = default_level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_env(env_logger::Env::default());
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
