//! Subscriber setup for the `tray-sizer` binary. Logs go to stderr so stdout carries only
//! the sizing report.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise this crate logs at `crate_level` and dependencies at `warn`.
fn sizing_filter(crate_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tray_sizer={},warn", crate_level)))
}

/// Compact human-readable output. `verbose` adds the intermediate geometry, candidate
/// counts and partial category matches logged at debug level.
pub fn init_cli_logger(verbose: bool) {
    let filter = sizing_filter(if verbose { "debug" } else { "info" });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Structured output for log collectors; selected with `[logging] json = true`.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(sizing_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json(),
        )
        .init();
}
