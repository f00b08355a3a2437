use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG` takes precedence over `default_level`. When `json` is set the
/// subscriber emits one JSON object per event on stdout.
pub fn init(default_level: &str, json: bool) {
    let lvl = match default_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(lvl));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // Use try_init so tests and libraries can call this multiple times without panicking
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
