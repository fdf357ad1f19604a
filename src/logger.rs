// src/logger.rs
use slog::Drain;
use std::env;

pub use slog;
pub use slog::Logger;
pub use slog_scope;

pub fn setup_logger(log_level: String) {
    let drain = slog_json::Json::new(std::io::stderr())
        .add_default_keys()
        .build()
        .fuse();

    let drain = slog_async::Async::new(drain)
        .build()
        .filter_level(get_log_level(log_level))
        .fuse();

    let logger = Logger::root(
        drain,
        slog::o!( "svc" => env!("CARGO_PKG_NAME"), "version" => env!("CARGO_PKG_VERSION") ),
    );

    let _guard = slog_scope::set_global_logger(logger);
    _guard.cancel_reset()
}

// get_log_level from LOG_LVL env else default to INFO
pub fn get_log_level(log_level: String) -> slog::Level {
    let log_level = if !log_level.is_empty() {
        log_level
    } else {
        env::var("LOG_LVL").unwrap_or_else(|_| String::from("INFO"))
    };

    match log_level.to_uppercase().as_str() {
        "INFO" => slog::Level::Info,
        "DEBUG" => slog::Level::Debug,
        "WARNING" => slog::Level::Warning,
        "ERROR" => slog::Level::Error,
        "TRACE" => slog::Level::Trace,
        "CRITICAL" => slog::Level::Critical,
        _ => slog::Level::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!(get_log_level("debug".to_string()), slog::Level::Debug);
        assert_eq!(get_log_level("WARNING".to_string()), slog::Level::Warning);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(get_log_level("verbose".to_string()), slog::Level::Info);
    }
}
