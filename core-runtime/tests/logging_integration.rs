//! Integration tests for logging system

use bridge_traits::logging::LogLevel;
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
    assert_eq!(strip_path("D:\\data\\click.wav"), "click.wav");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_init_logging_only_once() {
    // The global subscriber can only be installed once per process.
    let first = init_logging(LoggingConfig::default().with_format(LogFormat::Compact));
    assert!(first.is_ok());

    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());
}

#[test]
fn test_init_logging_rejects_bad_filter() {
    let result = init_logging(LoggingConfig::default().with_filter("core_audio=notalevel"));
    assert!(result.is_err());
}
