use std::time::Duration;

use clap::Parser;
use localcmd::cli::{CliArgs, parse_duration, parse_key_value};
use localcmd::logging::{filter_directive, parse_level_str};

#[test]
fn parses_durations_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
}

#[test]
fn rejects_bad_durations() {
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("ms").is_err());
}

#[test]
fn oversized_durations_are_rejected_not_wrapped() {
    let err = parse_duration("18446744073709551615h").unwrap_err();
    assert!(err.contains("too large"), "unexpected error: {err}");
    assert!(parse_duration("18446744073709551615m").is_err());
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );
}

#[test]
fn parses_key_value_pairs() {
    assert_eq!(
        parse_key_value("target=release"),
        Ok(("target".to_string(), "release".to_string()))
    );
    assert_eq!(
        parse_key_value("expr=a=b"),
        Ok(("expr".to_string(), "a=b".to_string()))
    );
    assert!(parse_key_value("novalue").is_err());
    assert!(parse_key_value("=x").is_err());
}

#[test]
fn cli_collects_overrides_and_timeout() {
    let args = CliArgs::try_parse_from([
        "localcmd",
        "--config",
        "jobs/build.toml",
        "--set",
        "a=1",
        "--set",
        "b=2",
        "--timeout",
        "500ms",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.config, "jobs/build.toml");
    assert_eq!(
        args.set,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
    assert_eq!(args.timeout, Some(Duration::from_millis(500)));
    assert!(args.dry_run);
    assert!(args.log_level.is_none());
}

#[test]
fn cli_defaults() {
    let args = CliArgs::try_parse_from(["localcmd"]).unwrap();
    assert_eq!(args.config, "Localcmd.toml");
    assert!(args.set.is_empty());
    assert_eq!(args.timeout, None);
}

#[test]
fn log_levels_parse_case_insensitively() {
    assert_eq!(parse_level_str("WARNING"), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str(" debug "), Some(tracing::Level::DEBUG));
    assert_eq!(parse_level_str("loud"), None);
}

#[test]
fn log_filter_scopes_level_to_this_crate() {
    assert_eq!(filter_directive(tracing::Level::DEBUG), "warn,localcmd=debug");
    assert_eq!(filter_directive(tracing::Level::ERROR), "warn,localcmd=error");
    assert!(
        tracing_subscriber::EnvFilter::try_new(filter_directive(tracing::Level::TRACE)).is_ok()
    );
}
