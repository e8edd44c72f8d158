//! CLI argument parsing tests

use clap::Parser;

use crate::cli::{Cli, Commands};

#[test]
fn test_serve_defaults() {
    let cli = Cli::try_parse_from(["tally", "serve"]).unwrap();
    match cli.command {
        Commands::Serve { port, host } => {
            assert_eq!(port, 3000);
            assert_eq!(host, "127.0.0.1");
        }
        _ => panic!("expected serve command"),
    }
}

#[test]
fn test_report_defaults_to_day() {
    let cli = Cli::try_parse_from(["tally", "report"]).unwrap();
    match cli.command {
        Commands::Report { kind, date, send } => {
            assert_eq!(kind, "day");
            assert!(date.is_none());
            assert!(!send);
        }
        _ => panic!("expected report command"),
    }
}

#[test]
fn test_report_with_anchor_and_send() {
    let cli = Cli::try_parse_from(["tally", "report", "week", "--date", "2025-06-01", "--send"])
        .unwrap();
    match cli.command {
        Commands::Report { kind, date, send } => {
            assert_eq!(kind, "week");
            assert_eq!(date.as_deref(), Some("2025-06-01"));
            assert!(send);
        }
        _ => panic!("expected report command"),
    }
}

#[test]
fn test_extract_takes_message_text() {
    let cli = Cli::try_parse_from(["tally", "extract", "coffee 4.50"]).unwrap();
    match cli.command {
        Commands::Extract { text } => assert_eq!(text, "coffee 4.50"),
        _ => panic!("expected extract command"),
    }
}

#[test]
fn test_verbose_flag_is_global() {
    let cli = Cli::try_parse_from(["tally", "status", "--verbose"]).unwrap();
    assert!(cli.verbose);
}
