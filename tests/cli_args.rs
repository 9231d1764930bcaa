// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;
use progload::cli::CliArgs;
use progload::config::default_config_path;
use progload::types::WatcherBackend;

#[test]
fn config_defaults_to_the_working_directory_file() {
    let args = CliArgs::try_parse_from(["progload"]).unwrap();

    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, PathBuf::from("Progload.toml"));
    assert!(args.program_dir.is_none());
    assert!(!args.compile_only);
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "progload",
        "--config",
        "/etc/progload.toml",
        "--program-dir",
        "/etc/progs",
        "--extension",
        "mtail",
        "--watcher",
        "poll",
        "--dump-programs",
        "--compile-only",
    ])
    .unwrap();

    assert_eq!(args.config, PathBuf::from("/etc/progload.toml"));
    assert_eq!(args.program_dir, Some(PathBuf::from("/etc/progs")));
    assert_eq!(args.extension.as_deref(), Some("mtail"));
    assert_eq!(args.watcher, Some(WatcherBackend::Poll));
    assert!(args.dump_programs);
    assert!(args.compile_only);
}

#[test]
fn unknown_watcher_backend_is_rejected() {
    assert!(CliArgs::try_parse_from(["progload", "--watcher", "inotify"]).is_err());
}
