// tests/config_errors.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use progload::config::{load_and_validate, load_or_default};
use progload::errors::ProgloadError;
use progload::types::WatcherBackend;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn missing_file_yields_defaults() {
    let cfg = load_or_default(Path::new("/definitely/not/here/Progload.toml")).unwrap();

    assert_eq!(cfg.loader.program_dir, Path::new("progs"));
    assert_eq!(cfg.loader.extension, "prog");
    assert!(!cfg.loader.dump_programs);
    assert_eq!(cfg.watcher.backend, WatcherBackend::Native);
    assert_eq!(cfg.watcher.poll_interval_ms, 1000);
}

#[test]
fn full_config_is_read() {
    let file = config_file(
        r#"
[loader]
program_dir = "/etc/progload/progs"
extension = "mtail"
dump_programs = true

[watcher]
backend = "poll"
poll_interval_ms = 250
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.loader.program_dir, Path::new("/etc/progload/progs"));
    assert_eq!(cfg.loader.extension, "mtail");
    assert!(cfg.loader.dump_programs);
    assert_eq!(cfg.watcher.backend, WatcherBackend::Poll);
    assert_eq!(cfg.watcher.poll_interval_ms, 250);
}

#[test]
fn leading_dot_extension_is_a_config_error() {
    let file = config_file("[loader]\nextension = \".prog\"\n");

    match load_and_validate(file.path()) {
        Err(ProgloadError::ConfigError(msg)) => {
            assert!(msg.contains("leading dot"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_extension_is_a_config_error() {
    let file = config_file("[loader]\nextension = \"\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ProgloadError::ConfigError(_))
    ));
}

#[test]
fn zero_poll_interval_is_a_config_error() {
    let file = config_file("[watcher]\npoll_interval_ms = 0\n");

    match load_and_validate(file.path()) {
        Err(ProgloadError::ConfigError(msg)) => {
            assert!(msg.contains("poll_interval_ms"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_backend_is_a_toml_error() {
    let file = config_file("[watcher]\nbackend = \"carrier-pigeon\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(ProgloadError::TomlError(_))
    ));
}

#[test]
fn backend_parses_from_cli_strings() {
    assert_eq!("Poll".parse::<WatcherBackend>(), Ok(WatcherBackend::Poll));
    assert_eq!(" native ".parse::<WatcherBackend>(), Ok(WatcherBackend::Native));
    assert!("inotify".parse::<WatcherBackend>().is_err());
}
