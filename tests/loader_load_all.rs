// tests/loader_load_all.rs

use std::error::Error;
use std::path::Path;

use progload::errors::ProgloadError;
use progload_test_utils::builders::{
    prog_path, LoaderBuilder, INVALID_PROGRAM, PROG_DIR, VALID_PROGRAM,
};
use progload_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn one_invalid_program_does_not_affect_the_others() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .with_program("b.prog", INVALID_PROGRAM)
        .with_program("c.prog", VALID_PROGRAM)
        .with_program("d.prog", VALID_PROGRAM)
        .build();

    let errors = h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(errors, 1);
    let registry = h.loader.registry();
    assert_eq!(registry.names(), vec!["a.prog", "c.prog", "d.prog"]);
    assert!(!registry.contains("b.prog"));
    Ok(())
}

#[test]
fn valid_and_invalid_scenario_counts_each_once() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .with_program("b.prog", INVALID_PROGRAM)
        .build();

    let errors = h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(errors, 1);
    assert_eq!(h.loader.registry().names(), vec!["a.prog"]);
    assert_eq!(h.metrics.loads("a.prog"), 1);
    assert_eq!(h.metrics.errors("a.prog"), 0);
    assert_eq!(h.metrics.loads("b.prog"), 0);
    assert_eq!(h.metrics.errors("b.prog"), 1);
    Ok(())
}

#[test]
fn load_all_subscribes_the_directory_but_not_individual_files() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .build();

    h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(h.watcher.adds(), vec![Path::new(PROG_DIR).to_path_buf()]);
    assert!(h.loader.tracked_names().is_empty());
    Ok(())
}

#[test]
fn load_all_skips_other_suffixes_and_directories() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .with_program("notes.txt", VALID_PROGRAM)
        .with_program("Upper.PROG", VALID_PROGRAM)
        .with_program("noext", VALID_PROGRAM)
        .with_program("a.prog.bak", VALID_PROGRAM)
        .with_subdir("nested.prog")
        .build();
    h.fs.add_file(format!("{PROG_DIR}/nested.prog/inner.prog"), VALID_PROGRAM);

    let errors = h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(errors, 0);
    assert_eq!(*h.compiled.lock().unwrap(), vec!["a.prog".to_string()]);
    assert_eq!(h.loader.registry().names(), vec!["a.prog"]);
    Ok(())
}

#[test]
fn custom_extension_is_honoured() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .extension("mtail")
        .with_program("a.prog", VALID_PROGRAM)
        .with_program("b.mtail", VALID_PROGRAM)
        .build();

    h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(h.loader.registry().names(), vec!["b.mtail"]);
    Ok(())
}

#[test]
fn unlistable_directory_is_fatal() {
    init_tracing();

    let h = LoaderBuilder::new().build();

    match h.loader.load_all(Path::new("/does/not/exist")) {
        Err(ProgloadError::ListPrograms { path, .. }) => {
            assert_eq!(path, Path::new("/does/not/exist"));
        }
        Err(e) => panic!("Expected ListPrograms error, got: {:?}", e),
        Ok(n) => panic!("Expected error, got Ok({n})"),
    }
    assert!(h.loader.registry().is_empty());
}

#[test]
fn empty_directory_loads_nothing() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new().build();

    assert_eq!(h.loader.load_all(Path::new(PROG_DIR))?, 0);
    assert!(h.loader.registry().is_empty());
    Ok(())
}

#[test]
fn load_one_missing_file_counts_an_error_and_leaves_registry_alone() {
    init_tracing();

    let h = LoaderBuilder::new().build();

    let errors = h.loader.load_one(Path::new(PROG_DIR), "ghost.prog");

    assert_eq!(errors, 1);
    assert!(h.loader.registry().is_empty());
    assert_eq!(h.metrics.errors("ghost.prog"), 1);
    assert!(h.compiled.lock().unwrap().is_empty());
    assert_eq!(h.fs.opened(), vec![prog_path("ghost.prog")]);
}

#[test]
fn failed_reload_keeps_previous_program() {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .build();

    assert_eq!(h.loader.load_one(Path::new(PROG_DIR), "a.prog"), 0);
    let before = h.loader.registry().get("a.prog").expect("a.prog loaded");

    h.fs.add_file(prog_path("a.prog"), INVALID_PROGRAM);
    assert_eq!(h.loader.load_one(Path::new(PROG_DIR), "a.prog"), 1);

    let after = h.loader.registry().get("a.prog").expect("a.prog still loaded");
    assert_eq!(before.fingerprint(), after.fingerprint());
    assert_eq!(h.metrics.loads("a.prog"), 1);
    assert_eq!(h.metrics.errors("a.prog"), 1);
}

#[test]
fn successful_reload_replaces_program() {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program("a.prog", VALID_PROGRAM)
        .build();

    h.loader.load_one(Path::new(PROG_DIR), "a.prog");
    let first = h.loader.registry().get("a.prog").expect("a.prog loaded");

    h.fs.add_file(prog_path("a.prog"), "counter errors\n/ERROR/ errors\n");
    assert_eq!(h.loader.load_one(Path::new(PROG_DIR), "a.prog"), 0);

    let second = h.loader.registry().get("a.prog").expect("a.prog reloaded");
    assert_ne!(first.fingerprint(), second.fingerprint());
    assert_eq!(second.metrics(), ["errors".to_string()]);
    assert_eq!(h.loader.registry().len(), 1);
    assert_eq!(h.metrics.loads("a.prog"), 2);
}

#[test]
fn dumping_does_not_change_what_is_registered() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .dump_programs(true)
        .with_program("a.prog", VALID_PROGRAM)
        .with_program("b.prog", INVALID_PROGRAM)
        .build();

    let errors = h.loader.load_all(Path::new(PROG_DIR))?;

    assert_eq!(errors, 1);
    assert_eq!(h.loader.registry().names(), vec!["a.prog"]);
    Ok(())
}

#[test]
fn bare_suffix_file_name_is_loaded() -> TestResult {
    init_tracing();

    let h = LoaderBuilder::new()
        .with_program(".prog", VALID_PROGRAM)
        .with_program(".hidden", VALID_PROGRAM)
        .build();

    assert_eq!(h.loader.load_all(Path::new(PROG_DIR))?, 0);
    assert_eq!(h.loader.registry().names(), vec![".prog"]);
    Ok(())
}
