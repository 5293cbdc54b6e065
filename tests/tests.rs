//! Integration tests for our command-line interface. We actually run the
//! binary and make sure it produces the expected output. Anything that
//! needs real video or a Tesseract install is covered by the scenario
//! tests in `src/extract.rs` instead.

use std::str::from_utf8;

use cli_test_dir::TestDir;

#[test]
fn show_help() {
    let testdir = TestDir::new("hardsub", "show_help");
    let output = testdir
        .cmd()
        .arg("--help")
        .output()
        .expect("could not run hardsub");
    assert!(output.status.success());
    assert!(from_utf8(&output.stdout).unwrap().find("Usage").is_some());
}

#[test]
fn show_version() {
    let testdir = TestDir::new("hardsub", "show_version");
    let output = testdir
        .cmd()
        .arg("--version")
        .output()
        .expect("could not run hardsub");
    assert!(output.status.success());
    assert!(from_utf8(&output.stdout).unwrap().find("hardsub ").is_some());
}

#[test]
fn missing_video_fails() {
    let testdir = TestDir::new("hardsub", "missing_video_fails");
    let output = testdir
        .cmd()
        .arg("no-such-video.mp4")
        .output()
        .expect("could not run hardsub");
    assert!(!output.status.success());
}
