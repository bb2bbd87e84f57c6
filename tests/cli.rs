// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn mandel() -> Command {
    Command::cargo_bin("mandel").unwrap()
}

#[test]
fn renders_a_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("set.png");
    mandel()
        .args(&["render", "--size", "64x48", "--iterations", "60", "--threads", "1", "-o"])
        .arg(&out)
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
}

#[test]
fn renders_with_preset_and_overrides() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("styled.jpg");
    mandel()
        .args(&[
            "render",
            "--size",
            "40x30",
            "--window=-0.8,-0.7,0.05,0.15",
            "--preset",
            "deep-structure",
            "--theme",
            "ocean",
            "--steps",
            "0",
            "--oversample",
            "2",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn style_file_is_read() {
    let dir = tempdir().unwrap();
    let style = dir.path().join("style.json");
    std::fs::write(&style, r#"{"palette": {"phases": [0.1, 0.2, 0.3], "cycles": 8}}"#).unwrap();
    let out = dir.path().join("styled.png");
    mandel()
        .args(&["render", "--size", "16x16", "--style"])
        .arg(&style)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    std::fs::write(&style, r#"{"palette": {"phases": [1.5, 0.2, 0.3]}}"#).unwrap();
    mandel()
        .args(&["render", "--size", "16x16", "--style"])
        .arg(&style)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid render configuration"));
}

#[test]
fn inverted_window_is_reported() {
    let dir = tempdir().unwrap();
    mandel()
        .args(&["render", "--window=1,0,-1,1", "-o"])
        .arg(dir.path().join("never.png"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:").and(predicate::str::contains("invalid view window")));
}

#[test]
fn unreadable_style_reports_its_causes() {
    let dir = tempdir().unwrap();
    let style = dir.path().join("style.json");
    std::fs::write(&style, "{").unwrap();
    mandel()
        .args(&["render", "--size", "16x16", "--style"])
        .arg(&style)
        .arg("-o")
        .arg(dir.path().join("never.png"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: malformed JSON: ").and(predicate::str::contains("line 1")));

    mandel()
        .args(&["render", "--size", "16x16", "--style"])
        .arg(dir.path().join("absent.json"))
        .arg("-o")
        .arg(dir.path().join("never.png"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: i/o failure: "));
}

#[test]
fn unknown_preset_is_refused() {
    mandel()
        .args(&["render", "--preset", "paisley", "-o", "x.png"])
        .assert()
        .failure();
}

#[test]
fn bookmarks_round_trip_through_the_cli() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("marks.json");

    mandel()
        .args(&["bookmark", "--add", "seahorse", "--window=-0.76,-0.74,0.09,0.11", "--bookmarks"])
        .arg(&file)
        .assert()
        .success();

    mandel()
        .args(&["bookmark", "--list", "--bookmarks"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("seahorse: -0.76,-0.74,0.09,0.11"));

    let out = dir.path().join("seahorse.png");
    mandel()
        .args(&["render", "--size", "20x20", "--bookmark", "seahorse", "--bookmarks"])
        .arg(&file)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());

    mandel()
        .args(&["bookmark", "--remove", "seahorse", "--bookmarks"])
        .arg(&file)
        .assert()
        .success();

    mandel()
        .args(&["bookmark", "--remove", "seahorse", "--bookmarks"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bookmark named 'seahorse'"));
}

#[test]
fn animates_a_zoom() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("zoom.gif");
    mandel()
        .args(&[
            "animate",
            "--size",
            "24x16",
            "--from=-2,1,-1,1",
            "--to-center=-0.75,0.1",
            "--zoom",
            "50",
            "--frames",
            "3",
            "--iterations",
            "60",
            "--dynamic-iterations",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..3], b"GIF");
}
