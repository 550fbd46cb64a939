use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_folio")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) { "folio.exe" } else { "folio" });
            p
        })
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cli_build_writes_html() {
    let out_path = scratch("build").join("index.html");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args([
            "build",
            "--in",
            "tests/fixtures/resume.json",
            "--template",
            "tests/fixtures/index.html",
            "--cv",
            "cv.pdf",
            "--out",
        ])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains(r#"href="cv.pdf""#));
    assert!(html.contains(">Download CV</a>"));
}

#[test]
fn cli_build_without_resume_writes_fallback_and_fails() {
    let out_path = scratch("fallback").join("index.html");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args([
            "build",
            "--in",
            "tests/fixtures/missing.json",
            "--template",
            "tests/fixtures/index.html",
            "--out",
        ])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(!status.success());
    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("Loading Error"));
    assert!(html.contains("Please check resume.json"));
}

#[test]
fn cli_data_and_cv() {
    let dir = scratch("data_cv");
    let data_path = dir.join("data.json");
    let cv_path = dir.join("cv.tex");

    let status = std::process::Command::new(exe())
        .args(["data", "--in", "tests/fixtures/resume.json", "--out"])
        .arg(&data_path)
        .status()
        .unwrap();
    assert!(status.success());
    let data: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data_path).unwrap()).unwrap();
    assert_eq!(data["personal"]["name"], "Ada Lovelace");
    assert_eq!(data["degrees"].as_array().map(Vec::len), Some(3));

    let status = std::process::Command::new(exe())
        .args(["cv", "--in", "tests/fixtures/resume.json", "--out"])
        .arg(&cv_path)
        .status()
        .unwrap();
    assert!(status.success());
    let tex = std::fs::read_to_string(&cv_path).unwrap();
    assert!(tex.contains(r"\section{Certifications}"));
}

#[test]
fn cli_frame_writes_png() {
    let out_path = scratch("frame").join("bg.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args([
            "frame", "--frame", "10", "--width", "64", "--height", "48", "--out",
        ])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
}

#[test]
fn cli_frame_rejects_out_of_range_index() {
    let out_path = scratch("frame_range").join("bg.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args(["frame", "--frame", "18446744073709551615", "--out"])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!out_path.exists());
}
