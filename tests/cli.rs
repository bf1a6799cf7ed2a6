use image::{Rgb, RgbImage};
use std::path::Path;
use std::process::Command;

fn geostamp() -> Command {
    Command::new(env!("CARGO_BIN_EXE_geostamp"))
}

#[test]
fn missing_input_prints_and_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let out = geostamp()
        .current_dir(dir.path())
        .args(["--input", "missing.jpg"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("File missing.jpg not found!"), "{stdout}");
    assert!(!dir.path().join("output_photo.jpg").exists());
}

#[test]
fn default_input_name_is_checked() {
    let dir = tempfile::tempdir().unwrap();
    let out = geostamp().current_dir(dir.path()).output().unwrap();

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("File 1.jpeg not found!"));
}

#[test]
fn annotates_with_location_file() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(640, 480, Rgb([40, 60, 80]))
        .save(dir.path().join("photo.png"))
        .unwrap();
    std::fs::write(
        dir.path().join("where.yaml"),
        "date: 1 Jan 2025\ntime: 12.00.00\nlocation: Test Site\ncompass_angle: 90\n",
    )
    .unwrap();
    let font = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blocks.ttf");

    let out = geostamp()
        .current_dir(dir.path())
        .args(["-i", "photo.png", "-o", "stamped.jpg", "-l", "where.yaml"])
        .arg("--font")
        .arg(&font)
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Saved annotated image to stamped.jpg"));
    let stamped = image::open(dir.path().join("stamped.jpg")).unwrap();
    assert_eq!((640, 480), (stamped.width(), stamped.height()));
}

#[test]
fn unreadable_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("photo.jpg"), b"not an image").unwrap();

    let out = geostamp()
        .current_dir(dir.path())
        .args(["-i", "photo.jpg"])
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to open input image"));
}
