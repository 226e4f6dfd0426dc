//! Integration tests for the rgx CLI
//!
//! These verify end-to-end behavior of the binary against scratch fixture
//! files: exit codes, PNG output, and in-place encoding.

use std::path::Path;
use std::process::Command;

/// Run rgx with the given arguments.
fn run_rgx(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rgx"))
        .args(args)
        .output()
        .expect("Failed to execute rgx")
}

#[test]
fn test_formats_lists_builtins() {
    let output = run_rgx(&["formats"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("psx24"));
    assert!(stdout.contains("packed-4bpp"));
}

#[test]
fn test_decode_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("fixture.bin");
    // Two 8x8 4bpp elements
    std::fs::write(&rom, vec![0x5Au8; 64]).unwrap();
    let out = dir.path().join("out.png");

    let output = run_rgx(&[
        "decode",
        rom.to_str().unwrap(),
        "--format",
        "packed-4bpp",
        "--cols",
        "2",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let image = image::open(&out).unwrap().to_rgba8();
    assert_eq!(image.width(), 16);
    assert_eq!(image.height(), 8);
}

#[test]
fn test_decode_short_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("short.bin");
    std::fs::write(&rom, vec![0u8; 16]).unwrap();

    let output = run_rgx(&[
        "decode",
        rom.to_str().unwrap(),
        "--format",
        "packed-4bpp",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("insufficient data"));
}

#[test]
fn test_decode_unknown_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("fixture.bin");
    std::fs::write(&rom, vec![0u8; 32]).unwrap();

    let output = run_rgx(&[
        "decode",
        rom.to_str().unwrap(),
        "--format",
        "no-such-format",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_decode_encode_roundtrip_preserves_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("fixture.bin");
    let original: Vec<u8> = (0..32).map(|i| (i * 9 + 2) as u8).collect();
    std::fs::write(&rom, &original).unwrap();
    let png = dir.path().join("tile.png");

    let output = run_rgx(&[
        "decode",
        rom.to_str().unwrap(),
        "--format",
        "packed-4bpp",
        "-o",
        png.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let output = run_rgx(&[
        "encode",
        rom.to_str().unwrap(),
        png.to_str().unwrap(),
        "--format",
        "packed-4bpp",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // The grayscale default palette is injective, so nearest-color
    // matching recovers the exact indices and the bytes survive
    assert_eq!(std::fs::read(&rom).unwrap(), original);
}

#[test]
fn test_encode_wrong_image_size_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("fixture.bin");
    std::fs::write(&rom, vec![0u8; 32]).unwrap();
    let png = dir.path().join("wrong.png");
    image::RgbaImage::new(4, 4).save(&png).unwrap();

    let output = run_rgx(&[
        "encode",
        rom.to_str().unwrap(),
        png.to_str().unwrap(),
        "--format",
        "packed-4bpp",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(std::fs::read(&rom).unwrap(), vec![0u8; 32]);
}

#[test]
fn test_custom_descriptor_file() {
    let dir = tempfile::tempdir().unwrap();
    let rom = dir.path().join("fixture.bin");
    std::fs::write(&rom, vec![0u8; 16]).unwrap();
    let descriptor = dir.path().join("fmt.json");
    std::fs::write(
        &descriptor,
        r#"{"kind": "indexed", "name": "g2", "width": 8, "height": 8, "color_depth": 2}"#,
    )
    .unwrap();
    let out = dir.path().join("out.png");

    let output = run_rgx(&[
        "decode",
        rom.to_str().unwrap(),
        "--format",
        descriptor.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(Path::new(&out).exists());
}
