//! End-to-end tests for `zplc convert` and `zplc inspect`.

use assert_cmd::Command;
use zpl_courier_assets::crc32;
use zpl_courier_assets::png::SIGNATURE;

/// Serialize one PNG chunk with a valid CRC.
fn make_chunk(tag: &str, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(data);
    let mut checksummed = tag.as_bytes().to_vec();
    checksummed.extend_from_slice(data);
    out.extend_from_slice(&crc32(&checksummed).to_be_bytes());
    out
}

fn tiny_png() -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&2u32.to_be_bytes());
    ihdr.extend_from_slice(&2u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);

    let mut png = SIGNATURE.to_vec();
    png.extend(make_chunk("IHDR", &ihdr));
    png.extend(make_chunk("IDAT", &[0x08, 0x1D, 0x01, 0x02]));
    png.extend(make_chunk("IEND", &[]));
    png
}

#[test]
fn convert_writes_a_hex_framed_download_object() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("logo.png");
    let out_path = dir.path().join("logo.zpl");
    let image = tiny_png();
    std::fs::write(&image_path, &image).unwrap();

    Command::cargo_bin("zplc")
        .unwrap()
        .args([
            "convert",
            image_path.to_str().unwrap(),
            "--name",
            "LOGO",
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let rendered = std::fs::read_to_string(&out_path).unwrap();
    let expected_prefix = format!("~DYR:LOGO,P,P,{},{},", image.len(), image.len());
    assert!(rendered.starts_with(&expected_prefix), "rendered: {rendered}");
    // Hex framing only: every payload character is a hex digit.
    let payload = &rendered[expected_prefix.len()..];
    assert!(payload.bytes().all(|b| b.is_ascii_hexdigit()));
}

#[test]
fn convert_refuses_a_corrupt_image() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("bad.png");
    let mut image = tiny_png();
    let last = image.len() - 1;
    image[last] ^= 0xFF; // break IEND's CRC
    std::fs::write(&image_path, &image).unwrap();

    let output = Command::cargo_bin("zplc")
        .unwrap()
        .args(["convert", image_path.to_str().unwrap(), "--name", "LOGO"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CRC"), "stderr: {stderr}");
}

#[test]
fn inspect_lists_chunks_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("logo.png");
    std::fs::write(&image_path, tiny_png()).unwrap();

    let output = Command::cargo_bin("zplc")
        .unwrap()
        .args(["inspect", image_path.to_str().unwrap(), "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let chunks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let chunks = chunks.as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["type"], "IHDR");
    assert_eq!(chunks[0]["crcMatched"], true);
    assert_eq!(chunks[0]["decoded"]["width"], 2);
    assert_eq!(chunks[1]["type"], "IDAT");
    assert_eq!(chunks[2]["type"], "IEND");
}

#[test]
fn inspect_flags_crc_mismatches_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("bad.png");
    let mut image = tiny_png();
    let last = image.len() - 1;
    image[last] ^= 0xFF;
    std::fs::write(&image_path, &image).unwrap();

    let output = Command::cargo_bin("zplc")
        .unwrap()
        .args(["inspect", image_path.to_str().unwrap(), "--output", "json"])
        .output()
        .unwrap();
    // Chunks are still listed, but the exit code signals corruption.
    assert!(!output.status.success());

    let chunks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let chunks = chunks.as_array().unwrap();
    assert_eq!(chunks[2]["type"], "IEND");
    assert_eq!(chunks[2]["crcMatched"], false);
}
