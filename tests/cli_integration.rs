#![cfg(all(feature = "cli", feature = "bzip2"))]

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_bzflow").to_string()
}

#[test]
fn cli_compress_decompress_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    let packed = dir.path().join("notes.txt.bz2");
    let data = b"line one\nline two\nline three\n".repeat(500);
    std::fs::write(&input, &data).unwrap();

    let st = Command::new(bin())
        .args(["compress", "--keep"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(st.success());
    assert!(packed.exists());
    assert!(input.exists());

    std::fs::remove_file(&input).unwrap();
    let st = Command::new(bin())
        .arg("decompress")
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&input).unwrap(), data);
    assert!(!packed.exists(), "input is removed without --keep");
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("a.bin");
    let existing = dir.path().join("a.bin.bz2");
    std::fs::write(&input, b"payload").unwrap();
    std::fs::write(&existing, b"keep me").unwrap();

    let st = Command::new(bin())
        .args(["compress", "-k"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");

    let st = Command::new(bin())
        .args(["--force", "compress", "-k"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(st.success());
    assert_ne!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn cli_stdin_stdout_pipeline() {
    let data = b"streamed through pipes ".repeat(1000);

    let mut child = Command::new(bin())
        .args(["compress", "--buffer-size", "4K"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&data).unwrap();
    let packed = child.wait_with_output().unwrap();
    assert!(packed.status.success());
    assert!(packed.stdout.starts_with(b"BZh"));

    let mut child = Command::new(bin())
        .args(["decompress", "--buffer-size", "1K"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&packed.stdout).unwrap();
    let restored = child.wait_with_output().unwrap();
    assert!(restored.status.success());
    assert_eq!(restored.stdout, data);
}

#[test]
fn cli_stdin_honors_output_flag() {
    let dir = tempdir().unwrap();
    let packed = dir.path().join("piped.bz2");
    let restored = dir.path().join("piped.txt");
    let data = b"piped into a named file ".repeat(300);

    let mut child = Command::new(bin())
        .args(["compress", "-o"])
        .arg(&packed)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&data).unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert!(std::fs::read(&packed).unwrap().starts_with(b"BZh"));

    let st = Command::new(bin())
        .args(["decompress", "-o"])
        .arg(&restored)
        .stdin(std::fs::File::open(&packed).unwrap())
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn cli_rejects_output_aliasing_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("same.bin");
    std::fs::write(&input, b"do not truncate me").unwrap();
    let alias = dir.path().join(".").join("same.bin");

    let st = Command::new(bin())
        .args(["--force", "compress", "-k", "-o"])
        .arg(&alias)
        .arg(&input)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&input).unwrap(), b"do not truncate me");
}

#[test]
fn cli_trailing_reject_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("t.txt");
    std::fs::write(&input, b"trailing test").unwrap();
    let st = Command::new(bin())
        .args(["compress", "-k"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(st.success());

    let packed = dir.path().join("t.txt.bz2");
    let mut bytes = std::fs::read(&packed).unwrap();
    bytes.extend_from_slice(b"junk");
    std::fs::write(&packed, &bytes).unwrap();

    let out = dir.path().join("t.out");
    let st = Command::new(bin())
        .args(["decompress", "-k", "--trailing", "reject", "-o"])
        .arg(&out)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(!st.success());
    assert!(!out.exists());

    let st = Command::new(bin())
        .args(["--force", "decompress", "-k", "-o"])
        .arg(&out)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&out).unwrap(), b"trailing test");
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.dat");
    let b = dir.path().join("b.dat");
    std::fs::write(&a, vec![1u8; 10_000]).unwrap();
    std::fs::write(&b, vec![2u8; 20_000]).unwrap();

    let out = Command::new(bin())
        .args(["--json", "compress", "-k"])
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(json["command"], "compress");
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["input_size"], 20_000);
    assert_eq!(files[0]["format"], "bzip2");
}

#[test]
fn cli_corrupt_input_fails() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.bz2");
    std::fs::write(&bogus, b"definitely not bzip2").unwrap();
    let st = Command::new(bin())
        .args(["decompress", "-k"])
        .arg(&bogus)
        .status()
        .unwrap();
    assert!(!st.success());
    assert!(!dir.path().join("bogus").exists());
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stderr);
    assert!(text.contains("FORMAT_BZIP2=1"));
}
