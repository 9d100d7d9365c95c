//! CLI integration tests for dwranges.
//!
//! Each test writes raw section bytes to a temporary file and runs the
//! binary against it.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the dwranges binary.
fn dwranges_bin() -> String {
    env!("CARGO_BIN_EXE_dwranges").to_string()
}

/// Write `bytes` to `name` inside `dir`.
fn write_section(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("Failed to write section fixture");
    path
}

/// Run dwranges with the given arguments.
fn run_dwranges(args: &[&str]) -> Output {
    Command::new(dwranges_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute dwranges")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// 32-bit .debug_ranges: base selection to 0x8000, two ranges, terminator.
fn legacy_section() -> Vec<u8> {
    [(0xffff_ffffu32, 0x8000u32), (0x10, 0x20), (0x30, 0x40), (0, 0)]
        .iter()
        .flat_map(|(s, e)| s.to_le_bytes().into_iter().chain(e.to_le_bytes()))
        .collect()
}

/// One DWARF32 .debug_rnglists unit with a single offset entry.
///
/// The unit base is 12 and the list lives at section offset 16.
fn rnglists_section(payload: &[u8]) -> Vec<u8> {
    let unit_length = (2 + 1 + 1 + 4 + 4 + payload.len()) as u32;
    let mut data = Vec::new();
    data.extend_from_slice(&unit_length.to_le_bytes());
    data.extend_from_slice(&5u16.to_le_bytes());
    data.push(8); // address_size
    data.push(0); // segment_selector_size
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&4u32.to_le_bytes());
    data.extend_from_slice(payload);
    data
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help() {
    let output = run_dwranges(&["--help"]);
    assert!(output.status.success(), "dwranges --help should succeed");
    let out = stdout(&output);
    assert!(out.contains("range lists"), "Help should describe the tool");
    assert!(out.contains("--kind"), "Help should show --kind option");
    assert!(out.contains("units"), "Help should list the units command");
}

#[test]
fn test_missing_section_file() {
    let output = run_dwranges(&["/nonexistent/section.bin", "list", "--offset", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read section"), "stderr: {stderr}");
}

#[test]
fn test_unknown_kind_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &legacy_section());
    let output = run_dwranges(&[path.to_str().unwrap(), "--kind", "loclists", "list", "--offset", "0"]);
    assert!(!output.status.success());
}

// =============================================================================
// .debug_ranges Tests
// =============================================================================

#[test]
fn test_list_legacy() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &legacy_section());

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--address-size",
        "4",
        "--base",
        "0x1000",
        "list",
        "--offset",
        "0",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(lines, vec!["[0x8010, 0x8020)", "[0x8030, 0x8040)", "min: 0x8010"]);
}

#[test]
fn test_list_legacy_big_endian() {
    let data: Vec<u8> = [(0x100u32, 0x180u32), (0, 0)]
        .iter()
        .flat_map(|(s, e)| s.to_be_bytes().into_iter().chain(e.to_be_bytes()))
        .collect();
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &data);

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--address-size",
        "4",
        "--big-endian",
        "list",
        "--offset",
        "0",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("[0x100, 0x180)"));
}

#[test]
fn test_list_legacy_truncated() {
    let mut data = legacy_section();
    data.truncate(12);
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &data);

    let output = run_dwranges(&[path.to_str().unwrap(), "--address-size", "4", "list", "--offset", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to decode range list"), "stderr: {stderr}");
}

#[test]
fn test_invalid_address_size() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &legacy_section());

    let output = run_dwranges(&[path.to_str().unwrap(), "--address-size", "3", "list", "--offset", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_units_on_legacy_section() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &legacy_section());

    let output = run_dwranges(&[path.to_str().unwrap(), "--address-size", "4", "units"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no unit headers"), "stderr: {stderr}");
}

#[test]
fn test_indexed_on_legacy_section() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "ranges.bin", &legacy_section());

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--address-size",
        "4",
        "list",
        "--unit-base",
        "0",
        "--index",
        "0",
    ]);
    assert!(!output.status.success());
}

// =============================================================================
// .debug_rnglists Tests
// =============================================================================

#[test]
fn test_units() {
    let dir = TempDir::new().unwrap();
    // DW_RLE_offset_pair 0x10..0x20, DW_RLE_end_of_list
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x04, 0x10, 0x20, 0x00]));

    let output = run_dwranges(&[path.to_str().unwrap(), "--kind", "debug-rnglists", "units"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("0x0000000c"), "Should show unit base 12: {out}");
    assert!(out.contains("DWARF32"));
    assert!(out.contains("[0] 0x4 -> 0x10"), "Should show resolved offsets: {out}");
}

#[test]
fn test_list_rnglists_direct() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x04, 0x10, 0x20, 0x00]));

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "--base",
        "0x1000",
        "list",
        "--offset",
        "16",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(lines, vec!["[0x1010, 0x1020)", "min: 0x1010"]);
}

#[test]
fn test_list_rnglists_indexed() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x04, 0x10, 0x20, 0x00]));

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "--base",
        "0x1000",
        "list",
        "--unit-base",
        "12",
        "--index",
        "0",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("[0x1010, 0x1020)"));
}

#[test]
fn test_list_rnglists_index_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x00]));

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "list",
        "--unit-base",
        "12",
        "--index",
        "5",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_list_rnglists_with_address_table() {
    let dir = TempDir::new().unwrap();
    // DW_RLE_startx_endx 0, 1; DW_RLE_end_of_list
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x02, 0x00, 0x01, 0x00]));
    let addrs: Vec<u8> = [0x4000u64, 0x4100]
        .iter()
        .flat_map(|a| a.to_le_bytes())
        .collect();
    let addr_path = write_section(&dir, "addr.bin", &addrs);

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "--addr-section",
        addr_path.to_str().unwrap(),
        "--addr-base",
        "0",
        "list",
        "--offset",
        "16",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(lines, vec!["[0x4000, 0x4100)", "min: 0x4000"]);
}

#[test]
fn test_list_rnglists_with_address_table_header() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x02, 0x00, 0x01, 0x00]));
    // DWARF5 .debug_addr header with 4-byte addresses, slots start at 8
    let mut addrs = Vec::new();
    addrs.extend_from_slice(&12u32.to_le_bytes());
    addrs.extend_from_slice(&5u16.to_le_bytes());
    addrs.push(4);
    addrs.push(0);
    addrs.extend_from_slice(&0x4000u32.to_le_bytes());
    addrs.extend_from_slice(&0x4100u32.to_le_bytes());
    let addr_path = write_section(&dir, "addr.bin", &addrs);

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "--addr-section",
        addr_path.to_str().unwrap(),
        "--addr-header",
        "list",
        "--offset",
        "16",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(lines, vec!["[0x4000, 0x4100)", "min: 0x4000"]);
}

#[test]
fn test_addr_header_requires_addr_section() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x00]));

    let output = run_dwranges(&[
        path.to_str().unwrap(),
        "--kind",
        "debug-rnglists",
        "--addr-header",
        "list",
        "--offset",
        "16",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_list_rnglists_missing_address_table() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x02, 0x00, 0x01, 0x00]));

    let output = run_dwranges(&[path.to_str().unwrap(), "--kind", "debug-rnglists", "list", "--offset", "16"]);
    assert!(!output.status.success());
}

#[test]
fn test_empty_list_prints_zero_min() {
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &rnglists_section(&[0x00]));

    let output = run_dwranges(&[path.to_str().unwrap(), "--kind", "rnglists", "list", "--offset", "16"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "min: 0x0");
}

#[test]
fn test_corrupt_header_rejected() {
    let mut data = rnglists_section(&[0x00]);
    data[4] = 4; // version
    let dir = TempDir::new().unwrap();
    let path = write_section(&dir, "rnglists.bin", &data);

    let output = run_dwranges(&[path.to_str().unwrap(), "--kind", "debug-rnglists", "units"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse .debug_rnglists"), "stderr: {stderr}");
}
