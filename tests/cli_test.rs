//! Runs the `c8dasm` binary against ROM files on disk

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn write_rom(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("c8dasm-{}-{}", std::process::id(), name));
    fs::write(&path, data).unwrap();
    path
}

fn c8dasm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_c8dasm"))
}

#[test]
fn prints_rom_name_and_listing() {
    let rom = write_rom("loop.ch8", &[0x67, 0x03, 0xA2, 0x06, 0x12, 0x02, 0xF0, 0x90]);

    let output = c8dasm().arg(&rom).output().unwrap();
    fs::remove_file(&rom).unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(&format!("ROM File: {}\n", rom.display())));
    assert!(stdout.ends_with(
        "LD V7, 0x03\n\
         lbl_0x0202:\n\
         LD I, lbl_0x0206\n\
         JP lbl_0x0202\n\
         lbl_0x0206:\n"
    ));
}

#[test]
fn empty_rom_succeeds() {
    let rom = write_rom("empty.ch8", &[]);

    let output = c8dasm().arg(&rom).output().unwrap();
    fs::remove_file(&rom).unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ROM File: "));
}

#[test]
fn data_flag_lists_undecoded_bytes() {
    let rom = write_rom("data.ch8", &[0x12, 0x04, 0xAB, 0xCD]);

    let output = c8dasm().arg("--data").arg(&rom).output().unwrap();
    fs::remove_file(&rom).unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("JP lbl_0x0204\nDB 0xab\nDB 0xcd\nlbl_0x0204:\n"));
}

#[test]
fn insight_flag_prints_breakdown() {
    let rom = write_rom("insight.ch8", &[0x12, 0x4E]);

    let output = c8dasm().arg("--insight").arg(&rom).output().unwrap();
    fs::remove_file(&rom).unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("== DECODING =="));
    assert!(stdout.contains("0001001001001110"));
    assert!(stdout.ends_with("JP lbl_0x024e\nlbl_0x024e:\n"));
}

#[test]
fn missing_rom_fails() {
    let output = c8dasm().arg("no/such/rom.ch8").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to load"));
}
