//! Build script for octet-hal-avr
//!
//! - Reads the CPU clock from `OCTET_F_CPU` and validates it
//! - Emits it as a constant for the baud divisor computation

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Clock assumed when `OCTET_F_CPU` is not set
const DEFAULT_F_CPU: u32 = 16_000_000;

fn main() {
    println!("cargo:rerun-if-env-changed=OCTET_F_CPU");
    println!("cargo:rerun-if-changed=build.rs");

    let clock_hz = read_clock();
    write_clock(clock_hz);
}

/// Parse `OCTET_F_CPU`, accepting `_` separators (e.g. `8_000_000`)
fn read_clock() -> u32 {
    let raw = match env::var("OCTET_F_CPU") {
        Ok(raw) => raw,
        Err(_) => return DEFAULT_F_CPU,
    };

    let digits: String = raw.trim().chars().filter(|c| *c != '_').collect();
    match digits.parse::<u32>() {
        // Below 16 Hz no baud rate has a divisor
        Ok(hz) if hz >= 16 => hz,
        Ok(hz) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: OCTET_F_CPU={} is too low                                \n\
            ║                                                                  ║\n\
            ║  Set it to the CPU clock in Hz, e.g. OCTET_F_CPU=16000000.       ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            hz
        ),
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: OCTET_F_CPU is not a number                              ║\n\
            ║                                                                  ║\n\
            ║  Value: {:?}\n\
            ║  Parse error: {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            raw, e
        ),
    }
}

/// Write `clock.rs` into OUT_DIR for `include!`
fn write_clock(clock_hz: u32) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let mut f = File::create(out_dir.join("clock.rs")).expect("create clock.rs");
    writeln!(f, "/// CPU clock in Hz, from `OCTET_F_CPU` at build time").expect("write clock.rs");
    writeln!(f, "pub const CLOCK_HZ: u32 = {};", clock_hz).expect("write clock.rs");
}
