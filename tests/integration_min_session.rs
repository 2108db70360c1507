// Drives the compiled binary through a PTY: real crossterm input, real
// event loop, real clock.
//
// - Requires a TTY; expectrl allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn short_session_times_out_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("molequiz");
    let cmd = format!("{} --builtin sky --secs 1", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // enter starts; the one-second clock ends the session on its own
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(1500));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}
