// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `controller`, `car`, and `call` binaries and checks
//! the operator-visible behavior over localhost TCP.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Resolve the path to a compiled workspace binary.
pub fn binary(name: &str) -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join(name)
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Block until something accepts TCP connections on the port.
pub fn wait_listening(port: u16, timeout: Duration) -> anyhow::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if std::net::TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return Ok(());
        }
        anyhow::ensure!(Instant::now() < deadline, "nothing listening on port {port}");
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// A car name unique to this test process; car names feed shared-memory
/// object names, which are machine-global.
pub fn unique_car_name(tag: &str) -> String {
    format!("{tag}{}", std::process::id())
}

/// A spawned elevator process, killed on drop.
pub struct Proc {
    child: Child,
    shm_object: Option<String>,
}

impl Proc {
    /// Spawn the controller on the given port.
    pub fn controller(port: u16) -> anyhow::Result<Proc> {
        Self::spawn("controller", &["--host", "127.0.0.1", "--port", &port.to_string()], port, None)
    }

    /// Spawn a car wired to a controller port.
    pub fn car(
        name: &str,
        lowest: &str,
        highest: &str,
        delay_ms: u64,
        controller_port: u16,
    ) -> anyhow::Result<Proc> {
        Self::spawn(
            "car",
            &[name, lowest, highest, &delay_ms.to_string()],
            controller_port,
            Some(format!("car{name}")),
        )
    }

    fn spawn(
        name: &str,
        args: &[&str],
        controller_port: u16,
        shm_object: Option<String>,
    ) -> anyhow::Result<Proc> {
        let bin = binary(name);
        anyhow::ensure!(
            bin.exists(),
            "{name} binary not found at {} (build the workspace first)",
            bin.display()
        );
        let child = Command::new(&bin)
            .args(args)
            .env("LIFT_CONTROLLER_PORT", controller_port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(Proc { child, shm_object })
    }
}

impl Drop for Proc {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        // A killed car never unlinks its record; clear it so reruns and
        // later tests start clean.
        if let Some(ref object) = self.shm_object {
            let _ = std::fs::remove_file(format!("/dev/shm/{object}"));
        }
    }
}

/// Run the one-shot `call` binary and capture its stdout.
pub fn call(port: u16, source: &str, destination: &str) -> anyhow::Result<String> {
    let bin = binary("call");
    anyhow::ensure!(bin.exists(), "call binary not found at {}", bin.display());
    let output = Command::new(&bin)
        .args([source, destination])
        .env("LIFT_CONTROLLER_PORT", port.to_string())
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

/// Call repeatedly until stdout matches `want`. Registration and status
/// reports land asynchronously, so early verdicts may differ.
pub fn call_until(
    port: u16,
    source: &str,
    destination: &str,
    want: &str,
    timeout: Duration,
) -> anyhow::Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        let got = call(port, source, destination)?;
        if got == want {
            return Ok(());
        }
        anyhow::ensure!(
            Instant::now() < deadline,
            "wanted {want:?} from call {source} {destination}, kept getting {got:?}"
        );
        std::thread::sleep(Duration::from_millis(100));
    }
}
