//! Starts xvic with Sargon II and waits for its monitors.

use std::fs::File;
use std::net::{TcpStream, ToSocketAddrs};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context};

use crate::config::{EmulatorConfig, MonitorConfig};

/// True if an xvic process is running
pub fn xvic_running() -> anyhow::Result<bool> {
    let status = Command::new("pgrep")
        .arg("xvic")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("cannot run pgrep to check for xvic")?;
    Ok(status.success())
}

pub fn xvic_command(emulator: &EmulatorConfig, monitor: &MonitorConfig) -> Command {
    let mut cmd = Command::new(&emulator.xvic);
    cmd.arg("-remotemonitor")
        .arg("-remotemonitoraddress")
        .arg(format!("ip4://{}", monitor.text_addr()))
        .arg("-binarymonitor")
        .arg("-binarymonitoraddress")
        .arg(format!("ip4://{}", monitor.binary_addr()))
        .arg("-memory")
        .arg("8k")
        .arg("-autostartprgmode")
        .arg("1")
        .arg("-config")
        .arg(&emulator.vice_config)
        .arg(&emulator.program);
    cmd
}

/// Spawn xvic, refusing if one is already running
pub fn launch(emulator: &EmulatorConfig, monitor: &MonitorConfig) -> anyhow::Result<Child> {
    if xvic_running()? {
        bail!("xvic already running");
    }
    if !emulator.vice_config.exists() {
        bail!("config file {} does not exist", emulator.vice_config.display());
    }
    let stdout = File::create(&emulator.stdout_log)
        .with_context(|| format!("cannot create {}", emulator.stdout_log.display()))?;
    let stderr = File::create(&emulator.stderr_log)
        .with_context(|| format!("cannot create {}", emulator.stderr_log.display()))?;

    log::info!("starting {} with {}", emulator.xvic.display(), emulator.program.display());
    xvic_command(emulator, monitor)
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .with_context(|| format!("cannot start {}", emulator.xvic.display()))
}

/// Try to connect to `addr` up to `attempts` times
pub fn wait_until_ready(addr: &str, attempts: u32, interval: Duration) -> anyhow::Result<()> {
    let sock_addr = addr
        .to_socket_addrs()
        .with_context(|| format!("bad monitor address {}", addr))?
        .next()
        .with_context(|| format!("no address for {}", addr))?;
    for attempt in 1..=attempts.max(1) {
        match TcpStream::connect_timeout(&sock_addr, interval) {
            Ok(_) => {
                log::info!("monitor at {} ready after {} attempt(s)", addr, attempt);
                return Ok(());
            }
            Err(e) => {
                log::debug!("monitor at {} not ready: {}", addr, e);
                std::thread::sleep(interval);
            }
        }
    }
    bail!("monitor at {} not ready after {} attempts", addr, attempts)
}
