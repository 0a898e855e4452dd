//! `hr10` subcommand — run or dry-run the temperature-reactive LED daemon.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Subcommand;

use trcc_core::hr10::{BreathingConfig, Hr10Config, Hr10Daemon, SysfsTempSource};
use trcc_core::sender::SenderCache;

use super::{Result, select_device, TrccConfig};

#[derive(Subcommand)]
pub enum Hr10Action {
    /// Run the daemon loop until Ctrl+C or the failure threshold is hit
    Run {
        #[arg(long = "device")]
        device: Option<String>,
        /// Path to a sysfs hwmon tempN_input file
        #[arg(long)]
        sensor: PathBuf,
    },
    /// Read the sensor once and print the colour/brightness that would be sent
    DryRun {
        /// Path to a sysfs hwmon tempN_input file
        #[arg(long)]
        sensor: PathBuf,
    },
}

fn config_to_hr10(config: &TrccConfig) -> Hr10Config {
    Hr10Config {
        tick_interval: Duration::from_millis(config.hr10_tick_interval_ms.max(1000)),
        failure_threshold: config.hr10_failure_threshold,
        breathing: config.hr10_breathing_enabled.then_some(BreathingConfig {
            period: Duration::from_millis(config.hr10_breathing_period_ms),
            min_brightness: 0.2,
        }),
    }
}

fn cmd_run(device: Option<&str>, sensor: PathBuf) -> Result<()> {
    let descriptor = select_device(device)?;
    let cache = SenderCache::new();
    let sender_handle = cache.get_sender(&descriptor)?;
    {
        let mut guard = sender_handle.lock().expect("sender mutex poisoned");
        guard.handshake()?;
    }

    let config = config_to_hr10(&TrccConfig::load());
    let source = SysfsTempSource { path: sensor };
    let style = {
        let guard = sender_handle.lock().expect("sender mutex poisoned");
        guard.led_style().ok_or_else(|| {
            trcc_core::error::CoreError::UnsupportedDevice(descriptor.vid, descriptor.pid)
        })?
    };
    let mut daemon = Hr10Daemon::new(source, config, style);

    log::info!("hr10: starting daemon for {:04x}:{:04x}", descriptor.vid, descriptor.pid);
    while crate::RUNNING.load(Ordering::SeqCst) {
        let outcome = daemon.tick()?;
        let mut guard = sender_handle.lock().expect("sender mutex poisoned");
        if let Err(e) = guard.send_frame(&outcome.frame) {
            trcc_core::sender::apply_failure_policy(&cache, &descriptor, &e);
            log::warn!("hr10: frame send failed: {e}");
        }
        drop(guard);
        if daemon.exhausted() {
            log::warn!("hr10: exiting after {} consecutive sensor failures", daemon.consecutive_failures());
            break;
        }
        std::thread::sleep(Duration::from_millis(1000));
    }
    Ok(())
}

fn cmd_dry_run(sensor: PathBuf) -> Result<()> {
    let config = config_to_hr10(&TrccConfig::load());
    let source = SysfsTempSource { path: sensor };
    let style = &trcc_core::registry::LED_STYLES[0];
    let mut daemon = Hr10Daemon::new(source, config, style);
    let outcome = daemon.tick()?;
    println!(
        "temp={:.1}C stale={} frame_bytes={}",
        outcome.temp_c,
        outcome.stale,
        outcome.frame.bytes.len()
    );
    Ok(())
}

pub(super) fn run(action: Hr10Action) -> Result<()> {
    match action {
        Hr10Action::Run { device, sensor } => cmd_run(device.as_deref(), sensor),
        Hr10Action::DryRun { sensor } => cmd_dry_run(sensor),
    }
}
