//! HR10 LED Temperature Daemon (L7): a periodic loop reading a drive
//! temperature sensor and rendering it to a 7-segment-like LED arrangement
//! via the shared LED pipeline.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::models::{FrameJob, LedDeviceStyle};
use crate::pixel;

/// Minimum tick interval the daemon will honour, regardless of config.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Default number of consecutive read failures before the daemon exits.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

/// Abstracts the drive temperature sensor (a sysfs hwmon node in practice)
/// so the daemon loop is testable without real hardware.
pub trait TempSource {
    fn read_temp_c(&mut self) -> std::io::Result<f32>;
}

/// Reads a sysfs hwmon `tempN_input` file, which reports millidegrees
/// Celsius as a plain integer.
pub struct SysfsTempSource {
    pub path: std::path::PathBuf,
}

impl TempSource for SysfsTempSource {
    fn read_temp_c(&mut self) -> std::io::Result<f32> {
        let raw = std::fs::read_to_string(&self.path)?;
        let millidegrees: i64 = raw.trim().parse().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "non-numeric sensor value")
        })?;
        Ok(millidegrees as f32 / 1000.0)
    }
}

/// One colour stop in the banded temperature gradient: `(temp_c, colour)`.
/// The gradient linearly interpolates between the two stops bracketing the
/// current reading, and clamps to the first/last colour outside the range.
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub temp_c: f32,
    pub colour: u32,
}

/// Default banded gradient: cool blue, through green/yellow, to hot red.
pub const DEFAULT_GRADIENT: &[GradientStop] = &[
    GradientStop { temp_c: 30.0, colour: 0x0000_80FF },
    GradientStop { temp_c: 45.0, colour: 0x0000_FF00 },
    GradientStop { temp_c: 60.0, colour: 0x00FF_FF00 },
    GradientStop { temp_c: 75.0, colour: 0x00FF_8000 },
    GradientStop { temp_c: 90.0, colour: 0x00FF_0000 },
];

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

fn lerp_colour(a: u32, b: u32, t: f32) -> u32 {
    let [_, ar, ag, ab] = a.to_be_bytes();
    let [_, br, bg, bb] = b.to_be_bytes();
    u32::from_be_bytes([0, lerp_channel(ar, br, t), lerp_channel(ag, bg, t), lerp_channel(ab, bb, t)])
}

/// Map a temperature reading to a colour via the configured banded
/// gradient.
pub fn colour_for_temperature(temp_c: f32, gradient: &[GradientStop]) -> u32 {
    if gradient.is_empty() {
        return 0;
    }
    if temp_c <= gradient[0].temp_c {
        return gradient[0].colour;
    }
    if let Some(last) = gradient.last() {
        if temp_c >= last.temp_c {
            return last.colour;
        }
    }
    for pair in gradient.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if temp_c >= lo.temp_c && temp_c <= hi.temp_c {
            let span = hi.temp_c - lo.temp_c;
            let t = if span > 0.0 { (temp_c - lo.temp_c) / span } else { 0.0 };
            return lerp_colour(lo.colour, hi.colour, t);
        }
    }
    gradient.last().unwrap().colour
}

/// Sine-wave brightness envelope in `[min_brightness, 1.0]` over `period`.
pub fn breathing_brightness(elapsed: Duration, period: Duration, min_brightness: f32) -> f32 {
    if period.is_zero() {
        return 1.0;
    }
    let phase = (elapsed.as_secs_f64() / period.as_secs_f64()) * std::f64::consts::TAU;
    let wave = (phase.sin() as f32 + 1.0) / 2.0; // 0..1
    min_brightness + (1.0 - min_brightness) * wave
}

fn scale_colour(colour: u32, brightness: f32) -> u32 {
    let [_, r, g, b] = colour.to_be_bytes();
    let scale = |c: u8| (c as f32 * brightness).round().clamp(0.0, 255.0) as u8;
    u32::from_be_bytes([0, scale(r), scale(g), scale(b)])
}

/// Optional breathing configuration.
#[derive(Debug, Clone, Copy)]
pub struct BreathingConfig {
    pub period: Duration,
    pub min_brightness: f32,
}

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Hr10Config {
    pub tick_interval: Duration,
    pub failure_threshold: u32,
    pub breathing: Option<BreathingConfig>,
}

impl Default for Hr10Config {
    fn default() -> Self {
        Self {
            tick_interval: MIN_TICK_INTERVAL,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            breathing: None,
        }
    }
}

/// Result of one tick: the frame that was (or would be) rendered, and
/// whether this tick came from a live reading or a carried-forward value.
pub struct TickOutcome {
    pub frame: FrameJob,
    pub temp_c: f32,
    pub stale: bool,
    pub consecutive_failures: u32,
}

/// HR10 daemon state machine. Owns no transport directly — callers drive
/// `tick()` and push the resulting frame through a sender, keeping this
/// module free of USB/process concerns and therefore trivially testable.
pub struct Hr10Daemon<T: TempSource> {
    source: T,
    config: Hr10Config,
    style: &'static LedDeviceStyle,
    gradient: Vec<GradientStop>,
    last_good_temp: Option<f32>,
    consecutive_failures: u32,
    started_at: Instant,
}

impl<T: TempSource> Hr10Daemon<T> {
    pub fn new(source: T, config: Hr10Config, style: &'static LedDeviceStyle) -> Self {
        Self {
            source,
            config,
            style,
            gradient: DEFAULT_GRADIENT.to_vec(),
            last_good_temp: None,
            consecutive_failures: 0,
            started_at: Instant::now(),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether the daemon should exit after the current failure streak.
    pub fn exhausted(&self) -> bool {
        self.consecutive_failures >= self.config.failure_threshold
    }

    /// Read the sensor, render one frame, and update failure bookkeeping.
    /// On read failure the previous value is displayed; the caller should
    /// check [`Self::exhausted`] afterwards and stop the loop if so.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let (temp_c, stale) = match self.source.read_temp_c() {
            Ok(t) => {
                self.consecutive_failures = 0;
                self.last_good_temp = Some(t);
                (t, false)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                log::warn!(
                    "hr10: sensor read failed ({e}), consecutive failures = {}",
                    self.consecutive_failures
                );
                (self.last_good_temp.unwrap_or(0.0), true)
            }
        };

        let base_colour = colour_for_temperature(temp_c, &self.gradient);
        let colour = match self.config.breathing {
            Some(b) => {
                let brightness = breathing_brightness(self.started_at.elapsed(), b.period, b.min_brightness);
                scale_colour(base_colour, brightness)
            }
            None => base_colour,
        };

        let colours = vec![colour; self.style.led_count as usize];
        let frame = pixel::led_segments(&colours, self.style)?;

        Ok(TickOutcome {
            frame,
            temp_c,
            stale,
            consecutive_failures: self.consecutive_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SequenceSource {
        values: std::collections::VecDeque<std::io::Result<f32>>,
    }

    impl TempSource for SequenceSource {
        fn read_temp_c(&mut self) -> std::io::Result<f32> {
            self.values
                .pop_front()
                .unwrap_or_else(|| Err(std::io::Error::new(std::io::ErrorKind::Other, "exhausted")))
        }
    }

    fn style() -> &'static LedDeviceStyle {
        &crate::registry::LED_STYLES[0]
    }

    #[test]
    fn gradient_clamps_outside_range() {
        assert_eq!(
            colour_for_temperature(-10.0, DEFAULT_GRADIENT),
            DEFAULT_GRADIENT[0].colour
        );
        assert_eq!(
            colour_for_temperature(200.0, DEFAULT_GRADIENT),
            DEFAULT_GRADIENT.last().unwrap().colour
        );
    }

    #[test]
    fn gradient_interpolates_midpoint() {
        let c = colour_for_temperature(37.5, DEFAULT_GRADIENT); // halfway 30->45
        assert_ne!(c, DEFAULT_GRADIENT[0].colour);
        assert_ne!(c, DEFAULT_GRADIENT[1].colour);
    }

    #[test]
    fn breathing_envelope_stays_in_bounds() {
        for ms in [0u64, 250, 500, 750, 1000, 1500] {
            let b = breathing_brightness(Duration::from_millis(ms), Duration::from_secs(1), 0.2);
            assert!(b >= 0.2 && b <= 1.0);
        }
    }

    #[test]
    fn tick_uses_previous_value_on_failure_and_counts() {
        let source = SequenceSource {
            values: [Ok(40.0), Err(std::io::Error::new(std::io::ErrorKind::Other, "x")), Err(std::io::Error::new(std::io::ErrorKind::Other, "x"))]
                .into_iter()
                .collect(),
        };
        let mut daemon = Hr10Daemon::new(source, Hr10Config::default(), style());

        let t1 = daemon.tick().unwrap();
        assert!(!t1.stale);
        assert_eq!(t1.temp_c, 40.0);

        let t2 = daemon.tick().unwrap();
        assert!(t2.stale);
        assert_eq!(t2.temp_c, 40.0);
        assert_eq!(daemon.consecutive_failures(), 1);

        let t3 = daemon.tick().unwrap();
        assert!(t3.stale);
        assert_eq!(daemon.consecutive_failures(), 2);
    }

    #[test]
    fn exhausted_after_default_threshold() {
        let values = (0..DEFAULT_FAILURE_THRESHOLD)
            .map(|_| Err(std::io::Error::new(std::io::ErrorKind::Other, "x")))
            .collect();
        let source = SequenceSource { values };
        let mut daemon = Hr10Daemon::new(source, Hr10Config::default(), style());
        for _ in 0..DEFAULT_FAILURE_THRESHOLD {
            daemon.tick().unwrap();
        }
        assert!(daemon.exhausted());
    }

    #[test]
    fn success_resets_failure_counter() {
        let source = SequenceSource {
            values: [
                Err(std::io::Error::new(std::io::ErrorKind::Other, "x")),
                Ok(50.0),
            ]
            .into_iter()
            .collect(),
        };
        let mut daemon = Hr10Daemon::new(source, Hr10Config::default(), style());
        daemon.tick().unwrap();
        assert_eq!(daemon.consecutive_failures(), 1);
        daemon.tick().unwrap();
        assert_eq!(daemon.consecutive_failures(), 0);
    }
}
