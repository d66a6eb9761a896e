//! System output volume control.
//!
//! The gesture pipeline only needs two things from the audio system: the
//! valid level range, queried once, and a way to set a level. Backends drive
//! the standard Linux mixer command line tools, or just log the requested
//! level for dry runs.

use crate::{
    constants::PULSE_VOLUME_NORM,
    error::{AppError, Result},
    utils::safe_cast::round_to_i32,
};
use log::{debug, info};
use std::process::Command;

/// Valid level domain reported by a volume backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    /// Lowest accepted level
    pub min: f64,
    /// Highest accepted level
    pub max: f64,
}

impl VolumeRange {
    /// Create a range
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are not finite or `min > max`
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AppError::VolumeControl(format!(
                "Invalid volume range {min} - {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Whether `level` lies inside the range
    #[must_use]
    pub fn contains(&self, level: f64) -> bool {
        (self.min..=self.max).contains(&level)
    }

    /// The range as a `(min, max)` tuple
    #[must_use]
    pub const fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Something whose output volume can be set
pub trait VolumeControl: Send {
    /// Level domain accepted by [`set_level`](Self::set_level)
    fn volume_range(&self) -> VolumeRange;

    /// Apply a new level
    ///
    /// # Errors
    ///
    /// Returns an error if the level is outside the range or the backend fails
    fn set_level(&mut self, level: f64) -> Result<()>;

    /// Backend name
    fn name(&self) -> &str;
}

/// Dry-run backend that only logs levels
pub struct LogVolume {
    range: VolumeRange,
    last_level: Option<f64>,
}

impl LogVolume {
    /// Create a logging backend with a 0-100 range
    #[must_use]
    pub const fn new() -> Self {
        Self {
            range: VolumeRange { min: 0.0, max: 100.0 },
            last_level: None,
        }
    }

    /// Most recent level received
    #[must_use]
    pub const fn last_level(&self) -> Option<f64> {
        self.last_level
    }
}

impl Default for LogVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeControl for LogVolume {
    fn volume_range(&self) -> VolumeRange {
        self.range
    }

    fn set_level(&mut self, level: f64) -> Result<()> {
        check_level(&self.range, level)?;
        info!("Volume level {:.2}", level);
        self.last_level = Some(level);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// ALSA mixer control driven through `amixer`
pub struct AmixerVolume {
    control: String,
    range: VolumeRange,
}

impl AmixerVolume {
    /// Connect to a mixer control (e.g. `Master`) and query its range
    ///
    /// # Errors
    ///
    /// Returns an error if `amixer` is unavailable or reports no playback limits
    pub fn new(control: &str) -> Result<Self> {
        info!("Initializing amixer volume control for '{}'", control);
        let output = run_command("amixer", &["get", control])?;
        let range = parse_amixer_limits(&output)?;
        info!("Mixer control '{}' range: {} - {}", control, range.min, range.max);

        Ok(Self {
            control: control.to_string(),
            range,
        })
    }
}

impl VolumeControl for AmixerVolume {
    fn volume_range(&self) -> VolumeRange {
        self.range
    }

    fn set_level(&mut self, level: f64) -> Result<()> {
        check_level(&self.range, level)?;
        let raw = round_to_i32(level)?.to_string();
        debug!("amixer sset {} {}", self.control, raw);
        run_command("amixer", &["-q", "sset", &self.control, &raw]).map(|_| ())
    }

    fn name(&self) -> &str {
        "amixer"
    }
}

/// Default `PulseAudio`/`PipeWire` sink driven through `pactl`
pub struct PactlVolume {
    sink: String,
    range: VolumeRange,
}

impl PactlVolume {
    /// Control the given sink (`@DEFAULT_SINK@` for the default)
    ///
    /// # Errors
    ///
    /// Returns an error if `pactl` is not usable
    pub fn new(sink: &str) -> Result<Self> {
        info!("Initializing pactl volume control for '{}'", sink);
        run_command("pactl", &["--version"])?;

        Ok(Self {
            sink: sink.to_string(),
            range: VolumeRange {
                min: 0.0,
                max: PULSE_VOLUME_NORM,
            },
        })
    }
}

impl VolumeControl for PactlVolume {
    fn volume_range(&self) -> VolumeRange {
        self.range
    }

    fn set_level(&mut self, level: f64) -> Result<()> {
        check_level(&self.range, level)?;
        let raw = round_to_i32(level)?.to_string();
        debug!("pactl set-sink-volume {} {}", self.sink, raw);
        run_command("pactl", &["set-sink-volume", &self.sink, &raw]).map(|_| ())
    }

    fn name(&self) -> &str {
        "pactl"
    }
}

/// Create a volume backend by name
///
/// `control` names the mixer control for `amixer` and the sink for `pactl`;
/// the `log` backend ignores it.
///
/// # Errors
///
/// Returns an error for an unknown backend or if the backend cannot start
pub fn create_volume_control(backend: &str, control: &str) -> Result<Box<dyn VolumeControl>> {
    match backend.to_lowercase().as_str() {
        "log" | "none" | "dry-run" => Ok(Box::new(LogVolume::new())),
        "amixer" | "alsa" => Ok(Box::new(AmixerVolume::new(control)?)),
        "pactl" | "pulse" | "pulseaudio" => {
            let sink = if control.is_empty() || control == "Master" {
                "@DEFAULT_SINK@"
            } else {
                control
            };
            Ok(Box::new(PactlVolume::new(sink)?))
        }
        _ => Err(AppError::VolumeControl(format!("Unknown volume backend: {backend}"))),
    }
}

/// Extract the raw playback range from `amixer get <control>` output
///
/// Looks for a line like `  Limits: Playback 0 - 87`.
///
/// # Errors
///
/// Returns an error if no parsable `Limits:` line is present
pub fn parse_amixer_limits(output: &str) -> Result<VolumeRange> {
    let line = output
        .lines()
        .find(|line| line.trim_start().starts_with("Limits:"))
        .ok_or_else(|| AppError::VolumeControl("amixer output has no 'Limits:' line".to_string()))?;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let dash = tokens
        .iter()
        .rposition(|t| *t == "-")
        .filter(|&i| i > 0 && i + 1 < tokens.len())
        .ok_or_else(|| AppError::VolumeControl(format!("Cannot parse mixer limits: '{}'", line.trim())))?;

    let parse = |token: &str| {
        token
            .parse::<f64>()
            .map_err(|e| AppError::VolumeControl(format!("Bad mixer limit '{token}': {e}")))
    };

    VolumeRange::new(parse(tokens[dash - 1])?, parse(tokens[dash + 1])?)
}

fn check_level(range: &VolumeRange, level: f64) -> Result<()> {
    if range.contains(level) {
        Ok(())
    } else {
        Err(AppError::VolumeControl(format!(
            "Level {level} outside volume range {} - {}",
            range.min, range.max
        )))
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| AppError::VolumeControl(format!("Failed to run {program}: {e}")))?;

    if !output.status.success() {
        return Err(AppError::VolumeControl(format!(
            "{program} {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMIXER_MASTER: &str = "Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 87
  Mono:
  Front Left: Playback 65 [75%] [-16.50dB] [on]
  Front Right: Playback 65 [75%] [-16.50dB] [on]
";

    #[test]
    fn test_parse_amixer_limits() {
        let range = parse_amixer_limits(AMIXER_MASTER).unwrap();
        assert_eq!(range.bounds(), (0.0, 87.0));
    }

    #[test]
    fn test_parse_amixer_limits_negative_min() {
        let range = parse_amixer_limits("  Limits: Playback -10239 - 400\n").unwrap();
        assert_eq!(range.bounds(), (-10239.0, 400.0));
    }

    #[test]
    fn test_parse_amixer_limits_missing() {
        assert!(parse_amixer_limits("Simple mixer control 'Capture',0\n").is_err());
        assert!(parse_amixer_limits("  Limits: Playback\n").is_err());
        assert!(parse_amixer_limits("  Limits: Playback 10 - 0\n").is_err());
    }

    #[test]
    fn test_volume_range() {
        let range = VolumeRange::new(-65.25, 0.0).unwrap();
        assert!(range.contains(-65.25));
        assert!(range.contains(0.0));
        assert!(!range.contains(0.1));
        assert!(VolumeRange::new(1.0, 0.0).is_err());
        assert!(VolumeRange::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_log_volume() {
        let mut volume = LogVolume::new();
        assert_eq!(volume.volume_range().bounds(), (0.0, 100.0));
        volume.set_level(42.0).unwrap();
        assert_eq!(volume.last_level(), Some(42.0));
        assert!(volume.set_level(120.0).is_err());
        assert_eq!(volume.last_level(), Some(42.0));
    }

    #[test]
    fn test_create_volume_control() {
        assert!(create_volume_control("log", "Master").is_ok());
        assert!(create_volume_control("unknown", "Master").is_err());
    }
}
