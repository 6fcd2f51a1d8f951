//! Robot configuration.
//!
//! One immutable [`RobotConfig`] describes a hardware revision: port
//! assignments, reversal flags, voltage limits and every tunable gain,
//! tolerance and duration. It is loaded once at start-up and handed to the
//! components by reference, so the same core serves every robot variant.
//!
//! Serialized as JSON by the host tools.

use alloc::{vec, vec::Vec};
use core::fmt;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::utils::time::ms;

/// A motor port and whether its output must be mirrored.
///
/// Reversal corrects physical gearing and is applied once when the
/// actuator bank is built, never per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSpec {
    pub port: u8,
    #[serde(default)]
    pub reversed: bool,
}

impl MotorSpec {
    pub const fn new(
        port: u8,
        reversed: bool,
    ) -> Self {
        Self { port, reversed }
    }
}

/// Motor wiring and voltage limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Magnitude limit for every drive command (mV).
    pub max_mv: i32,
    pub left: Vec<MotorSpec>,
    pub right: Vec<MotorSpec>,
    pub intake: Vec<MotorSpec>,
    /// Voltage used by the intake in/out helpers (mV).
    pub intake_mv: i32,
    pub flicker: Option<MotorSpec>,
    /// Voltage of a single flick pulse (mV).
    pub flick_mv: i32,
    /// Length of a single flick pulse.
    pub flick_ms: u32,
}

/// Joystick shaping and loop cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub deadband: i32,
    /// Largest magnitude an axis reports.
    pub input_max: i32,
    /// Driver control tick period.
    pub tick_ms: u32,
}

/// Autonomous executor timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutonomousConfig {
    /// Pause after every timed drive so motion decays before the next step.
    pub settle_ms: u32,
    /// Pause between the up and down halves of a flick.
    pub flick_pause_ms: u32,
}

/// Vision alignment tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Signature the aligner tracks.
    pub signature: u8,
    pub frame_center_x: i32,
    pub tolerance: i32,
    /// Proportional gain, millivolts per pixel of error.
    pub gain: i32,
    pub turn_cap_mv: i32,
    /// Turn voltage of the open-loop search sweep when nothing is visible.
    pub search_mv: i32,
    /// Objects narrower than this are treated as noise.
    pub min_width: i32,
    pub poll_ms: u32,
    pub default_timeout_ms: u32,
}

/// Output wiring of a pneumatic actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lines", rename_all = "snake_case")]
pub enum ToggleWiring {
    /// One line whose level mirrors the actuator state.
    Single { port: char },
    /// Double solenoid: two mutually exclusive lines.
    Double { extend: char, retract: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PneumaticsConfig {
    pub lift: ToggleWiring,
    pub descorer: ToggleWiring,
}

/// Complete description of one robot revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub drive: DriveConfig,
    pub input: InputConfig,
    pub autonomous: AutonomousConfig,
    pub vision: VisionConfig,
    pub pneumatics: PneumaticsConfig,
}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NonPositiveMaxVoltage,
    NonPositiveInputRange,
    EmptyDriveSide,
    ZeroPollInterval,
    ZeroTickPeriod,
    NegativeTolerance,
    /// A motor port is claimed by more than one group or listed twice.
    DuplicateMotorPort(u8),
    /// A solenoid line drives more than one output.
    SharedSolenoidLine(char),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::NonPositiveMaxVoltage => f.write_str("drive.max_mv must be positive"),
            ConfigError::NonPositiveInputRange => f.write_str("input.input_max must be positive"),
            ConfigError::EmptyDriveSide => f.write_str("each drive side needs at least one motor"),
            ConfigError::ZeroPollInterval => f.write_str("vision.poll_ms must be non-zero"),
            ConfigError::ZeroTickPeriod => f.write_str("input.tick_ms must be non-zero"),
            ConfigError::NegativeTolerance => {
                f.write_str("vision.tolerance must not be negative")
            }
            ConfigError::DuplicateMotorPort(port) => {
                write!(f, "motor port {port} is assigned more than once")
            }
            ConfigError::SharedSolenoidLine(line) => {
                write!(f, "solenoid line '{line}' is assigned more than once")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

impl RobotConfig {
    /// Check the values the control arithmetic depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drive.max_mv <= 0 {
            return Err(ConfigError::NonPositiveMaxVoltage);
        }
        if self.input.input_max <= 0 {
            return Err(ConfigError::NonPositiveInputRange);
        }
        if self.drive.left.is_empty() || self.drive.right.is_empty() {
            return Err(ConfigError::EmptyDriveSide);
        }
        if self.vision.poll_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.input.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.vision.tolerance < 0 {
            return Err(ConfigError::NegativeTolerance);
        }
        self.check_motor_ports()?;
        self.check_solenoid_lines()
    }

    fn check_motor_ports(&self) -> Result<(), ConfigError> {
        let drive = &self.drive;
        let mut seen: Vec<u8> = Vec::new();
        let specs = drive
            .left
            .iter()
            .chain(&drive.right)
            .chain(&drive.intake)
            .chain(&drive.flicker);
        for spec in specs {
            if seen.contains(&spec.port) {
                return Err(ConfigError::DuplicateMotorPort(spec.port));
            }
            seen.push(spec.port);
        }
        Ok(())
    }

    // Two outputs on one line would let a double solenoid assert both sides.
    fn check_solenoid_lines(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<char> = Vec::new();
        for wiring in [self.pneumatics.lift, self.pneumatics.descorer] {
            for line in wiring.lines() {
                if seen.contains(&line) {
                    return Err(ConfigError::SharedSolenoidLine(line));
                }
                seen.push(line);
            }
        }
        Ok(())
    }
}

impl ToggleWiring {
    /// Every output line this actuator drives.
    pub fn lines(&self) -> Vec<char> {
        match *self {
            ToggleWiring::Single { port } => vec![port],
            ToggleWiring::Double { extend, retract } => vec![extend, retract],
        }
    }
}

impl AutonomousConfig {
    pub const fn settle(&self) -> Duration {
        ms(self.settle_ms)
    }

    pub const fn flick_pause(&self) -> Duration {
        ms(self.flick_pause_ms)
    }
}

impl InputConfig {
    pub const fn tick(&self) -> Duration {
        ms(self.tick_ms)
    }
}

impl VisionConfig {
    pub const fn poll(&self) -> Duration {
        ms(self.poll_ms)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_mv: 12_000,
            // The top motors are gear-inverted, so their flags differ from the
            // motors below them.
            left: vec![
                MotorSpec::new(1, false),
                MotorSpec::new(2, true),
                MotorSpec::new(3, true),
            ],
            right: vec![
                MotorSpec::new(4, true),
                MotorSpec::new(5, false),
                MotorSpec::new(6, false),
            ],
            intake: vec![MotorSpec::new(7, false), MotorSpec::new(8, true)],
            intake_mv: 12_000,
            flicker: Some(MotorSpec::new(9, false)),
            flick_mv: 10_000,
            flick_ms: 175,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            deadband: 5,
            input_max: 127,
            tick_ms: 10,
        }
    }
}

impl Default for AutonomousConfig {
    fn default() -> Self {
        Self {
            settle_ms: 50,
            flick_pause_ms: 250,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            signature: 1,
            // 316 px wide image
            frame_center_x: 158,
            tolerance: 12,
            gain: 35,
            turn_cap_mv: 3_000,
            search_mv: 1_800,
            min_width: 10,
            poll_ms: 20,
            default_timeout_ms: 1_000,
        }
    }
}

impl Default for PneumaticsConfig {
    fn default() -> Self {
        Self {
            lift: ToggleWiring::Double {
                extend: 'A',
                retract: 'B',
            },
            descorer: ToggleWiring::Single { port: 'D' },
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            drive: DriveConfig::default(),
            input: InputConfig::default(),
            autonomous: AutonomousConfig::default(),
            vision: VisionConfig::default(),
            pneumatics: PneumaticsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(RobotConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = RobotConfig::default();
        cfg.drive.max_mv = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveMaxVoltage));

        let mut cfg = RobotConfig::default();
        cfg.drive.right.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyDriveSide));

        let mut cfg = RobotConfig::default();
        cfg.vision.poll_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPollInterval));

        let mut cfg = RobotConfig::default();
        cfg.input.input_max = -127;
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveInputRange));
    }

    #[test]
    fn test_validate_rejects_reused_motor_ports() {
        let mut cfg = RobotConfig::default();
        cfg.drive.flicker = Some(MotorSpec::new(7, false));
        assert_eq!(cfg.validate(), Err(ConfigError::DuplicateMotorPort(7)));

        let mut cfg = RobotConfig::default();
        cfg.drive.left.push(MotorSpec::new(1, true));
        assert_eq!(cfg.validate(), Err(ConfigError::DuplicateMotorPort(1)));
    }

    #[test]
    fn test_validate_rejects_shared_solenoid_lines() {
        let mut cfg = RobotConfig::default();
        cfg.pneumatics.lift = ToggleWiring::Double {
            extend: 'A',
            retract: 'A',
        };
        assert_eq!(cfg.validate(), Err(ConfigError::SharedSolenoidLine('A')));

        let mut cfg = RobotConfig::default();
        cfg.pneumatics.descorer = ToggleWiring::Single { port: 'B' };
        assert_eq!(cfg.validate(), Err(ConfigError::SharedSolenoidLine('B')));
        assert_eq!(
            ConfigError::SharedSolenoidLine('B').to_string(),
            "solenoid line 'B' is assigned more than once"
        );
    }

    #[test]
    fn test_config_json_shape() {
        let cfg = RobotConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"lines\":\"double\""));
        let back: RobotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
