//! Drivetrain, intake and flicker motors.
//!
//! [`ActuatorBank`] exclusively owns every motor handle. All writes are
//! fire-and-forget: a failed write is logged and the loop keeps running.

use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::utils::{
    config::{DriveConfig, MotorSpec},
    math::control::{clamp_mv, Millivolts},
    time::Clock,
};

/// What a motor does when commanded to zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeMode {
    /// Spin down freely. Used for driver control.
    #[default]
    Coast,
    /// Short the windings. Used for autonomous precision.
    Brake,
    /// Actively hold position. Operator "defense" mode.
    Hold,
}

/// A single voltage-controlled motor.
pub trait Motor {
    type Error: core::fmt::Debug;

    fn set_voltage(
        &mut self,
        mv: Millivolts,
    ) -> Result<(), Self::Error>;

    fn set_brake_mode(
        &mut self,
        mode: BrakeMode,
    ) -> Result<(), Self::Error>;
}

/// A motor with its reversal flag baked in at build time.
struct Mounted<M> {
    motor: M,
    port: u8,
    reversed: bool,
}

impl<M: Motor> Mounted<M> {
    fn new(
        spec: &MotorSpec,
        open: &mut impl FnMut(&MotorSpec) -> M,
    ) -> Self {
        Self {
            motor: open(spec),
            port: spec.port,
            reversed: spec.reversed,
        }
    }

    fn voltage(
        &mut self,
        mv: Millivolts,
    ) {
        let mv = if self.reversed { -mv } else { mv };
        if let Err(e) = self.motor.set_voltage(mv) {
            tracing::error!(port = self.port, "motor voltage write failed: {:?}", e);
        }
    }

    fn brake(
        &mut self,
        mode: BrakeMode,
    ) {
        if let Err(e) = self.motor.set_brake_mode(mode) {
            tracing::error!(port = self.port, "motor brake write failed: {:?}", e);
        }
    }
}

/// Owner of every motor on the robot.
///
/// Each drive side may hold any number of motors; all motors on a side always
/// receive the same voltage.
pub struct ActuatorBank<M> {
    left: Vec<Mounted<M>>,
    right: Vec<Mounted<M>>,
    intake: Vec<Mounted<M>>,
    flicker: Option<Mounted<M>>,
    max_mv: i32,
    intake_mv: i32,
    brake_mode: BrakeMode,
    last_drive: (Millivolts, Millivolts),
    last_intake: Millivolts,
}

impl<M: Motor> ActuatorBank<M> {
    /// Open every configured motor through `open` and apply reversal flags.
    pub fn build(
        config: &DriveConfig,
        mut open: impl FnMut(&MotorSpec) -> M,
    ) -> Self {
        let mut mount = |specs: &[MotorSpec]| {
            specs
                .iter()
                .map(|spec| Mounted::new(spec, &mut open))
                .collect::<Vec<_>>()
        };
        let left = mount(&config.left);
        let right = mount(&config.right);
        let intake = mount(&config.intake);
        let flicker = config
            .flicker
            .as_ref()
            .map(|spec| Mounted::new(spec, &mut open));

        Self {
            left,
            right,
            intake,
            flicker,
            max_mv: config.max_mv,
            intake_mv: config.intake_mv,
            brake_mode: BrakeMode::Coast,
            last_drive: (0, 0),
            last_intake: 0,
        }
    }

    /// Clamp both sides to `±max_mv` and apply them to every motor per side.
    pub fn drive_tank(
        &mut self,
        left_mv: i32,
        right_mv: i32,
    ) {
        let left = clamp_mv(i64::from(left_mv), self.max_mv);
        let right = clamp_mv(i64::from(right_mv), self.max_mv);
        for motor in &mut self.left {
            motor.voltage(left);
        }
        for motor in &mut self.right {
            motor.voltage(right);
        }
        self.last_drive = (left, right);
    }

    /// Zero both drive sides. The motors then follow the current brake mode.
    pub fn stop(&mut self) {
        self.drive_tank(0, 0);
    }

    /// Apply the same voltage to every intake motor.
    pub fn set_intake(
        &mut self,
        mv: i32,
    ) {
        let mv = clamp_mv(i64::from(mv), self.max_mv);
        for motor in &mut self.intake {
            motor.voltage(mv);
        }
        self.last_intake = mv;
    }

    /// Run the intake inward at the configured intake voltage.
    pub fn intake_in(&mut self) {
        self.set_intake(self.intake_mv);
    }

    /// Spit out: the intake voltage, negated.
    pub fn intake_reverse(&mut self) {
        self.set_intake(-self.intake_mv);
    }

    /// Stop the intake.
    pub fn intake_off(&mut self) {
        self.set_intake(0);
    }

    /// Apply a braking policy to all drive motors.
    pub fn set_brake_mode(
        &mut self,
        mode: BrakeMode,
    ) {
        for motor in self.left.iter_mut().chain(self.right.iter_mut()) {
            motor.brake(mode);
        }
        self.brake_mode = mode;
        tracing::debug!(?mode, "drive brake mode set");
    }

    /// Hold the flicker at `mv`, clamped to `±max_mv`.
    ///
    /// Logged and ignored when the robot has no flicker motor.
    pub fn set_flicker(
        &mut self,
        mv: i32,
    ) {
        let mv = clamp_mv(i64::from(mv), self.max_mv);
        match self.flicker.as_mut() {
            Some(motor) => motor.voltage(mv),
            None => tracing::warn!("flicker command ignored, no flicker motor configured"),
        }
    }

    /// Drive the flicker for `duration`, then release it. Blocks.
    pub fn pulse_flicker(
        &mut self,
        mv: i32,
        duration: Duration,
        clock: &mut impl Clock,
    ) {
        self.set_flicker(mv);
        clock.delay(duration);
        self.set_flicker(0);
    }

    /// Last clamped `(left, right)` drive command.
    pub fn last_drive(&self) -> (Millivolts, Millivolts) {
        self.last_drive
    }

    pub fn last_intake(&self) -> Millivolts {
        self.last_intake
    }

    pub fn brake_mode(&self) -> BrakeMode {
        self.brake_mode
    }
}
