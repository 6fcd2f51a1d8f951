//! Proportional vision alignment.
//!
//! Turns the robot in place until the tracked signature sits within
//! `tolerance` pixels of the frame center, or until the timeout elapses.
//!
//! ```text
//! SCANNING --centered--> CENTERED
//!     \------timeout---> TIMED_OUT
//! ```
//!
//! While scanning with nothing valid in view the robot sweeps at a fixed
//! `search_mv`. With a target in view the turn command is
//! `clamp(error * gain, ±turn_cap_mv)` applied as `(+turn, -turn)`. Both
//! terminal states leave the drivetrain stopped.

use embassy_time::Duration;

use crate::utils::{
    config::VisionConfig,
    controllers::actuators::{ActuatorBank, Motor},
    math::control::proportional_turn,
    time::Clock,
    vision::{VisionObject, VisionSensor},
};

/// Alignment state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignState {
    Scanning,
    Centered,
    TimedOut,
}

impl AlignState {
    pub fn is_centered(self) -> bool {
        self == AlignState::Centered
    }
}

/// Closed-loop turn-to-target controller owning the vision sensor.
pub struct VisionAligner<V> {
    sensor: V,
    config: VisionConfig,
}

impl<V: VisionSensor> VisionAligner<V> {
    pub fn new(
        sensor: V,
        config: VisionConfig,
    ) -> Self {
        Self { sensor, config }
    }

    /// Sample the tracked signature, discarding invalid observations.
    pub fn sample(&mut self) -> Option<VisionObject> {
        self.sensor
            .largest(self.config.signature)
            .filter(|obj| obj.is_valid(self.config.min_width))
    }

    /// One control iteration: returns the next state and commands the drive.
    pub fn step<M: Motor>(
        &mut self,
        bank: &mut ActuatorBank<M>,
    ) -> AlignState {
        let Some(target) = self.sample() else {
            bank.drive_tank(self.config.search_mv, -self.config.search_mv);
            return AlignState::Scanning;
        };

        // Widened so any sensor reading is representable.
        let error = i64::from(target.x_middle) - i64::from(self.config.frame_center_x);
        if error.abs() <= i64::from(self.config.tolerance) {
            bank.stop();
            return AlignState::Centered;
        }

        let turn = proportional_turn(error, self.config.gain, self.config.turn_cap_mv);
        bank.drive_tank(turn, -turn);
        AlignState::Scanning
    }

    /// Run until centered or `timeout` elapses. Blocks.
    ///
    /// Never fails: a timeout is reported as [`AlignState::TimedOut`] with the
    /// drivetrain stopped.
    pub fn align<M: Motor>(
        &mut self,
        bank: &mut ActuatorBank<M>,
        clock: &mut impl Clock,
        timeout: Duration,
    ) -> AlignState {
        let start = clock.now();
        let mut iterations = 0u32;

        while clock.since(start) < timeout {
            iterations += 1;
            if self.step(bank) == AlignState::Centered {
                tracing::info!(
                    iterations,
                    elapsed_ms = clock.since(start).as_millis(),
                    "vision target centered"
                );
                return AlignState::Centered;
            }
            clock.delay(self.config.poll());
        }

        bank.stop();
        tracing::warn!(
            iterations,
            timeout_ms = timeout.as_millis(),
            "vision alignment timed out"
        );
        AlignState::TimedOut
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{
        config::DriveConfig,
        sim::{MotorProbe, ScriptedVision, SimMotor},
        time::{ms, ManualClock},
    };
    use alloc::{vec, vec::Vec};

    fn bank() -> (ActuatorBank<SimMotor>, Vec<MotorProbe>) {
        let mut probes = Vec::new();
        let bank = ActuatorBank::build(&DriveConfig::default(), |spec| {
            let motor = SimMotor::new(spec.port);
            probes.push(motor.probe());
            motor
        });
        (bank, probes)
    }

    fn scripted(
        frames: impl IntoIterator<Item = Option<VisionObject>>,
    ) -> VisionAligner<ScriptedVision> {
        VisionAligner::new(ScriptedVision::new(frames), VisionConfig::default())
    }

    fn target(x: i32) -> Option<VisionObject> {
        Some(VisionObject {
            signature: 1,
            x_middle: x,
            width: 40,
        })
    }

    #[test]
    fn test_error_at_tolerance_is_centered() {
        let (mut bank, probes) = bank();
        let mut aligner = scripted([target(170)]);
        let mut clock = ManualClock::new();

        let state = aligner.align(&mut bank, &mut clock, ms(1_000));
        assert_eq!(state, AlignState::Centered);
        assert_eq!(bank.last_drive(), (0, 0));
        assert!(probes.iter().all(|p| p.voltage() == 0));
        assert!(clock.elapsed_ms() <= 20);
    }

    #[test]
    fn test_proportional_turn_applied() {
        let (mut bank, _) = bank();
        let mut aligner = scripted([target(200)]);
        assert_eq!(aligner.step(&mut bank), AlignState::Scanning);
        assert_eq!(bank.last_drive(), (1_470, -1_470));
    }

    #[test]
    fn test_turn_capped() {
        let (mut bank, _) = bank();
        let mut aligner = scripted([target(20)]);
        aligner.step(&mut bank);
        assert_eq!(bank.last_drive(), (-3_000, 3_000));
    }

    #[test]
    fn test_extreme_offsets_saturate_turn() {
        let (mut bank, _) = bank();
        let mut aligner = scripted([target(i32::MIN), target(i32::MAX)]);
        assert_eq!(aligner.step(&mut bank), AlignState::Scanning);
        assert_eq!(bank.last_drive(), (-3_000, 3_000));
        assert_eq!(aligner.step(&mut bank), AlignState::Scanning);
        assert_eq!(bank.last_drive(), (3_000, -3_000));
    }

    #[test]
    fn test_invalid_observations_trigger_search() {
        let (mut bank, _) = bank();
        let narrow = Some(VisionObject {
            signature: 1,
            x_middle: 158,
            width: 9,
        });
        let sentinel = Some(VisionObject {
            signature: 0,
            x_middle: 158,
            width: 80,
        });
        let mut aligner = scripted(vec![None, narrow, sentinel]);
        for _ in 0..3 {
            assert_eq!(aligner.step(&mut bank), AlignState::Scanning);
            assert_eq!(bank.last_drive(), (1_800, -1_800));
        }
    }

    #[test]
    fn test_blind_sensor_times_out() {
        let (mut bank, probes) = bank();
        let vision = ScriptedVision::blind();
        let queries = vision.probe();
        let mut aligner = VisionAligner::new(vision, VisionConfig::default());
        let mut clock = ManualClock::new();

        let state = aligner.align(&mut bank, &mut clock, ms(1_000));
        assert_eq!(state, AlignState::TimedOut);
        assert!(!state.is_centered());
        assert_eq!(clock.elapsed_ms(), 1_000);
        assert_eq!(queries.samples(), 50);
        assert_eq!(bank.last_drive(), (0, 0));
        assert!(probes.iter().all(|p| p.voltage() == 0));
    }

    #[test]
    fn test_converges_on_drifting_target() {
        let (mut bank, _) = bank();
        let vision = ScriptedVision::converging(1, 240, 160, 10, 30);
        let mut aligner = VisionAligner::new(vision, VisionConfig::default());
        let mut clock = ManualClock::new();

        let state = aligner.align(&mut bank, &mut clock, ms(1_000));
        assert!(state.is_centered());
        // 240, 230, ..., 170 is the first sample within 12 px.
        assert_eq!(clock.elapsed_ms(), 7 * 20);
    }

    #[test]
    fn test_zero_timeout_stops_without_sampling() {
        let (mut bank, _) = bank();
        bank.drive_tank(5_000, 5_000);
        let vision = ScriptedVision::new([target(158)]);
        let queries = vision.probe();
        let mut aligner = VisionAligner::new(vision, VisionConfig::default());
        let mut clock = ManualClock::new();
        assert_eq!(aligner.align(&mut bank, &mut clock, ms(0)), AlignState::TimedOut);
        assert_eq!(queries.samples(), 0);
        assert_eq!(bank.last_drive(), (0, 0));
    }
}
