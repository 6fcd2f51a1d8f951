//! Sequential, open-loop step executor.
//!
//! Steps run strictly in order and each blocks for its declared duration.
//! Nothing a step does can halt the sequence: a vision timeout is counted and
//! the next step runs anyway.

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;

use crate::utils::{
    autonomous::{AutonomousSequence, AutonomousStep},
    config::RobotConfig,
    controllers::{
        actuators::{ActuatorBank, Motor},
        pneumatics::Pneumatics,
    },
    time::{ms, Clock},
    vision::{AlignState, VisionAligner, VisionSensor},
};

/// Summary of one autonomous run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceReport {
    pub steps_run: usize,
    pub aligns_centered: usize,
    pub aligns_timed_out: usize,
}

/// Borrowed view of the actuation surface for the length of one run.
pub struct AutonomousSequencer<'r, M, P, V, C> {
    bank: &'r mut ActuatorBank<M>,
    pneumatics: &'r mut Pneumatics<P>,
    aligner: &'r mut VisionAligner<V>,
    clock: &'r mut C,
    settle: Duration,
    flick_mv: i32,
    flick_pulse: Duration,
    flick_pause: Duration,
}

impl<'r, M, P, V, C> AutonomousSequencer<'r, M, P, V, C>
where
    M: Motor,
    P: OutputPin,
    V: VisionSensor,
    C: Clock,
{
    pub fn new(
        bank: &'r mut ActuatorBank<M>,
        pneumatics: &'r mut Pneumatics<P>,
        aligner: &'r mut VisionAligner<V>,
        clock: &'r mut C,
        config: &RobotConfig,
    ) -> Self {
        Self {
            bank,
            pneumatics,
            aligner,
            clock,
            settle: config.autonomous.settle(),
            flick_mv: config.drive.flick_mv,
            flick_pulse: ms(config.drive.flick_ms),
            flick_pause: config.autonomous.flick_pause(),
        }
    }

    /// Execute every step of `sequence` in order.
    pub fn run(
        &mut self,
        sequence: AutonomousSequence,
    ) -> SequenceReport {
        let mut report = SequenceReport::default();
        let start = self.clock.now();
        tracing::info!(steps = sequence.len(), "autonomous sequence started");

        for (index, step) in sequence.into_iter().enumerate() {
            tracing::debug!(index, ?step, "executing step");
            self.execute(step, &mut report);
            report.steps_run += 1;
        }

        tracing::info!(
            steps = report.steps_run,
            centered = report.aligns_centered,
            timed_out = report.aligns_timed_out,
            elapsed_ms = self.clock.since(start).as_millis(),
            "autonomous sequence finished"
        );
        report
    }

    fn execute(
        &mut self,
        step: AutonomousStep,
        report: &mut SequenceReport,
    ) {
        match step {
            AutonomousStep::DriveTimed {
                left_mv,
                right_mv,
                duration_ms,
            } => {
                self.bank.drive_tank(left_mv, right_mv);
                self.clock.delay(ms(duration_ms));
                self.bank.stop();
                self.clock.delay(self.settle);
            }
            AutonomousStep::SetActuator { target, state } => {
                self.pneumatics.get_mut(target).set_state(state);
            }
            AutonomousStep::VisionAlign { timeout_ms } => {
                match self.aligner.align(&mut *self.bank, &mut *self.clock, ms(timeout_ms)) {
                    AlignState::Centered => report.aligns_centered += 1,
                    _ => report.aligns_timed_out += 1,
                }
            }
            AutonomousStep::Wait { ms: wait } => self.clock.delay(ms(wait)),
            AutonomousStep::SetIntake { mv } => self.bank.set_intake(mv),
            AutonomousStep::Flick => {
                self.bank
                    .pulse_flicker(self.flick_mv, self.flick_pulse, &mut *self.clock);
                self.clock.delay(self.flick_pause);
                self.bank
                    .pulse_flicker(-self.flick_mv, self.flick_pulse, &mut *self.clock);
                self.clock.delay(self.flick_pause);
            }
            AutonomousStep::SetBrakeMode { mode } => self.bank.set_brake_mode(mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{
        config::RobotConfig,
        controllers::{
            actuators::BrakeMode,
            pneumatics::{ActuatorTarget, ToggleLines},
        },
        sim::{ScriptedVision, SimMotor, SimPin},
        time::ManualClock,
        vision::VisionObject,
    };

    struct Rig {
        config: RobotConfig,
        bank: ActuatorBank<SimMotor>,
        pneumatics: Pneumatics<SimPin>,
        aligner: VisionAligner<ScriptedVision>,
        clock: ManualClock,
    }

    impl Rig {
        fn new(vision: ScriptedVision) -> Self {
            let config = RobotConfig::default();
            Rig {
                bank: ActuatorBank::build(&config.drive, |spec| SimMotor::new(spec.port)),
                pneumatics: Pneumatics::new(
                    ToggleLines::Double {
                        extend: SimPin::new('A'),
                        retract: SimPin::new('B'),
                    },
                    ToggleLines::Single(SimPin::new('D')),
                ),
                aligner: VisionAligner::new(vision, config.vision),
                clock: ManualClock::new(),
                config,
            }
        }

        fn run(
            &mut self,
            sequence: AutonomousSequence,
        ) -> SequenceReport {
            AutonomousSequencer::new(
                &mut self.bank,
                &mut self.pneumatics,
                &mut self.aligner,
                &mut self.clock,
                &self.config,
            )
            .run(sequence)
        }
    }

    #[test]
    fn test_drive_timed_blocking_includes_settle() {
        let mut rig = Rig::new(ScriptedVision::blind());
        let seq = AutonomousSequence::new()
            .drive_timed(9_000, 9_000, 1_200)
            .drive_timed(5_000, -5_000, 600)
            .drive_timed(-9_000, -9_000, 400);
        let report = rig.run(seq);

        assert_eq!(report.steps_run, 3);
        assert_eq!(rig.clock.elapsed_ms(), 1_200 + 600 + 400 + 3 * 50);
        assert_eq!(rig.bank.last_drive(), (0, 0));
    }

    #[test]
    fn test_interleaved_waits_and_actuators() {
        let mut rig = Rig::new(ScriptedVision::blind());
        let seq = AutonomousSequence::new()
            .set_actuator(ActuatorTarget::Lift, true)
            .wait(300)
            .drive_timed(6_000, 6_000, 800)
            .set_intake(12_000)
            .set_brake_mode(BrakeMode::Hold);
        rig.run(seq);

        assert_eq!(rig.clock.elapsed_ms(), 300 + 800 + 50);
        assert!(rig.pneumatics.lift.is_asserted());
        assert!(!rig.pneumatics.descorer.is_asserted());
        assert_eq!(rig.bank.last_intake(), 12_000);
        assert_eq!(rig.bank.brake_mode(), BrakeMode::Hold);
    }

    #[test]
    fn test_vision_timeout_does_not_halt_sequence() {
        let mut rig = Rig::new(ScriptedVision::blind());
        let seq = AutonomousSequence::new()
            .vision_align(500)
            .set_actuator(ActuatorTarget::Descorer, true)
            .drive_timed(3_000, 3_000, 100);
        let report = rig.run(seq);

        assert_eq!(report.steps_run, 3);
        assert_eq!(report.aligns_timed_out, 1);
        assert_eq!(report.aligns_centered, 0);
        assert!(rig.pneumatics.descorer.is_asserted());
        assert_eq!(rig.clock.elapsed_ms(), 500 + 100 + 50);
    }

    #[test]
    fn test_vision_centered_counted() {
        let vision = ScriptedVision::new([Some(VisionObject {
            signature: 1,
            x_middle: 150,
            width: 25,
        })]);
        let mut rig = Rig::new(vision);
        let report = rig.run(AutonomousSequence::new().vision_align(1_000));
        assert_eq!(report.aligns_centered, 1);
        assert_eq!(rig.clock.elapsed_ms(), 0);
    }

    #[test]
    fn test_flick_cycle_timing() {
        let mut rig = Rig::new(ScriptedVision::blind());
        rig.run(AutonomousSequence::new().flick());
        assert_eq!(rig.clock.elapsed_ms(), 2 * (175 + 250));
    }

    #[test]
    fn test_empty_sequence() {
        let mut rig = Rig::new(ScriptedVision::blind());
        assert_eq!(rig.run(AutonomousSequence::new()), SequenceReport::default());
        assert_eq!(rig.clock.elapsed_ms(), 0);
    }
}
