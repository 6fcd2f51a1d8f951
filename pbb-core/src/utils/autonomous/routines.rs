//! Built-in autonomous routines.
//!
//! Durations were tuned on the field for the default configuration; a
//! different drivetrain needs its own timings.

use crate::utils::{
    autonomous::AutonomousSequence,
    config::RobotConfig,
    controllers::{actuators::BrakeMode, pneumatics::ActuatorTarget},
};

/// Timed turn to the right at a fixed turn voltage.
const TURN_MV: i32 = 5_000;
const CRUISE_MV: i32 = 9_000;
const LOADER_MV: i32 = 6_000;
const HIGH_GOAL_FLICKS: usize = 6;

/// The match autonomous: collect along the wall, score in the medium goal,
/// empty the loader and finish on the high goal.
pub fn match_routine(config: &RobotConfig) -> AutonomousSequence {
    let intake = config.drive.intake_mv;
    let align_timeout = config.vision.default_timeout_ms;

    let mut seq = AutonomousSequence::new()
        .set_brake_mode(BrakeMode::Brake)
        // ~3 ft forward while intaking
        .set_intake(intake)
        .drive_timed(CRUISE_MV, CRUISE_MV, 1_200)
        // 90° right
        .drive_timed(TURN_MV, -TURN_MV, 600)
        .drive_timed(CRUISE_MV, CRUISE_MV, 1_200)
        // 135° right
        .drive_timed(TURN_MV, -TURN_MV, 800)
        // ~4 ft to the medium goal
        .drive_timed(CRUISE_MV, CRUISE_MV, 1_600)
        .set_intake(0)
        .vision_align(align_timeout)
        .flick()
        .wait(300)
        // 180°
        .drive_timed(TURN_MV, -TURN_MV, 1_100)
        // ~6 ft
        .drive_timed(CRUISE_MV, CRUISE_MV, 2_400)
        // 45° right
        .drive_timed(TURN_MV, -TURN_MV, 300)
        .set_actuator(ActuatorTarget::Lift, true)
        .wait(300)
        .set_intake(intake)
        .drive_timed(LOADER_MV, LOADER_MV, 800)
        // six balls from the loader
        .wait(2_000)
        .drive_timed(-CRUISE_MV, -CRUISE_MV, 1_200)
        .set_actuator(ActuatorTarget::Descorer, true)
        .wait(200);

    for _ in 0..HIGH_GOAL_FLICKS {
        seq = seq.flick().wait(120);
    }

    seq.set_intake(0)
        .set_actuator(ActuatorTarget::Descorer, false)
        .set_actuator(ActuatorTarget::Lift, false)
}

/// Drive off the line and stop. Fallback when nothing else is safe.
pub fn drive_off_line(config: &RobotConfig) -> AutonomousSequence {
    let mv = config.drive.max_mv / 2;
    AutonomousSequence::new()
        .set_brake_mode(BrakeMode::Brake)
        .drive_timed(mv, mv, 800)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::autonomous::AutonomousStep;

    #[test]
    fn test_match_routine_shape() {
        let seq = match_routine(&RobotConfig::default());
        let flicks = seq
            .steps()
            .iter()
            .filter(|s| matches!(s, AutonomousStep::Flick))
            .count();
        assert_eq!(flicks, 1 + HIGH_GOAL_FLICKS);
        assert_eq!(
            seq.steps().first(),
            Some(&AutonomousStep::SetBrakeMode {
                mode: BrakeMode::Brake
            })
        );
        assert_eq!(
            seq.steps().last(),
            Some(&AutonomousStep::SetActuator {
                target: ActuatorTarget::Lift,
                state: false
            })
        );
    }

    #[test]
    fn test_drive_off_line_uses_half_voltage() {
        let mut config = RobotConfig::default();
        config.drive.max_mv = 10_000;
        let seq = drive_off_line(&config);
        assert_eq!(
            seq.steps(),
            &[
                AutonomousStep::SetBrakeMode {
                    mode: BrakeMode::Brake
                },
                AutonomousStep::DriveTimed {
                    left_mv: 5_000,
                    right_mv: 5_000,
                    duration_ms: 800
                },
            ]
        );
    }
}
