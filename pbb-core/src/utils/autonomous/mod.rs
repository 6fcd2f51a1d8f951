//! Timed autonomous routines.
//!
//! An [`AutonomousSequence`] is an ordered list of [`AutonomousStep`]s built
//! before the match and consumed exactly once by the
//! [`AutonomousSequencer`]. Steps and sequences serialize as JSON with the
//! tag `"step"`, so routines can be authored outside the firmware.

pub mod routines;
pub mod sequencer;

use alloc::vec::{IntoIter, Vec};

use serde::{Deserialize, Serialize};

pub use sequencer::{AutonomousSequencer, SequenceReport};

use crate::utils::controllers::{actuators::BrakeMode, pneumatics::ActuatorTarget};

/// One scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AutonomousStep {
    /// Drive both sides for `duration_ms`, stop, then wait the settle gap.
    DriveTimed {
        left_mv: i32,
        right_mv: i32,
        duration_ms: u32,
    },
    /// Force a pneumatic actuator into a state. Returns immediately.
    SetActuator { target: ActuatorTarget, state: bool },
    /// Turn toward the vision target. Continues whether or not it centers.
    VisionAlign { timeout_ms: u32 },
    Wait { ms: u32 },
    /// Run the intake at `mv` until changed.
    SetIntake { mv: i32 },
    /// One up-then-down flicker cycle.
    Flick,
    SetBrakeMode { mode: BrakeMode },
}

/// Ordered, immutable list of steps.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutonomousSequence {
    steps: Vec<AutonomousStep>,
}

impl AutonomousSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(
        mut self,
        step: AutonomousStep,
    ) -> Self {
        self.steps.push(step);
        self
    }

    pub fn drive_timed(
        self,
        left_mv: i32,
        right_mv: i32,
        duration_ms: u32,
    ) -> Self {
        self.then(AutonomousStep::DriveTimed {
            left_mv,
            right_mv,
            duration_ms,
        })
    }

    pub fn set_actuator(
        self,
        target: ActuatorTarget,
        state: bool,
    ) -> Self {
        self.then(AutonomousStep::SetActuator { target, state })
    }

    pub fn vision_align(
        self,
        timeout_ms: u32,
    ) -> Self {
        self.then(AutonomousStep::VisionAlign { timeout_ms })
    }

    pub fn wait(
        self,
        ms: u32,
    ) -> Self {
        self.then(AutonomousStep::Wait { ms })
    }

    pub fn set_intake(
        self,
        mv: i32,
    ) -> Self {
        self.then(AutonomousStep::SetIntake { mv })
    }

    pub fn flick(self) -> Self {
        self.then(AutonomousStep::Flick)
    }

    pub fn set_brake_mode(
        self,
        mode: BrakeMode,
    ) -> Self {
        self.then(AutonomousStep::SetBrakeMode { mode })
    }

    pub fn steps(&self) -> &[AutonomousStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<AutonomousStep> for AutonomousSequence {
    fn from_iter<I: IntoIterator<Item = AutonomousStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AutonomousSequence {
    type Item = AutonomousStep;
    type IntoIter = IntoIter<AutonomousStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_json_tags() {
        let json = r#"[
            {"step":"drive_timed","left_mv":9000,"right_mv":9000,"duration_ms":1200},
            {"step":"set_actuator","target":"lift","state":true},
            {"step":"vision_align","timeout_ms":800},
            {"step":"wait","ms":300},
            {"step":"flick"},
            {"step":"set_brake_mode","mode":"hold"}
        ]"#;
        let seq: AutonomousSequence = serde_json::from_str(json).unwrap();
        let expected = AutonomousSequence::new()
            .drive_timed(9_000, 9_000, 1_200)
            .set_actuator(ActuatorTarget::Lift, true)
            .vision_align(800)
            .wait(300)
            .flick()
            .set_brake_mode(BrakeMode::Hold);
        assert_eq!(seq, expected);
    }
}
