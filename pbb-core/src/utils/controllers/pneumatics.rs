//! Edge-triggered pneumatic toggles.
//!
//! A [`DigitalToggle`] drives either one output line that mirrors its state,
//! or the two lines of a double solenoid. For a double solenoid exactly one
//! line is high at any time: the line being released is always driven low
//! before the other is driven high. Cylinder travel time is not modelled.

use embedded_hal::digital::OutputPin;
use serde::{Deserialize, Serialize};

/// Output lines owned by a toggle.
pub enum ToggleLines<P> {
    Single(P),
    Double { extend: P, retract: P },
}

/// Bistable actuator state machine.
pub struct DigitalToggle<P> {
    name: &'static str,
    lines: ToggleLines<P>,
    asserted: bool,
}

impl<P: OutputPin> DigitalToggle<P> {
    /// Take ownership of the lines and force the retracted state.
    pub fn new(
        name: &'static str,
        lines: ToggleLines<P>,
    ) -> Self {
        let mut toggle = Self {
            name,
            lines,
            asserted: false,
        };
        toggle.set_state(false);
        toggle
    }

    /// Flip the state and drive the lines. Returns the resulting state.
    pub fn toggle(&mut self) -> bool {
        self.set_state(!self.asserted);
        self.asserted
    }

    /// Force a known state. Returns whether every line write succeeded.
    ///
    /// The state only changes when the lines were driven. If the released
    /// line of a double solenoid cannot be driven low, the other line is
    /// left untouched so the two are never high together.
    pub fn set_state(
        &mut self,
        asserted: bool,
    ) -> bool {
        let name = self.name;
        let driven = match &mut self.lines {
            ToggleLines::Single(line) => write_line(name, line, asserted),
            ToggleLines::Double { extend, retract } => {
                let (on, off) = if asserted {
                    (extend, retract)
                } else {
                    (retract, extend)
                };
                write_line(name, off, false) && write_line(name, on, true)
            }
        };
        if driven {
            self.asserted = asserted;
            tracing::debug!(actuator = name, asserted, "pneumatic state");
        } else {
            tracing::warn!(
                actuator = name,
                kept = self.asserted,
                "pneumatic state change abandoned"
            );
        }
        driven
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Name used in log output.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Drive one line, logging a failure. Returns whether the write succeeded.
fn write_line<P: OutputPin>(
    name: &'static str,
    line: &mut P,
    high: bool,
) -> bool {
    let result = if high { line.set_high() } else { line.set_low() };
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(actuator = name, "digital output write failed: {:?}", e);
            false
        }
    }
}

/// Pneumatic actuators addressable from autonomous steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorTarget {
    /// Scissor lift.
    Lift,
    Descorer,
}

/// Every pneumatic actuator on the robot.
pub struct Pneumatics<P> {
    pub lift: DigitalToggle<P>,
    pub descorer: DigitalToggle<P>,
}

impl<P: OutputPin> Pneumatics<P> {
    /// Create the lift and descorer toggles, both retracted.
    pub fn new(
        lift: ToggleLines<P>,
        descorer: ToggleLines<P>,
    ) -> Self {
        Self {
            lift: DigitalToggle::new("lift", lift),
            descorer: DigitalToggle::new("descorer", descorer),
        }
    }

    /// Toggle addressed by an autonomous step.
    pub fn get_mut(
        &mut self,
        target: ActuatorTarget,
    ) -> &mut DigitalToggle<P> {
        match target {
            ActuatorTarget::Lift => &mut self.lift,
            ActuatorTarget::Descorer => &mut self.descorer,
        }
    }

    /// Return every actuator to its retracted state.
    pub fn retract_all(&mut self) {
        self.lift.set_state(false);
        self.descorer.set_state(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sim::{PinProbe, SimPin};

    fn double() -> (DigitalToggle<SimPin>, PinProbe, PinProbe) {
        let extend = SimPin::new('A');
        let retract = SimPin::new('B');
        let (e, r) = (extend.probe(), retract.probe());
        let toggle = DigitalToggle::new("lift", ToggleLines::Double { extend, retract });
        (toggle, e, r)
    }

    #[test]
    fn test_double_starts_retracted() {
        let (toggle, extend, retract) = double();
        assert!(!toggle.is_asserted());
        assert!(!extend.is_high());
        assert!(retract.is_high());
    }

    #[test]
    fn test_exactly_one_line_after_any_toggles() {
        let (mut toggle, extend, retract) = double();
        for i in 0..9 {
            let state = toggle.toggle();
            assert_eq!(state, i % 2 == 0);
            assert!(extend.is_high() ^ retract.is_high());
            assert_eq!(extend.is_high(), state);
        }
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let (mut toggle, extend, retract) = double();
        toggle.set_state(true);
        let before = (extend.is_high(), retract.is_high());
        toggle.toggle();
        toggle.toggle();
        assert_eq!((extend.is_high(), retract.is_high()), before);
        assert!(toggle.is_asserted());
    }

    #[test]
    fn test_single_line_mirrors_state() {
        let pin = SimPin::new('D');
        let probe = pin.probe();
        let mut toggle = DigitalToggle::new("descorer", ToggleLines::Single(pin));
        assert!(!probe.is_high());
        assert!(toggle.toggle());
        assert!(probe.is_high());
        assert!(!toggle.toggle());
        assert!(!probe.is_high());
    }

    #[test]
    fn test_pneumatics_target_lookup() {
        let mut pneumatics = Pneumatics::new(
            ToggleLines::Double {
                extend: SimPin::new('A'),
                retract: SimPin::new('B'),
            },
            ToggleLines::Single(SimPin::new('D')),
        );
        pneumatics.get_mut(ActuatorTarget::Descorer).set_state(true);
        assert!(pneumatics.descorer.is_asserted());
        assert!(!pneumatics.lift.is_asserted());
        pneumatics.retract_all();
        assert!(!pneumatics.descorer.is_asserted());
    }
}
