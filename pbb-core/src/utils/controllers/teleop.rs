//! Driver control mapping.
//!
//! Left stick Y drives the left side and right stick Y the right side.
//!
//! | Input | Action |
//! |-------|--------|
//! | R1 held / R2 held | intake in / out, otherwise off |
//! | L1 / L2 press | flicker pulse up / down |
//! | Y press | lift toggle |
//! | A press | descorer toggle |
//! | X press | hold ("defense") / coast brake toggle |

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;

use crate::utils::{
    config::RobotConfig,
    controllers::{
        actuators::{ActuatorBank, BrakeMode, Motor},
        input::{Axis, Button, Gamepad, InputSampler},
        pneumatics::Pneumatics,
    },
    math::control::axis_to_mv,
    time::{ms, Clock},
};

/// Driver-control state that must not leak between mode entries.
pub struct TeleopController {
    hold: bool,
    input_max: i32,
    max_mv: i32,
    flick_mv: i32,
    flick_pulse: Duration,
}

impl TeleopController {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            hold: false,
            input_max: config.input.input_max,
            max_mv: config.drive.max_mv,
            flick_mv: config.drive.flick_mv,
            flick_pulse: ms(config.drive.flick_ms),
        }
    }

    /// Reset on entry to driver control: coast brakes, hold off, no input history.
    pub fn reset<M: Motor, G: Gamepad>(
        &mut self,
        bank: &mut ActuatorBank<M>,
        input: &mut InputSampler<G>,
    ) {
        self.hold = false;
        input.reset();
        bank.set_brake_mode(BrakeMode::Coast);
    }

    /// One control tick. Blocks only while a flicker pulse runs.
    pub fn tick<M, P, G, C>(
        &mut self,
        input: &mut InputSampler<G>,
        bank: &mut ActuatorBank<M>,
        pneumatics: &mut Pneumatics<P>,
        clock: &mut C,
    ) where
        M: Motor,
        P: OutputPin,
        G: Gamepad,
        C: Clock,
    {
        input.poll();

        let left = axis_to_mv(input.axis(Axis::LeftY), self.input_max, self.max_mv);
        let right = axis_to_mv(input.axis(Axis::RightY), self.input_max, self.max_mv);
        bank.drive_tank(left, right);

        if input.held(Button::R1) {
            bank.intake_in();
        } else if input.held(Button::R2) {
            bank.intake_reverse();
        } else {
            bank.intake_off();
        }

        if input.edge_pressed(Button::L1) {
            bank.pulse_flicker(self.flick_mv, self.flick_pulse, &mut *clock);
        }
        if input.edge_pressed(Button::L2) {
            bank.pulse_flicker(-self.flick_mv, self.flick_pulse, &mut *clock);
        }

        for (button, toggle) in [
            (Button::Y, &mut pneumatics.lift),
            (Button::A, &mut pneumatics.descorer),
        ] {
            if input.edge_pressed(button) {
                let extended = toggle.toggle();
                tracing::info!(actuator = toggle.name(), extended, "driver toggled actuator");
            }
        }

        if input.edge_pressed(Button::X) {
            self.hold = !self.hold;
            let mode = if self.hold {
                BrakeMode::Hold
            } else {
                BrakeMode::Coast
            };
            bank.set_brake_mode(mode);
            tracing::info!(?mode, "defense hold toggled");
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold
    }
}
