//! Controllers and the competition-mode dispatcher.
//!
//! - `actuators`: drive, intake and flicker motors
//! - `pneumatics`: edge-triggered solenoid toggles
//! - `input`: per-tick joystick sampling
//! - `teleop`: driver-control mapping
//! - `pwm`: PCA9685 H-bridge motor backend
//!
//! [`Robot`] owns every component. Only one control mode drives the
//! actuators at a time; that exclusivity comes from `&mut self`, not a lock.

pub mod actuators;
pub mod input;
pub mod pneumatics;
pub mod pwm;
pub mod teleop;

use embedded_hal::digital::OutputPin;

pub use actuators::{ActuatorBank, BrakeMode, Motor};
pub use input::{Axis, Button, Gamepad, GamepadState, InputSampler};
pub use pneumatics::{ActuatorTarget, DigitalToggle, Pneumatics, ToggleLines};
pub use teleop::TeleopController;

use crate::utils::{
    autonomous::{AutonomousSequence, AutonomousSequencer, SequenceReport},
    config::{ConfigError, MotorSpec, RobotConfig, ToggleWiring},
    time::Clock,
    vision::{VisionAligner, VisionSensor},
};

/// Which loop currently owns the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionMode {
    Disabled,
    Autonomous,
    Driver,
}

pub struct Robot<M, P, G, V, C> {
    config: RobotConfig,
    bank: ActuatorBank<M>,
    pneumatics: Pneumatics<P>,
    input: InputSampler<G>,
    aligner: VisionAligner<V>,
    clock: C,
    teleop: TeleopController,
    mode: CompetitionMode,
}

impl<M, P, G, V, C> Robot<M, P, G, V, C>
where
    M: Motor,
    P: OutputPin,
    G: Gamepad,
    V: VisionSensor,
    C: Clock,
{
    /// Build every component from `config`.
    ///
    /// `open_motor` and `open_line` turn configured ports into device handles;
    /// pneumatics start retracted and the robot starts disabled.
    pub fn new(
        config: RobotConfig,
        open_motor: impl FnMut(&MotorSpec) -> M,
        mut open_line: impl FnMut(char) -> P,
        gamepad: G,
        vision: V,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let bank = ActuatorBank::build(&config.drive, open_motor);
        let lift = lines(config.pneumatics.lift, &mut open_line);
        let descorer = lines(config.pneumatics.descorer, &mut open_line);
        let pneumatics = Pneumatics::new(lift, descorer);
        let input = InputSampler::new(gamepad, &config.input);
        let aligner = VisionAligner::new(vision, config.vision);
        let teleop = TeleopController::new(&config);

        tracing::info!(
            left = config.drive.left.len(),
            right = config.drive.right.len(),
            intake = config.drive.intake.len(),
            "robot initialized"
        );

        Ok(Robot {
            config,
            bank,
            pneumatics,
            input,
            aligner,
            clock,
            teleop,
            mode: CompetitionMode::Disabled,
        })
    }

    /// Switch control mode and re-assert the mode's brake policy.
    pub fn enter_mode(
        &mut self,
        mode: CompetitionMode,
    ) {
        match mode {
            CompetitionMode::Disabled => {
                self.bank.stop();
                self.bank.intake_off();
                self.bank.set_flicker(0);
            }
            CompetitionMode::Autonomous => {
                self.bank.set_brake_mode(BrakeMode::Brake);
            }
            CompetitionMode::Driver => {
                self.teleop.reset(&mut self.bank, &mut self.input);
            }
        }
        tracing::info!(from = ?self.mode, to = ?mode, "competition mode changed");
        self.mode = mode;
    }

    /// Run one autonomous sequence to completion, then stop drive and intake
    /// and retract the pneumatics.
    pub fn autonomous(
        &mut self,
        sequence: AutonomousSequence,
    ) -> SequenceReport {
        if self.mode != CompetitionMode::Autonomous {
            self.enter_mode(CompetitionMode::Autonomous);
        }
        let report = AutonomousSequencer::new(
            &mut self.bank,
            &mut self.pneumatics,
            &mut self.aligner,
            &mut self.clock,
            &self.config,
        )
        .run(sequence);
        self.bank.stop();
        self.bank.intake_off();
        self.pneumatics.retract_all();
        report
    }

    /// One driver-control tick without pacing.
    pub fn driver_tick(&mut self) {
        if self.mode != CompetitionMode::Driver {
            self.enter_mode(CompetitionMode::Driver);
        }
        self.teleop.tick(
            &mut self.input,
            &mut self.bank,
            &mut self.pneumatics,
            &mut self.clock,
        );
    }

    /// Run `ticks` driver-control ticks at the configured tick period.
    ///
    /// A tick that overruns its period (a flicker pulse) starts the next one
    /// immediately.
    pub fn run_driver(
        &mut self,
        ticks: usize,
    ) {
        let period = self.config.input.tick();
        for _ in 0..ticks {
            let deadline = self.clock.now() + period;
            self.driver_tick();
            let remaining = deadline.saturating_duration_since(self.clock.now());
            if remaining.as_ticks() > 0 {
                self.clock.delay(remaining);
            }
        }
    }

    pub fn mode(&self) -> CompetitionMode {
        self.mode
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn bank(&self) -> &ActuatorBank<M> {
        &self.bank
    }

    pub fn pneumatics(&self) -> &Pneumatics<P> {
        &self.pneumatics
    }

    pub fn teleop(&self) -> &TeleopController {
        &self.teleop
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

fn lines<P>(
    wiring: ToggleWiring,
    open_line: &mut impl FnMut(char) -> P,
) -> ToggleLines<P> {
    match wiring {
        ToggleWiring::Single { port } => ToggleLines::Single(open_line(port)),
        ToggleWiring::Double { extend, retract } => ToggleLines::Double {
            extend: open_line(extend),
            retract: open_line(retract),
        },
    }
}
