//! Simulated devices.
//!
//! Host-side stand-ins for the motor, solenoid, controller and vision
//! hardware. Each device shares a probe with the caller so the last
//! commanded state can be inspected after the core has taken ownership of
//! the device. Writes are traced at `trace` level.

use alloc::{collections::VecDeque, rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    convert::Infallible,
};

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::utils::{
    controllers::{
        actuators::{BrakeMode, Motor},
        input::{Gamepad, GamepadState},
    },
    math::control::Millivolts,
    vision::{VisionObject, VisionSensor},
};

#[derive(Debug, Default, Clone, Copy)]
struct MotorState {
    voltage: Millivolts,
    brake: BrakeMode,
    writes: usize,
}

/// Read side of a [`SimMotor`].
#[derive(Debug, Default, Clone)]
pub struct MotorProbe(Rc<Cell<MotorState>>);

impl MotorProbe {
    pub fn voltage(&self) -> Millivolts {
        self.0.get().voltage
    }

    pub fn brake_mode(&self) -> BrakeMode {
        self.0.get().brake
    }

    /// Number of voltage writes received.
    pub fn writes(&self) -> usize {
        self.0.get().writes
    }
}

/// Motor that records the last command it received.
#[derive(Debug)]
pub struct SimMotor {
    port: u8,
    state: MotorProbe,
}

impl SimMotor {
    pub fn new(port: u8) -> Self {
        Self {
            port,
            state: MotorProbe::default(),
        }
    }

    pub fn probe(&self) -> MotorProbe {
        self.state.clone()
    }
}

impl Motor for SimMotor {
    type Error = Infallible;

    fn set_voltage(
        &mut self,
        mv: Millivolts,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.0.get();
        state.voltage = mv;
        state.writes += 1;
        self.state.0.set(state);
        tracing::trace!(port = self.port, mv, "motor voltage");
        Ok(())
    }

    fn set_brake_mode(
        &mut self,
        mode: BrakeMode,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.0.get();
        state.brake = mode;
        self.state.0.set(state);
        tracing::trace!(port = self.port, ?mode, "motor brake mode");
        Ok(())
    }
}

/// Read side of a [`SimPin`].
#[derive(Debug, Default, Clone)]
pub struct PinProbe(Rc<Cell<bool>>);

impl PinProbe {
    pub fn is_high(&self) -> bool {
        self.0.get()
    }
}

/// Digital output line that records its level.
#[derive(Debug)]
pub struct SimPin {
    port: char,
    level: PinProbe,
}

impl SimPin {
    pub fn new(port: char) -> Self {
        Self {
            port,
            level: PinProbe::default(),
        }
    }

    pub fn probe(&self) -> PinProbe {
        self.level.clone()
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.0.set(false);
        tracing::trace!(port = %self.port, "line low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.0.set(true);
        tracing::trace!(port = %self.port, "line high");
        Ok(())
    }
}

/// Controller that replays a fixed list of frames, one per sample.
///
/// Once the script runs out it reports a neutral controller.
#[derive(Debug, Default)]
pub struct ScriptedGamepad {
    frames: VecDeque<GamepadState>,
}

impl ScriptedGamepad {
    pub fn new(frames: impl IntoIterator<Item = GamepadState>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl Gamepad for ScriptedGamepad {
    fn sample(&mut self) -> GamepadState {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Shared log of what a [`ScriptedVision`] was asked.
#[derive(Debug, Default, Clone)]
pub struct VisionProbe(Rc<RefCell<Vec<u8>>>);

impl VisionProbe {
    /// Number of samples taken so far.
    pub fn samples(&self) -> usize {
        self.0.borrow().len()
    }
}

/// Vision sensor that replays a list of observations.
///
/// After the script is exhausted the final observation repeats forever.
#[derive(Debug, Default)]
pub struct ScriptedVision {
    script: VecDeque<Option<VisionObject>>,
    last: Option<VisionObject>,
    queries: VisionProbe,
}

impl ScriptedVision {
    pub fn new(script: impl IntoIterator<Item = Option<VisionObject>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            queries: VisionProbe::default(),
        }
    }

    /// A sensor that never sees anything.
    pub fn blind() -> Self {
        Self::default()
    }

    /// A target drifting `step` pixels per sample from `start_x` to `end_x`.
    pub fn converging(
        signature: u8,
        start_x: i32,
        end_x: i32,
        step: i32,
        width: i32,
    ) -> Self {
        let step = step.abs().max(1);
        let mut script = Vec::new();
        let mut x = start_x;
        loop {
            script.push(Some(VisionObject {
                signature,
                x_middle: x,
                width,
            }));
            if x == end_x {
                break;
            }
            x = if x < end_x {
                (x + step).min(end_x)
            } else {
                (x - step).max(end_x)
            };
        }
        Self::new(script)
    }

    pub fn probe(&self) -> VisionProbe {
        self.queries.clone()
    }
}

impl VisionSensor for ScriptedVision {
    fn largest(
        &mut self,
        signature: u8,
    ) -> Option<VisionObject> {
        self.queries.0.borrow_mut().push(signature);
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}
