//! Joystick sampling with deadband and button edge detection.
//!
//! The controller is read exactly once per control tick through
//! [`InputSampler::poll`]; every query afterwards answers from that snapshot.
//! Edges compare the snapshot with the previous tick, so a held button
//! reports one press and one release per physical transition as long as the
//! tick period is shorter than a human press.

use crate::utils::{
    config::InputConfig,
    math::control::{deadband, AxisSample},
};

/// Analog stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::LeftX, Axis::LeftY, Axis::RightX, Axis::RightY];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Digital controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    L1,
    L2,
    R1,
    R2,
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    const fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of buttons held during one sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSet(u16);

impl ButtonSet {
    pub const EMPTY: ButtonSet = ButtonSet(0);

    pub const fn with(
        self,
        button: Button,
    ) -> Self {
        ButtonSet(self.0 | button.mask())
    }

    pub const fn contains(
        self,
        button: Button,
    ) -> bool {
        self.0 & button.mask() != 0
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(ButtonSet::EMPTY, ButtonSet::with)
    }
}

/// Raw controller reading: axes indexed by [`Axis`] and the held buttons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GamepadState {
    pub axes: [i32; 4],
    pub buttons: ButtonSet,
}

impl GamepadState {
    /// Neutral sticks with `buttons` held.
    pub fn pressing(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            axes: [0; 4],
            buttons: buttons.into_iter().collect(),
        }
    }

    pub fn with_axis(
        mut self,
        axis: Axis,
        value: i32,
    ) -> Self {
        self.axes[axis.index()] = value;
        self
    }
}

/// Operator controller.
pub trait Gamepad {
    /// Read every axis and button once.
    fn sample(&mut self) -> GamepadState;
}

/// Per-tick input snapshot with deadband and edge tracking.
pub struct InputSampler<G> {
    pad: G,
    deadband: i32,
    input_max: i32,
    axes: [AxisSample; 4],
    held: ButtonSet,
    previous: ButtonSet,
}

impl<G: Gamepad> InputSampler<G> {
    /// Wrap `pad` with the deadband and axis range from `config`.
    pub fn new(
        pad: G,
        config: &InputConfig,
    ) -> Self {
        Self {
            pad,
            deadband: config.deadband,
            input_max: config.input_max,
            axes: [0; 4],
            held: ButtonSet::EMPTY,
            previous: ButtonSet::EMPTY,
        }
    }

    /// Take this tick's snapshot.
    pub fn poll(&mut self) {
        let state = self.pad.sample();
        let range = self.input_max.abs();
        for axis in Axis::ALL {
            let raw = state.axes[axis.index()].clamp(-range, range);
            self.axes[axis.index()] = deadband(raw, self.deadband);
        }
        self.previous = self.held;
        self.held = state.buttons;
    }

    /// Forget all history, as at mode entry.
    ///
    /// A button already held when the next poll happens reports a press.
    pub fn reset(&mut self) {
        self.axes = [0; 4];
        self.held = ButtonSet::EMPTY;
        self.previous = ButtonSet::EMPTY;
    }

    /// Deadbanded value of `axis` in this tick's snapshot.
    pub fn axis(
        &self,
        axis: Axis,
    ) -> AxisSample {
        self.axes[axis.index()]
    }

    pub fn held(
        &self,
        button: Button,
    ) -> bool {
        self.held.contains(button)
    }

    /// True only on the tick the button went down.
    pub fn edge_pressed(
        &self,
        button: Button,
    ) -> bool {
        self.held.contains(button) && !self.previous.contains(button)
    }

    /// True only on the tick the button came up.
    pub fn edge_released(
        &self,
        button: Button,
    ) -> bool {
        !self.held.contains(button) && self.previous.contains(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sim::ScriptedGamepad;
    use alloc::vec;

    fn sampler(frames: alloc::vec::Vec<GamepadState>) -> InputSampler<ScriptedGamepad> {
        InputSampler::new(ScriptedGamepad::new(frames), &InputConfig::default())
    }

    #[test]
    fn test_axis_deadband_applied() {
        let mut input = sampler(vec![GamepadState::default()
            .with_axis(Axis::LeftY, 3)
            .with_axis(Axis::RightY, -4)
            .with_axis(Axis::LeftX, 5)
            .with_axis(Axis::RightX, -100)]);
        input.poll();
        assert_eq!(input.axis(Axis::LeftY), 0);
        assert_eq!(input.axis(Axis::RightY), 0);
        assert_eq!(input.axis(Axis::LeftX), 5);
        assert_eq!(input.axis(Axis::RightX), -100);
    }

    #[test]
    fn test_axis_clamped_to_input_range() {
        let mut input = sampler(vec![GamepadState::default().with_axis(Axis::LeftY, 300)]);
        input.poll();
        assert_eq!(input.axis(Axis::LeftY), 127);
    }

    #[test]
    fn test_single_edge_per_transition() {
        let held = GamepadState::pressing([Button::Y]);
        let mut input = sampler(vec![
            GamepadState::default(),
            held,
            held,
            held,
            GamepadState::default(),
            GamepadState::default(),
        ]);

        let mut presses = 0;
        let mut releases = 0;
        for _ in 0..6 {
            input.poll();
            presses += usize::from(input.edge_pressed(Button::Y));
            releases += usize::from(input.edge_released(Button::Y));
        }
        assert_eq!(presses, 1);
        assert_eq!(releases, 1);
    }

    #[test]
    fn test_reset_clears_history() {
        let held = GamepadState::pressing([Button::A]);
        let mut input = sampler(vec![held, held]);
        input.poll();
        assert!(input.edge_pressed(Button::A));
        input.reset();
        input.poll();
        assert!(input.edge_pressed(Button::A));
        assert!(!input.edge_pressed(Button::B));
    }
}
