//! Math utilities for the Push Back robot.
//!
//! Integer helpers for joystick shaping and voltage limiting.

pub mod control;
