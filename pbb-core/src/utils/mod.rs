//! Utility re-exports for the Push Back robot control core.
//!
//! - `config`: the immutable robot configuration shared by every component
//! - `controllers`: actuators, pneumatics, input sampling, teleop and the
//!   competition-mode dispatcher
//! - `autonomous`: timed step sequences and their executor
//! - `vision`: proportional vision alignment
//! - `math`: deadband, clamping and scaling helpers
//! - `time`: clock abstraction over `embassy_time`
//! - `sim`: simulated devices for host runs and tests

pub mod autonomous;
pub mod config;
pub mod controllers;
pub mod math;
pub mod sim;
pub mod time;
pub mod vision;

pub use autonomous::{AutonomousSequence, AutonomousSequencer, AutonomousStep};
pub use config::RobotConfig;
pub use controllers::{CompetitionMode, Robot};
pub use embassy_time::{Duration, Instant};
pub use time::{Clock, ManualClock, SystemClock};
pub use vision::VisionAligner;
