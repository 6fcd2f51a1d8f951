use clap::Parser;
use pbb_core::utils::autonomous::routines;
use pbb_core::utils::controllers::{Axis, Button, GamepadState};
use pbb_core::utils::sim::{ScriptedGamepad, ScriptedVision, SimMotor, SimPin};
use pbb_core::utils::{
    AutonomousSequence, Clock, CompetitionMode, ManualClock, Robot, RobotConfig, SystemClock,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// Robot configuration JSON (defaults to the competition robot)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Autonomous routine: `match`, `off-line` or a path to a routine JSON
    #[clap(long, default_value = "match")]
    routine: String,
    /// Number of driver-control ticks to simulate after autonomous
    #[clap(long, default_value_t = 300)]
    driver_ticks: usize,
    /// pace the simulation with the wall clock instead of a virtual one
    #[clap(long)]
    realtime: bool,
    /// print the default configuration as JSON and exit
    #[clap(long)]
    dump_config: bool,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// A short driver practice: forward, spin, toggle the lift, intake, flick.
fn driver_script(ticks: usize) -> ScriptedGamepad {
    let frames = (0..ticks).map(|t| match t % 100 {
        0..=29 => GamepadState::default()
            .with_axis(Axis::LeftY, 100)
            .with_axis(Axis::RightY, 100),
        30..=44 => GamepadState::default()
            .with_axis(Axis::LeftY, 64)
            .with_axis(Axis::RightY, -64),
        45 | 46 => GamepadState::pressing([Button::Y]),
        50..=69 => GamepadState::pressing([Button::R1]).with_axis(Axis::LeftY, 3),
        75 => GamepadState::pressing([Button::L1]),
        80 => GamepadState::pressing([Button::L2]),
        90 => GamepadState::pressing([Button::X]),
        _ => GamepadState::default(),
    });
    ScriptedGamepad::new(frames.collect::<Vec<_>>())
}

fn run<C: Clock>(
    config: RobotConfig,
    routine: AutonomousSequence,
    driver_ticks: usize,
    clock: C,
) -> Result<(), Box<dyn Error>> {
    let signature = config.vision.signature;
    let center = config.vision.frame_center_x;
    // The goal starts off to the right and slides toward center as the robot turns.
    let vision = ScriptedVision::converging(signature, center + 90, center, 9, 32);

    let mut robot = Robot::new(
        config,
        |spec| SimMotor::new(spec.port),
        SimPin::new,
        driver_script(driver_ticks),
        vision,
        clock,
    )?;

    let start = robot.clock().now();
    let report = robot.autonomous(routine);
    info!(?report, elapsed_ms = robot.clock().since(start).as_millis(), "autonomous done");

    robot.enter_mode(CompetitionMode::Driver);
    robot.run_driver(driver_ticks);
    info!(
        lift = robot.pneumatics().lift.is_asserted(),
        descorer = robot.pneumatics().descorer.is_asserted(),
        hold = robot.teleop().is_holding(),
        "driver control done"
    );

    robot.enter_mode(CompetitionMode::Disabled);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    if opts.dump_config {
        println!("{}", serde_json::to_string_pretty(&RobotConfig::default())?);
        return Ok(());
    }

    let config: RobotConfig = match &opts.config {
        Some(path) => load_json(path)?,
        None => RobotConfig::default(),
    };
    let routine = match opts.routine.as_str() {
        "match" => routines::match_routine(&config),
        "off-line" => routines::drive_off_line(&config),
        path => load_json(Path::new(path))?,
    };
    info!(steps = routine.len(), realtime = opts.realtime, "starting mock brain");

    if opts.realtime {
        run(config, routine, opts.driver_ticks, SystemClock)
    } else {
        run(config, routine, opts.driver_ticks, ManualClock::new())
    }
}
