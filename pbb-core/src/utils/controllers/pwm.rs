//! PCA9685-backed motors.
//!
//! Each motor is an IN/IN H-bridge driven by two PWM channels of a PCA9685
//! on a shared I2C bus. Forward drives the duty on IN1 with IN2 low, reverse
//! swaps them. A zero command either coasts (both low) or brakes (both at
//! full duty) according to the motor's brake mode. The bridge has no position
//! loop, so `Hold` brakes.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address, Channel, Error as PwmError, Pca9685};

use crate::utils::{
    controllers::actuators::{BrakeMode, Motor},
    math::control::Millivolts,
};

/// Full-scale PCA9685 off-count.
pub const MAX_DUTY: u16 = 4095;

/// Errors that can occur when driving a PCA9685 motor.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    /// The shared driver was already borrowed.
    DriverBusy,
}

/// Open the PWM driver on a shared bus, wake it and set the prescale.
///
/// A prescale of 100 gives roughly 60 Hz.
pub fn init_driver<I2C, E>(
    bus: &RefCell<I2C>,
    address: u8,
    prescale: u8,
) -> Result<Pca9685<RefCellDevice<'_, I2C>>, DeviceError<E>>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    let mut pca = Pca9685::new(RefCellDevice::new(bus), Address::from(address))
        .map_err(DeviceError::PwmError)?;
    pca.enable().map_err(DeviceError::PwmError)?;
    pca.set_prescale(prescale).map_err(DeviceError::PwmError)?;
    tracing::info!(address, prescale, "PWM driver enabled");
    Ok(pca)
}

/// One H-bridge motor on a shared PCA9685.
pub struct PwmMotor<'a, I2C> {
    driver: &'a RefCell<Pca9685<I2C>>,
    in1: Channel,
    in2: Channel,
    /// Voltage that maps to full duty.
    supply_mv: i32,
    brake: BrakeMode,
    output: Millivolts,
}

impl<'a, I2C, E> PwmMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    pub fn new(
        driver: &'a RefCell<Pca9685<I2C>>,
        in1: Channel,
        in2: Channel,
        supply_mv: i32,
    ) -> Self {
        PwmMotor {
            driver,
            in1,
            in2,
            supply_mv: supply_mv.max(1),
            brake: BrakeMode::Coast,
            output: 0,
        }
    }

    /// Duty count for a voltage magnitude.
    pub fn duty_for(
        &self,
        mv: Millivolts,
    ) -> u16 {
        let scaled = i64::from(mv).unsigned_abs() * u64::from(MAX_DUTY)
            / self.supply_mv.unsigned_abs() as u64;
        scaled.min(u64::from(MAX_DUTY)) as u16
    }

    fn write(
        &mut self,
        in1_duty: u16,
        in2_duty: u16,
    ) -> Result<(), DeviceError<E>> {
        let mut pca = self
            .driver
            .try_borrow_mut()
            .map_err(|_| DeviceError::DriverBusy)?;
        pca.set_channel_on_off(self.in1, 0, in1_duty)
            .map_err(DeviceError::PwmError)?;
        pca.set_channel_on_off(self.in2, 0, in2_duty)
            .map_err(DeviceError::PwmError)?;
        Ok(())
    }

    fn apply(&mut self) -> Result<(), DeviceError<E>> {
        let duty = self.duty_for(self.output);
        match self.output {
            0 => match self.brake {
                BrakeMode::Coast => self.write(0, 0),
                BrakeMode::Brake | BrakeMode::Hold => self.write(MAX_DUTY, MAX_DUTY),
            },
            mv if mv > 0 => self.write(duty, 0),
            _ => self.write(0, duty),
        }
    }
}

impl<I2C, E> Motor for PwmMotor<'_, I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    fn set_voltage(
        &mut self,
        mv: Millivolts,
    ) -> Result<(), Self::Error> {
        self.output = mv;
        self.apply()
    }

    fn set_brake_mode(
        &mut self,
        mode: BrakeMode,
    ) -> Result<(), Self::Error> {
        self.brake = mode;
        if self.output == 0 {
            self.apply()
        } else {
            Ok(())
        }
    }
}
