mod builder;
pub use builder::Builder;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::PwmPin;
use num_traits::{NumCast, ToPrimitive};

use super::ESC;
use crate::hal::Actuator;

/// An ESC implementation for PWM driven RC motor controllers.
///
/// Throttle percentages map linearly onto the `min..=max` duty range.
pub struct RCESC<T: PwmPin> {
    arm: T::Duty,
    min: T::Duty,
    max: T::Duty,
    pin: T,
}

impl<T> RCESC<T>
where
    T: PwmPin,
    T::Duty: Copy,
{
    pub fn new(arm: T::Duty, min: T::Duty, max: T::Duty, pin: T) -> Self {
        Self { arm, min, max, pin }
    }

    pub fn builder() -> Builder<T::Duty>
    where
        T::Duty: Default,
    {
        Builder::default()
    }

    /// Teach the ESC its throttle range, then arm it.
    pub fn calibrate<D>(&mut self, delay: &mut D)
    where
        D: DelayMs<u16>,
    {
        self.pin.enable();

        self.pin.set_duty(self.max);
        delay.delay_ms(2000);

        self.pin.set_duty(self.min);
        delay.delay_ms(2000);

        self.pin.set_duty(self.arm);
    }

    pub fn pin(&self) -> &T {
        &self.pin
    }

    pub fn into_pin(self) -> T {
        self.pin
    }
}

impl<T> Actuator for RCESC<T>
where
    T: PwmPin,
    T::Duty: NumCast + ToPrimitive + Copy,
{
    fn output(&mut self, percent: u8) {
        let (Some(min), Some(max)) = (self.min.to_f64(), self.max.to_f64()) else {
            return;
        };

        let percent: f64 = percent.min(100).into();
        let duty = min + (max - min) * percent / 100.;
        let duty = <T::Duty as NumCast>::from(duty.round()).unwrap_or(self.min);
        self.pin.set_duty(duty);
    }
}

impl<T> ESC for RCESC<T>
where
    T: PwmPin,
    T::Duty: NumCast + ToPrimitive + Copy,
{
    fn arm(&mut self) {
        self.pin.enable();
        self.pin.set_duty(self.arm);
    }
}
