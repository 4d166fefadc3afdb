use embedded_hal::PwmPin;

use super::RCESC;

pub struct Builder<T> {
    arm: T,
    min: T,
    max: Option<T>,
}

impl<T: Default> Default for Builder<T> {
    fn default() -> Self {
        Self {
            arm: T::default(),
            min: T::default(),
            max: None,
        }
    }
}

impl<T> Builder<T> {
    /// Duty written when arming, usually just below `min`.
    pub fn arm(mut self, arm: T) -> Self {
        self.arm = arm;
        self
    }

    /// Duty at 0% throttle.
    pub fn min(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    /// Duty at 100% throttle, the pin's maximum duty if unset.
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    pub fn build<P>(self, pin: P) -> RCESC<P>
    where
        P: PwmPin<Duty = T>,
    {
        RCESC {
            arm: self.arm,
            min: self.min,
            max: self.max.unwrap_or_else(|| pin.get_max_duty()),
            pin,
        }
    }
}
