//! Motor output hardware abstraction.

pub mod esc;
pub use esc::{Builder, ESC, RCESC};

pub trait Actuator {
    /// Output a throttle percentage in [0, 100].
    fn output(&mut self, percent: u8);
}

impl<T> Actuator for &mut T
where
    T: Actuator + ?Sized,
{
    fn output(&mut self, percent: u8) {
        (**self).output(percent)
    }
}
