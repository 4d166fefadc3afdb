//! Sinks consuming mixed motor commands.

use crate::error::Result;
use crate::hal::{Actuator, ESC};
use crate::{MotorCommand, Setpoint};
use std::io::{self, Stdout, Write};

/// Consumer of one motor command per mixed setpoint, in arrival order.
pub trait MotorSink {
    fn apply(&mut self, setpoint: &Setpoint, command: &MotorCommand) -> Result<()>;
}

impl<T> MotorSink for &mut T
where
    T: MotorSink + ?Sized,
{
    fn apply(&mut self, setpoint: &Setpoint, command: &MotorCommand) -> Result<()> {
        (**self).apply(setpoint, command)
    }
}

/// Single line status for the simulated motors.
///
/// ```
/// use flight_link::{output::status_line, MotorCommand, Setpoint};
///
/// let line = status_line(&Setpoint::new(10., -2.5, 0.), &MotorCommand([49, 60, 49, 60]));
/// assert_eq!(line, "R: 10.0 P: -2.5 | FL:49% FR:60% BL:49% BR:60%");
/// ```
pub fn status_line(setpoint: &Setpoint, command: &MotorCommand) -> String {
    format!(
        "R:{:>5.1} P:{:>5.1} | {}",
        setpoint.roll, setpoint.pitch, command
    )
}

/// Simulated motors: rewrites one live status line per command.
pub struct ConsoleSink<W> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MotorSink for ConsoleSink<W> {
    fn apply(&mut self, setpoint: &Setpoint, command: &MotorCommand) -> Result<()> {
        // Carriage return keeps the display on one line
        write!(self.out, "{}\r", status_line(setpoint, command))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Hardware motors: one ESC per quad-X slot, in `MotorPosition` order.
pub struct EscSink<E> {
    escs: [E; 4],
}

impl<E: ESC> EscSink<E> {
    pub fn new(escs: [E; 4]) -> Self {
        Self { escs }
    }

    pub fn arm(&mut self) {
        for esc in &mut self.escs {
            esc.arm();
        }
    }

    pub fn escs(&self) -> &[E; 4] {
        &self.escs
    }
}

impl<E: ESC> MotorSink for EscSink<E> {
    fn apply(&mut self, _setpoint: &Setpoint, command: &MotorCommand) -> Result<()> {
        for (esc, (_, throttle)) in self.escs.iter_mut().zip(command.iter()) {
            esc.output(throttle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ExampleESC {
        armed: bool,
        outputs: Vec<u8>,
    }

    impl Actuator for ExampleESC {
        fn output(&mut self, percent: u8) {
            self.outputs.push(percent);
        }
    }

    impl ESC for ExampleESC {
        fn arm(&mut self) {
            self.armed = true;
        }
    }

    #[test]
    fn console_rewrites_one_line() {
        let mut sink = ConsoleSink::new(Vec::new());
        let level = Setpoint::new(0., 0., 0.);
        let banked = Setpoint::new(-30., 12.34, 0.);
        sink.apply(&level, &MotorCommand::uniform(55)).unwrap();
        sink.apply(&banked, &MotorCommand([80, 55, 30, 5])).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "R:  0.0 P:  0.0 | FL:55% FR:55% BL:55% BR:55%\r\
             R:-30.0 P: 12.3 | FL:80% FR:55% BL:30% BR:5%\r"
        );
        assert!(!text.contains('\n'));
    }

    #[test]
    fn esc_sink_writes_each_channel() {
        let mut sink = EscSink::new([
            ExampleESC::default(),
            ExampleESC::default(),
            ExampleESC::default(),
            ExampleESC::default(),
        ]);
        let setpoint = Setpoint::default();
        sink.arm();
        sink.apply(&setpoint, &MotorCommand([1, 2, 3, 4])).unwrap();
        sink.apply(&setpoint, &MotorCommand([5, 6, 7, 8])).unwrap();

        for (i, esc) in sink.escs().iter().enumerate() {
            let i = i as u8;
            assert!(esc.armed);
            assert_eq!(esc.outputs, vec![i + 1, i + 5]);
        }
    }

    #[test]
    fn esc_sink_accepts_borrowed_escs() {
        let mut escs: [ExampleESC; 4] = Default::default();
        {
            let [a, b, c, d] = &mut escs;
            let mut sink = EscSink::new([a, b, c, d]);
            let command = MotorCommand::uniform(42);
            sink.apply(&Setpoint::default(), &command).unwrap();
        }
        assert!(escs.iter().all(|esc| esc.outputs == [42]));
    }
}
