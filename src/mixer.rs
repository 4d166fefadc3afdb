//! Quad-X attitude to motor mixing.
//!
//! Roll and pitch are normalized so ±30° is full authority, scaled by their
//! gains into a percentage-point differential and added to the base throttle
//! with each motor's sign factors:
//!
//! | motor       | pitch | roll |
//! |-------------|-------|------|
//! | front left  | +     | -    |
//! | front right | +     | +    |
//! | back left   | -     | -    |
//! | back right  | -     | +    |
//!
//! Positive pitch (nose down) raises the front pair. Do not flip a sign
//! without checking the response on the airframe.

use crate::config::MixerConfig;
use crate::error::Result;
use crate::Setpoint;
use core::fmt;
use core::ops::Index;
use nalgebra::Vector3;

/// Attitude (degrees) producing full control authority
pub const FULL_AUTHORITY_DEGREES: f64 = 30.;

/// Throttle percentage points per unit of authority at unit gain
pub const AUTHORITY_SCALE: f64 = 20.;

/// Motor slots of a quad-X frame, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotorPosition {
    FrontLeft = 0,
    FrontRight = 1,
    BackLeft = 2,
    BackRight = 3,
}

impl MotorPosition {
    pub const ALL: [MotorPosition; 4] = [
        MotorPosition::FrontLeft,
        MotorPosition::FrontRight,
        MotorPosition::BackLeft,
        MotorPosition::BackRight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MotorPosition::FrontLeft => "FL",
            MotorPosition::FrontRight => "FR",
            MotorPosition::BackLeft => "BL",
            MotorPosition::BackRight => "BR",
        }
    }
}

/// Throttle for each motor in percent [0, 100].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MotorCommand(pub [u8; 4]);

impl MotorCommand {
    pub fn uniform(throttle: u8) -> Self {
        Self([throttle; 4])
    }

    pub fn front_left(&self) -> u8 {
        self[MotorPosition::FrontLeft]
    }

    pub fn front_right(&self) -> u8 {
        self[MotorPosition::FrontRight]
    }

    pub fn back_left(&self) -> u8 {
        self[MotorPosition::BackLeft]
    }

    pub fn back_right(&self) -> u8 {
        self[MotorPosition::BackRight]
    }

    /// Iterate over `(position, throttle)` in output order.
    pub fn iter(&self) -> impl Iterator<Item = (MotorPosition, u8)> + '_ {
        MotorPosition::ALL.into_iter().map(move |pos| (pos, self[pos]))
    }
}

impl Index<MotorPosition> for MotorCommand {
    type Output = u8;

    fn index(&self, pos: MotorPosition) -> &u8 {
        &self.0[pos as usize]
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (pos, throttle)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}%", pos.label(), throttle)?;
        }
        Ok(())
    }
}

/// A motor in the mixing table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motor {
    pub position: MotorPosition,

    /// Roll, pitch and yaw factors
    pub factor: Vector3<f64>,
}

impl Motor {
    pub fn new(position: MotorPosition, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            position,
            factor: Vector3::new(roll, pitch, yaw),
        }
    }

    /// Throttle for this motor before clamping.
    pub fn thrust(&self, base: f64, mix: &Vector3<f64>) -> f64 {
        // Pitch before roll, the order matters at integer boundaries
        base + self.factor.y * mix.y + self.factor.x * mix.x + self.factor.z * mix.z
    }
}

/// Mixing table of a quad-X frame.
///
/// Yaw factors are zero until yaw torque mixing is added.
pub fn quad_x_motors() -> [Motor; 4] {
    [
        Motor::new(MotorPosition::FrontLeft, -1., 1., 0.),
        Motor::new(MotorPosition::FrontRight, 1., 1., 0.),
        Motor::new(MotorPosition::BackLeft, -1., -1., 0.),
        Motor::new(MotorPosition::BackRight, 1., -1., 0.),
    ]
}

/// Normalize an attitude in degrees to an authority in [-1, 1].
pub fn authority(degrees: f64) -> f64 {
    (degrees / FULL_AUTHORITY_DEGREES).clamp(-1., 1.)
}

fn to_percent(thrust: f64) -> u8 {
    // `as` truncates toward zero
    thrust.clamp(0., 100.) as u8
}

/// Quad-X mixer over a fixed configuration.
#[derive(Clone, Debug)]
pub struct Mixer {
    config: MixerConfig,
    motors: [Motor; 4],
}

impl Mixer {
    pub fn new(config: MixerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            motors: quad_x_motors(),
        })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn motors(&self) -> &[Motor; 4] {
        &self.motors
    }

    /// Motor throttles for a setpoint.
    ///
    /// ```
    /// use flight_link::{Mixer, MixerConfig, Setpoint};
    ///
    /// let mixer = Mixer::new(MixerConfig::default()).unwrap();
    ///
    /// // Full nose-down correction raises the front pair by 16 points
    /// let command = mixer.mix(&Setpoint::new(0., 30., 0.));
    /// assert_eq!(command.0, [71, 71, 39, 39]);
    /// ```
    pub fn mix(&self, setpoint: &Setpoint) -> MotorCommand {
        let gain = Vector3::new(
            self.config.roll_gain,
            self.config.pitch_gain,
            self.config.yaw_gain,
        );
        let input = Vector3::new(
            authority(setpoint.roll),
            authority(setpoint.pitch),
            authority(setpoint.yaw),
        );
        let mix = input.component_mul(&gain) * AUTHORITY_SCALE;
        let base = f64::from(self.config.base_throttle);

        let mut command = MotorCommand::default();
        for motor in &self.motors {
            command.0[motor.position as usize] = to_percent(motor.thrust(base, &mix));
        }
        command
    }
}

/// Mix one attitude with `config`.
pub fn mix(roll: f64, pitch: f64, yaw: f64, config: &MixerConfig) -> MotorCommand {
    let mixer = Mixer {
        config: config.clone(),
        motors: quad_x_motors(),
    };
    mixer.mix(&Setpoint::new(roll, pitch, yaw))
}
