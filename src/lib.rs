//! # flight-link
//! Ground station control link for a quad-X flight computer.
//!
//! [`link`] keeps a websocket connection to the ground station alive and
//! feeds every attitude [`Setpoint`] it receives through the [`Mixer`] into a
//! [`MotorSink`](output::MotorSink).
//!
//! [`mixer`] contains the open loop quad-X mixing law.
//!
//! [`hal`] contains the ESC abstraction used to drive real motors.
//!
//! [`station`] serves synthetic setpoints for bench testing.
//!
//! Mix a single setpoint:
//! ```
//! use flight_link::{Mixer, MixerConfig, Setpoint};
//!
//! let mixer = Mixer::new(MixerConfig::default()).unwrap();
//! let setpoint = Setpoint::decode(r#"{"r": 0, "p": 0, "y": 0}"#).unwrap();
//!
//! // Level attitude holds every motor at the base throttle
//! assert_eq!(mixer.mix(&setpoint).0, [55; 4]);
//! ```

pub mod config;
pub use config::{Config, LinkConfig, MixerConfig};

pub mod error;
pub use error::{Error, FrameError, Result};

pub mod hal;
pub use hal::{Actuator, ESC};

pub mod link;
pub use link::{ConnectionState, Link};

pub mod mixer;
pub use mixer::{mix, Mixer, MotorCommand, MotorPosition};

pub mod output;

mod setpoint;
pub use setpoint::Setpoint;

pub mod station;
