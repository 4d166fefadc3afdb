//! Reconnecting ground station link.
//!
//! [`Link`] owns the connection to the ground station and runs two nested
//! loops until shutdown: connect (retrying after a fixed backoff), then
//! receive, decode, mix and forward one frame at a time. Bad frames are
//! dropped, a lost connection is re-established, and nothing but the
//! shutdown future ends the run.
//!
//! ```no_run
//! use flight_link::link::{Link, WsConnector};
//! use flight_link::output::ConsoleSink;
//! use flight_link::{Mixer, MixerConfig};
//!
//! # async fn run() -> flight_link::Result<()> {
//! let mixer = Mixer::new(MixerConfig::default())?;
//! let connector = WsConnector::new("ws://192.168.1.50:8082");
//! let mut link = Link::new(connector, mixer, ConsoleSink::stdout());
//!
//! link.run(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await;
//! # Ok(())
//! # }
//! ```

mod transport;
pub use transport::{Connector, Transport, WsConnector};

use crate::config::DEFAULT_BACKOFF_MS;
use crate::error::{Error, FrameError};
use crate::mixer::Mixer;
use crate::output::MotorSink;
use crate::Setpoint;
use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Why the receive loop ended.
enum Exit {
    Shutdown,
    Lost(Error),
}

pub struct Link<C, S> {
    connector: C,
    mixer: Mixer,
    sink: S,
    backoff: Duration,
    state: watch::Sender<ConnectionState>,
}

impl<C, S> Link<C, S>
where
    C: Connector,
    S: MotorSink,
{
    pub fn new(connector: C, mixer: Mixer, sink: S) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            mixer,
            sink,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            state,
        }
    }

    /// Builder method to set the reconnect backoff and return `self`
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run until `shutdown` completes.
    ///
    /// Connection failures are logged and retried after the backoff forever.
    /// On shutdown any open connection is closed before returning.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(endpoint = self.connector.endpoint(), "Connecting to ground station");

        loop {
            let connected = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.connector.connect() => result,
            };

            let reason = match connected {
                Ok(transport) => {
                    self.set_state(ConnectionState::Connected);
                    info!(endpoint = self.connector.endpoint(), "Connected to ground station");

                    let exit = self.receive(transport, shutdown.as_mut()).await;
                    self.set_state(ConnectionState::Disconnected);

                    match exit {
                        Exit::Shutdown => break,
                        Exit::Lost(reason) => reason,
                    }
                }
                Err(reason) => reason,
            };

            warn!(
                error = %reason,
                backoff = ?self.backoff,
                "Connection lost/failed, retrying"
            );

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.backoff) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Link stopped");
    }

    async fn receive<T, F>(&mut self, mut transport: T, mut shutdown: Pin<&mut F>) -> Exit
    where
        T: Transport,
        F: Future<Output = ()>,
    {
        let exit = loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.as_mut() => break Exit::Shutdown,
                next = transport.next() => next,
            };

            match next {
                Some(Ok(message)) => self.handle(message),
                Some(Err(e)) => break Exit::Lost(e.into()),
                None => break Exit::Lost(Error::ConnectionClosed),
            }
        };

        transport.close().await;
        exit
    }

    fn handle(&mut self, message: Message) {
        let setpoint = match message {
            Message::Text(text) => Setpoint::decode(&text),
            Message::Binary(bytes) => Setpoint::decode_bytes(&bytes),
            Message::Close(frame) => {
                debug!(?frame, "Ground station is closing the connection");
                return;
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => return,
        };

        match setpoint.and_then(|setpoint| self.forward(&setpoint)) {
            Ok(()) => {}
            Err(e @ FrameError::Decode(_)) => debug!(error = %e, "Dropping frame"),
            Err(e) => error!(error = %e, "Error processing packet"),
        }
    }

    fn forward(&mut self, setpoint: &Setpoint) -> Result<(), FrameError> {
        let command = self.mixer.mix(setpoint);
        self.sink
            .apply(setpoint, &command)
            .map_err(|e| FrameError::Processing(e.to_string()))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}
