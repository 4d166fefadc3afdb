use crate::config::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::error::{Error, Result};
use futures_util::{SinkExt, Stream};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// Upper bound on the websocket close handshake
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// An open, receive-only message stream from the ground station.
pub trait Transport:
    Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin + Send
{
    /// Release the connection.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens transports to a fixed endpoint.
pub trait Connector {
    type Transport: Transport;

    fn endpoint(&self) -> &str;

    fn connect(&mut self) -> impl Future<Output = Result<Self::Transport>> + Send;
}

impl<S> Transport for WebSocketStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn close(mut self) -> impl Future<Output = ()> + Send {
        async move {
            match tokio::time::timeout(CLOSE_TIMEOUT, SinkExt::close(&mut self)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "Close handshake failed"),
                Err(_) => debug!("Close handshake timed out"),
            }
        }
    }
}

/// Websocket client connector, e.g. for `ws://192.168.1.50:8082`.
#[derive(Clone, Debug)]
pub struct WsConnector {
    endpoint: String,
    timeout: Duration,
}

impl WsConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Builder method to set the handshake timeout and return `self`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connector for WsConnector {
    type Transport = WebSocketStream<MaybeTlsStream<TcpStream>>;

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn connect(&mut self) -> impl Future<Output = Result<Self::Transport>> + Send {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;

        async move {
            let (stream, _response) = tokio::time::timeout(timeout, connect_async(endpoint))
                .await
                .map_err(|_| Error::Timeout(timeout))??;
            Ok(stream)
        }
    }
}
