//! Synthetic ground station.
//!
//! Serves sine-wave attitude setpoints to every connected client so the link
//! can be exercised without the real ground station.

use crate::Setpoint;
use futures_util::SinkExt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// Default broadcast rate
pub const DEFAULT_RATE_HZ: u32 = 50;

fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

/// Setpoint at `t` seconds.
///
/// Roll swings ±30°, pitch ±20° at half the rate, yaw turns 10°/s.
pub fn waveform(t: f64) -> Setpoint {
    Setpoint::new(
        round2(t.sin() * 30.),
        round2((t * 0.5).sin() * 20.),
        round2((t * 10.) % 360.),
    )
}

/// Seconds since the Unix epoch.
pub fn wall_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Accept clients forever, streaming [`waveform`] to each at `rate_hz`.
pub async fn serve(listener: TcpListener, rate_hz: u32) -> std::io::Result<()> {
    let period = Duration::from_secs_f64(1. / f64::from(rate_hz.max(1)));

    loop {
        let (stream, addr) = listener.accept().await?;
        tokio::spawn(async move {
            info!(%addr, "Client connected");
            if let Err(e) = stream_setpoints(stream, period).await {
                warn!(%addr, error = %e, "Client stream ended with error");
            }
            info!(%addr, "Client disconnected");
        });
    }
}

async fn stream_setpoints(
    stream: TcpStream,
    period: Duration,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        let frame = waveform(wall_clock()).encode();
        ws.send(Message::Text(frame)).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn waveform_at_origin_is_level() {
        assert_eq!(waveform(0.), Setpoint::new(0., 0., 0.));
    }

    #[test]
    fn waveform_peaks() {
        let setpoint = waveform(PI / 2.);
        assert_abs_diff_eq!(setpoint.roll, 30.);
        assert_abs_diff_eq!(setpoint.pitch, 14.14);
        assert_abs_diff_eq!(setpoint.yaw, 15.71);

        assert_abs_diff_eq!(waveform(PI).pitch, 20.);
    }

    #[test]
    fn waveform_stays_within_full_authority() {
        let mut t = 0.;
        while t < 100. {
            let setpoint = waveform(t);
            assert!(setpoint.roll.abs() <= 30.);
            assert!(setpoint.pitch.abs() <= 20.);
            assert!((0. ..360.).contains(&setpoint.yaw));
            t += 0.37;
        }
    }

    #[test]
    fn yaw_wraps() {
        assert_abs_diff_eq!(waveform(37.).yaw, 10.);
    }
}
