use flight_link::link::{Link, WsConnector};
use flight_link::output::MotorSink;
use flight_link::{
    mix, station, ConnectionState, LinkConfig, Mixer, MixerConfig, MotorCommand, Setpoint,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const BACKOFF: Duration = Duration::from_millis(50);
const DEADLINE: Duration = Duration::from_secs(10);

struct Recorder {
    commands: Vec<MotorCommand>,
    setpoints: Vec<Setpoint>,
    tick: mpsc::UnboundedSender<()>,
}

impl MotorSink for Recorder {
    fn apply(&mut self, setpoint: &Setpoint, command: &MotorCommand) -> flight_link::Result<()> {
        self.setpoints.push(*setpoint);
        self.commands.push(*command);
        let _ = self.tick.send(());
        Ok(())
    }
}

fn recorder() -> (Recorder, mpsc::UnboundedReceiver<()>) {
    let (tick, rx) = mpsc::unbounded_channel();
    let recorder = Recorder {
        commands: Vec::new(),
        setpoints: Vec::new(),
        tick,
    };
    (recorder, rx)
}

async fn after(n: usize, mut ticks: mpsc::UnboundedReceiver<()>) {
    for _ in 0..n {
        if ticks.recv().await.is_none() {
            return;
        }
    }
}

fn endpoint(port: u16) -> String {
    LinkConfig {
        port,
        ..LinkConfig::default()
    }
    .endpoint("127.0.0.1")
}

fn link(port: u16, sink: Recorder) -> Link<WsConnector, Recorder> {
    let connector = WsConnector::new(endpoint(port)).with_timeout(Duration::from_secs(2));
    let mixer = Mixer::new(MixerConfig::default()).unwrap();
    Link::new(connector, mixer, sink).with_backoff(BACKOFF)
}

/// Accept one client per session, send its frames and close.
async fn serve_sessions(listener: TcpListener, sessions: Vec<Vec<&'static str>>) {
    for frames in sessions {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        ws.close(None).await.ok();
        while let Some(Ok(_)) = ws.next().await {}
    }
}

#[tokio::test]
async fn streams_frames_across_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(serve_sessions(
        listener,
        vec![
            vec![r#"{"r": 10}"#, "garbage", r#"{"p": -20}"#],
            vec![r#"{"r": -5, "p": 5}"#, r#"{"r": "x"}"#, r#"{"y": 90}"#],
        ],
    ));

    let (sink, ticks) = recorder();
    let mut link = link(port, sink);
    tokio::time::timeout(DEADLINE, link.run(after(4, ticks)))
        .await
        .expect("link did not deliver every frame");

    let cfg = MixerConfig::default();
    assert_eq!(
        link.sink().commands,
        vec![
            mix(10., 0., 0., &cfg),
            mix(0., -20., 0., &cfg),
            mix(-5., 5., 0., &cfg),
            mix(0., 0., 90., &cfg),
        ]
    );
    assert_eq!(link.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn retries_until_ground_station_appears() {
    // Reserve a port, then leave it closed for a while
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    tokio::spawn(async move {
        tokio::time::sleep(BACKOFF * 4).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        serve_sessions(listener, vec![vec![r#"{"r": 30, "p": 30}"#]]).await;
    });

    let (sink, ticks) = recorder();
    let mut link = link(port, sink);
    tokio::time::timeout(DEADLINE, link.run(after(1, ticks)))
        .await
        .expect("link never reconnected");

    let expected = mix(30., 30., 0., &MixerConfig::default());
    assert_eq!(link.sink().commands, vec![expected]);
}

#[tokio::test]
async fn mixes_mock_station_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(station::serve(listener, 200));

    let (sink, ticks) = recorder();
    let mut link = link(port, sink);
    let state = link.subscribe();
    tokio::time::timeout(
        DEADLINE,
        link.run(async move {
            after(5, ticks).await;
            assert_eq!(*state.borrow(), ConnectionState::Connected);
        }),
    )
    .await
    .expect("no setpoints from mock station");

    let recorder = link.into_sink();
    assert_eq!(recorder.commands.len(), 5);
    for (setpoint, command) in recorder.setpoints.iter().zip(&recorder.commands) {
        assert!(setpoint.roll.abs() <= 30.);
        let Setpoint { roll, pitch, yaw } = *setpoint;
        assert_eq!(*command, mix(roll, pitch, yaw, &MixerConfig::default()));
        assert!(command.0.iter().all(|&t| t <= 100));
    }
}
