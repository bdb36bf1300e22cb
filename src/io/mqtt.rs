//! MQTT broker connection and motion event publishing
//!
//! Both agents connect once at startup and treat a failure before the
//! first CONNACK as fatal. After that, reconnection is whatever rumqttc
//! does on the next event loop poll - no retry policy of our own.

use crate::services::motion::MotionEvent;
use anyhow::{bail, Context};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Payload published on each detected motion event
pub const MOTION_PAYLOAD: &str = "motion";

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const DEFAULT_PORT: u16 = 1883;

/// Split a broker address into host and port
///
/// Accepts an optional `tcp://` or `mqtt://` scheme and an optional port
/// (default 1883), e.g. "tcp://broker.local:1883" or "broker.local".
/// IPv6 hosts must be bracketed ("[::1]:1883") so the port separator is
/// unambiguous.
pub fn parse_broker_addr(addr: &str) -> anyhow::Result<(String, u16)> {
    let addr = addr
        .strip_prefix("tcp://")
        .or_else(|| addr.strip_prefix("mqtt://"))
        .unwrap_or(addr);

    // Bracketed IPv6 literal, e.g. "[::1]:1883" or "[::1]"
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .with_context(|| format!("unclosed '[' in broker address {addr:?}"))?;
        if host.is_empty() {
            bail!("broker address is empty");
        }
        let port = match rest.strip_prefix(':') {
            Some(port) => port
                .parse()
                .with_context(|| format!("invalid broker port in {addr:?}"))?,
            None if rest.is_empty() => DEFAULT_PORT,
            None => bail!("invalid broker address {addr:?}"),
        };
        return Ok((host.to_string(), port));
    }

    let (host, port) = match addr.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => {
            bail!("IPv6 broker addresses must be bracketed, e.g. \"[::1]:1883\"");
        }
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .with_context(|| format!("invalid broker port in {addr:?}"))?;
            (host, port)
        }
        None => (addr, DEFAULT_PORT),
    };

    if host.is_empty() {
        bail!("broker address is empty");
    }

    Ok((host.to_string(), port))
}

/// Generate a random client identifier with a literal prefix
pub fn random_client_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Build the client for the configured broker address
///
/// The connection itself is driven by the event loop; callers block on
/// [`wait_for_connack`] to make the initial connect synchronous.
pub fn connect(client_id: &str, broker: &str) -> anyhow::Result<(AsyncClient, EventLoop)> {
    let (host, port) = parse_broker_addr(broker)?;

    let mut options = MqttOptions::new(client_id, host, port);
    options.set_keep_alive(KEEP_ALIVE);

    Ok(AsyncClient::new(options, 100))
}

/// Poll the event loop until the broker acknowledges the connection
///
/// Any event loop error before the CONNACK is a failed connection attempt.
pub async fn wait_for_connack(eventloop: &mut EventLoop) -> anyhow::Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("mqtt_connected");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => return Err(e).context("failed to connect to MQTT broker"),
        }
    }
}

/// Drive the event loop, logging reconnects and disconnects
///
/// The motion agent parks its event loop here after the initial connect:
/// publishes flow through the client handle, so this task only has to
/// keep polling and report connection state changes.
pub async fn run_connection_logger(mut eventloop: EventLoop, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            result = eventloop.poll() => match result {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("mqtt_connected");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "mqtt_disconnected");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Publisher for motion events
///
/// Receives events from the polling loop over a channel and publishes the
/// fixed payload at QoS 0, not retained.
pub struct MotionPublisher {
    client: AsyncClient,
    rx: mpsc::Receiver<MotionEvent>,
    topic: String,
}

impl MotionPublisher {
    pub fn new(client: AsyncClient, rx: mpsc::Receiver<MotionEvent>, topic: String) -> Self {
        Self { client, rx, topic }
    }

    /// Run the publisher loop until shutdown or the channel closes
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(topic = %self.topic, "motion_publisher_started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        // Drain remaining events
                        while let Ok(event) = self.rx.try_recv() {
                            self.publish(event).await;
                        }
                        info!("motion_publisher_shutdown");
                        return;
                    }
                }
                event = self.rx.recv() => match event {
                    Some(event) => self.publish(event).await,
                    None => {
                        warn!("motion event channel closed");
                        return;
                    }
                }
            }
        }
    }

    async fn publish(&self, _event: MotionEvent) {
        debug!(topic = %self.topic, "publishing motion event");
        if let Err(e) = self
            .client
            .publish(&self.topic, QoS::AtMostOnce, false, MOTION_PAYLOAD.as_bytes())
            .await
        {
            error!(error = %e, "motion_publish_failed");
        }
    }
}
