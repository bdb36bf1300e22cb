//! Light control - pulse an output pin on each received message
//!
//! Event-driven: the subscription's event loop delivers publishes, and
//! each one drives the pin high for the configured hold time, then low.
//! The pulse runs inline in the event loop task, so messages arriving
//! during a hold queue up and each produces its own full pulse afterwards.
//! Sessions are clean, so the subscription is re-issued on every CONNACK
//! to survive broker reconnects.

use crate::io::gpio::OutputLine;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Drives the light pin: high, hold, low
pub struct LightController<P: OutputLine> {
    pin: P,
    hold: Duration,
    client: AsyncClient,
    topic: String,
}

impl<P: OutputLine> LightController<P> {
    /// Create a controller for a pin already configured as output and low
    pub fn new(pin: P, hold: Duration, client: AsyncClient, topic: String) -> Self {
        Self { pin, hold, client, topic }
    }

    /// One full pulse: high, hold for the configured time, low
    pub async fn pulse(&mut self) {
        self.pin.set_level(true);
        tokio::time::sleep(self.hold).await;
        self.pin.set_level(false);
    }

    /// React to one incoming packet
    ///
    /// Any publish payload triggers the same pulse; the content is only
    /// logged. A CONNACK means a fresh session, so the subscription is
    /// re-issued.
    async fn handle_incoming(&mut self, packet: Packet) {
        match packet {
            Packet::Publish(publish) => {
                info!(
                    topic = %publish.topic,
                    payload = %String::from_utf8_lossy(&publish.payload),
                    "message_received"
                );
                self.pulse().await;
            }
            Packet::ConnAck(_) => {
                info!("mqtt_connected");
                if let Err(e) = self.client.subscribe(&self.topic, QoS::AtMostOnce).await {
                    error!(error = %e, "resubscribe_failed");
                }
            }
            _ => {}
        }
    }

    /// Run the subscription loop until shutdown
    pub async fn run(mut self, mut eventloop: EventLoop, mut shutdown: watch::Receiver<bool>) {
        info!(hold_secs = %self.hold.as_secs(), "light_controller_started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("light_shutdown");
                        return;
                    }
                }
                result = eventloop.poll() => match result {
                    Ok(Event::Incoming(packet)) => self.handle_incoming(packet).await,
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "mqtt_error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, MqttOptions, Publish};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Records every level change with the (paused) time it happened
    #[derive(Clone, Default)]
    struct RecordingPin {
        events: Arc<Mutex<Vec<(bool, Instant)>>>,
    }

    impl RecordingPin {
        fn events(&self) -> Vec<(bool, Instant)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl OutputLine for RecordingPin {
        fn set_level(&mut self, high: bool) {
            self.events.lock().unwrap().push((high, Instant::now()));
        }
    }

    fn test_client(cap: usize) -> (AsyncClient, EventLoop) {
        AsyncClient::new(MqttOptions::new("test", "localhost", 1883), cap)
    }

    fn test_controller(pin: RecordingPin, hold: Duration) -> (LightController<RecordingPin>, EventLoop) {
        let (client, eventloop) = test_client(10);
        (LightController::new(pin, hold, client, "home/light".to_string()), eventloop)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_high_for_exact_hold_then_low() {
        let pin = RecordingPin::default();
        let (mut controller, _eventloop) = test_controller(pin.clone(), Duration::from_secs(5));

        controller.pulse().await;

        let events = pin.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].0, "first transition must be low->high");
        assert!(!events[1].0, "second transition must be high->low");
        assert_eq!(events[1].1 - events[0].1, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_pulses_are_independent() {
        let pin = RecordingPin::default();
        let (mut controller, _eventloop) = test_controller(pin.clone(), Duration::from_secs(2));

        controller.pulse().await;
        controller.pulse().await;
        controller.pulse().await;

        let events = pin.events();
        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            assert!(pair[0].0);
            assert!(!pair[1].0);
            assert_eq!(pair[1].1 - pair[0].1, Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_publish_payload_triggers_a_pulse() {
        let pin = RecordingPin::default();
        let (mut controller, _eventloop) = test_controller(pin.clone(), Duration::from_secs(1));

        let publish = Publish::new("home/light", QoS::AtMostOnce, "whatever");
        controller.handle_incoming(Packet::Publish(publish)).await;

        let events = pin.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].1 - events[0].1, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connack_resubscribes_without_pulsing() {
        let pin = RecordingPin::default();
        // Request queue of one slot: the re-subscribe must be the request
        // that fills it.
        let (client, _eventloop) = test_client(1);
        let mut controller = LightController::new(
            pin.clone(),
            Duration::from_secs(1),
            client.clone(),
            "home/light".to_string(),
        );

        let connack = ConnAck { session_present: false, code: ConnectReturnCode::Success };
        controller.handle_incoming(Packet::ConnAck(connack)).await;

        assert!(pin.events().is_empty(), "CONNACK must not drive the pin");
        assert!(
            client.try_subscribe("home/light", QoS::AtMostOnce).is_err(),
            "re-subscribe should already occupy the request queue"
        );
    }
}
