//! Motion detection - poll an input pin and report rising edges
//!
//! The monitor samples the pin every 100ms. A publish fires only on the
//! idle -> detected transition; while the level stays high nothing
//! repeats, and a single low sample re-arms the detector immediately
//! (no debounce).

use crate::io::gpio::InputLine;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{info, warn};

/// Fixed sampling cadence
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A detected rising edge, handed to the publisher task
#[derive(Debug)]
pub struct MotionEvent;

/// Level-triggered rising-edge detector
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last_motion: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; returns true only on a low -> high transition
    pub fn sample(&mut self, level: bool) -> bool {
        if level {
            if !self.last_motion {
                self.last_motion = true;
                return true;
            }
        } else {
            self.last_motion = false;
        }
        false
    }
}

/// Polls the input pin and sends a [`MotionEvent`] per rising edge
pub struct MotionMonitor<P: InputLine> {
    pin: P,
    detector: EdgeDetector,
    event_tx: mpsc::Sender<MotionEvent>,
}

impl<P: InputLine> MotionMonitor<P> {
    pub fn new(pin: P, event_tx: mpsc::Sender<MotionEvent>) -> Self {
        Self { pin, detector: EdgeDetector::new(), event_tx }
    }

    /// Run the polling loop until shutdown
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(poll_interval_ms = %POLL_INTERVAL.as_millis(), "motion_monitor_started");

        let mut poll_timer = interval(POLL_INTERVAL);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("motion_shutdown");
                        return;
                    }
                }
                _ = poll_timer.tick() => {}
            }

            let level = self.pin.level();
            if self.detector.sample(level) {
                info!("detected motion");
                if let Err(e) = self.event_tx.try_send(MotionEvent) {
                    warn!(error = %e, "motion event dropped");
                }
            }
        }
    }
}
