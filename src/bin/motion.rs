//! Motion agent - publish on rising edges of an input pin
//!
//! Startup: load config, open GPIO (pin as input), connect to the broker
//! with a randomized client id. Any failure along the way is fatal. The
//! polling loop then samples the pin every 100ms and hands rising edges
//! to the publisher task, until an interrupt signal releases the pin and
//! exits with status 1.

use pinbridge::infra::config::{self, Config};
use pinbridge::io::{mqtt, Gpio, MotionPublisher};
use pinbridge::services::MotionMonitor;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "motion agent failed");
        std::process::exit(1);
    }

    info!("shutting down");
    std::process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load(config::DEFAULT_PATH)?;
    info!(
        pin = %config.pin,
        broker = %config.broker,
        topic = %config.topic,
        "config_loaded"
    );

    let gpio = Gpio::open()?;
    info!("gpio_opened");
    let pin = gpio.input(config.pin)?;

    let client_id = mqtt::random_client_id("motion");
    let (client, mut eventloop) = mqtt::connect(&client_id, &config.broker)?;
    mqtt::wait_for_connack(&mut eventloop).await?;
    info!(client_id = %client_id, "broker_connected");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    // Keep the event loop polling so the client stays connected; logs
    // reconnects and disconnect errors.
    let logger_shutdown = shutdown_rx.clone();
    tokio::spawn(mqtt::run_connection_logger(eventloop, logger_shutdown));

    let (event_tx, event_rx) = mpsc::channel(100);
    let publisher = MotionPublisher::new(client, event_rx, config.topic.clone());
    let publisher_shutdown = shutdown_rx.clone();
    tokio::spawn(publisher.run(publisher_shutdown));

    let monitor = MotionMonitor::new(pin, event_tx);
    monitor.run(shutdown_rx).await;

    // Monitor dropped here: the pin reverts to its default state.
    Ok(())
}
