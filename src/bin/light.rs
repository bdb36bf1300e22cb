//! Light agent - pulse an output pin on each MQTT message
//!
//! Startup: load config, open GPIO (pin as output, driven low), connect
//! to the broker, subscribe. Any failure along the way is fatal. After
//! that the subscription loop runs until an interrupt signal, which
//! releases the pin and exits with status 1.

use pinbridge::infra::config::{self, Config};
use pinbridge::io::{mqtt, Gpio};
use pinbridge::services::LightController;
use rumqttc::QoS;
use std::time::Duration;
use tokio::sync::watch;
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
        error!(error = %format!("{e:#}"), "light agent failed");
        std::process::exit(1);
    }

    // run() only returns once the interrupt signal fired and the pin
    // was released; the original agent reports this as exit status 1.
    info!("shutting down");
    std::process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load(config::DEFAULT_PATH)?;
    info!(
        duration_secs = %config.duration,
        pin = %config.pin,
        broker = %config.broker,
        "config_loaded"
    );

    config.validate_light()?;

    let gpio = Gpio::open()?;
    info!("gpio_opened");
    let pin = gpio.output(config.pin)?;

    let (client, mut eventloop) = mqtt::connect("light", &config.broker)?;
    mqtt::wait_for_connack(&mut eventloop).await?;
    client.subscribe(&config.topic, QoS::AtMostOnce).await?;
    info!(topic = %config.topic, "subscribed");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    let controller = LightController::new(
        pin,
        Duration::from_secs(config.duration),
        client,
        config.topic.clone(),
    );
    controller.run(eventloop, shutdown_rx).await;

    // Controller dropped here: the pin reverts to its default state.
    Ok(())
}
