//! Command-line entry point for the orderstream producer.
//!
//! ```bash
//! BROKER=localhost:9092 \
//! SCHEMA_REGISTRY_URL=http://localhost:8081 \
//! TOPIC_NAME=orders \
//! orderstream
//! ```
//!
//! Produces one order event every 300 ms (see `--interval-ms`) until
//! interrupted with Ctrl+C, then drains outstanding deliveries before
//! exiting.

use clap::Parser;
use orderstream::{
    EventBuilder, KafkaEventSink, ProducerArgs, ProducerMetrics, ProductionLoop, TopicProvisioner,
};
use orderstream_generator::FieldGenerator;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    match run_main().await {
        Ok(metrics) => {
            info!(
                "producer finished: {} events issued, {} delivered, {} failed ({:.2} events/sec)",
                metrics.produced,
                metrics.delivered,
                metrics.failed,
                metrics.events_per_second()
            );
        }
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<ProducerMetrics> {
    let args = ProducerArgs::parse();

    let bounds = args.load_field_bounds()?;
    let generator = match args.seed {
        Some(seed) => FieldGenerator::seeded(&bounds, seed),
        None => FieldGenerator::from_config(&bounds),
    };
    let builder = EventBuilder::new(generator);

    let provisioner = TopicProvisioner::new(&args.broker, args.partitions, args.replication)?;
    let sink = KafkaEventSink::new(
        &args.broker,
        &args.schema_registry_url,
        &args.topic,
        provisioner,
    )?;

    let mut production = ProductionLoop::new(sink, builder)
        .with_interval(Duration::from_millis(args.interval_ms))
        .with_drain_timeout(Duration::from_secs(args.drain_timeout_secs));

    let shutdown = setup_shutdown_handler();
    let metrics = production.run(shutdown).await?;

    Ok(metrics)
}

/// Sets up a shutdown signal handler
fn setup_shutdown_handler() -> tokio::sync::broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        info!("Received interrupt signal (Ctrl+C)");
        let _ = shutdown_tx.send(());
    });

    shutdown_rx
}
