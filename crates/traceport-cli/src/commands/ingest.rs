//! Telemetry ingestion command

use clap::Args;
use traceport_broker::{BrokerConfig, TelemetrySubscriber};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// MQTT broker host (overrides TRACEPORT_MQTT_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// MQTT broker port (overrides TRACEPORT_MQTT_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Topic namespace (overrides TRACEPORT_MQTT_NAMESPACE)
    #[arg(long)]
    pub namespace: Option<String>,

    #[arg(long, default_value = ".traceport/store.db")]
    pub db: String,
}

pub fn execute(args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Ensure the schema exists before the subscriber opens its own handle
    drop(super::open_db(&args.db)?);

    let mut config = BrokerConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }

    println!(
        "Ingesting {} from {}:{} into {}",
        config.subscription_topic(),
        config.host,
        config.port,
        args.db
    );

    let subscriber = TelemetrySubscriber::new(config);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let handle = subscriber.start(args.db.clone().into())?;
        // The supervisor reconnects forever; this only returns on abort
        handle.await?;
        Ok(())
    })
}
