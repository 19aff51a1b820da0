//! MQTT telemetry subscriber.
//!
//! One supervisor task owns the broker connection and the database
//! handle. [`TelemetrySubscriber::start`] is guarded by an atomic flag so
//! a second call cannot spawn a competing consumer; the handle it returns
//! is the explicit way to await or abort the supervisor.
//!
//! Failure handling:
//! - a connection error tears down the client, waits the configured
//!   delay, and rebuilds from scratch
//! - a bad message (malformed topic, non-object payload, unknown
//!   product) is logged as a discard and the loop moves on

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use rusqlite::Connection;
use tokio::task::JoinHandle;
use traceport_core::errors::{Result, TraceportError};
use traceport_core::model::OperationalSnapshot;
use traceport_core_types::RequestId;
use traceport_engine::commands::delta_merge::{apply_operational_delta, DeltaContext, DeltaOutcome};

use crate::config::BrokerConfig;
use crate::topic::product_id_from_topic;

/// Long-running MQTT consumer feeding the delta pipeline
pub struct TelemetrySubscriber {
    config: BrokerConfig,
    started: AtomicBool,
}

impl TelemetrySubscriber {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            started: AtomicBool::new(false),
        }
    }

    /// Spawn the supervisor task.
    ///
    /// The task opens its own connection to the database at `db_path` and
    /// never returns on its own; abort the handle to stop it.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscriber was already started.
    pub fn start(&self, db_path: PathBuf) -> Result<JoinHandle<()>> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TraceportError::Internal {
                message: "telemetry subscriber already started".to_string(),
            });
        }

        let config = self.config.clone();
        Ok(tokio::spawn(async move {
            supervise(config, db_path).await;
        }))
    }
}

/// Connection supervisor: build, consume, and on failure rebuild after
/// the configured delay.
async fn supervise(config: BrokerConfig, db_path: PathBuf) {
    loop {
        match run_session(&config, &db_path).await {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "supervise",
                    event = traceport_core_types::schema::EVENT_RECONNECT,
                    error = %e,
                    delay_secs = config.reconnect_delay.as_secs(),
                );
            }
        }
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// One broker session: connect, subscribe on ConnAck, consume until the
/// connection fails.
async fn run_session(config: &BrokerConfig, db_path: &Path) -> Result<()> {
    let conn = traceport_store::db::open(db_path)?;
    traceport_store::db::configure(&conn)?;

    let client_id = format!("{}-{}", config.client_id_prefix, uuid::Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(config.keep_alive);

    let (client, mut event_loop) = AsyncClient::new(options, 16);
    let filter = config.subscription_topic();

    loop {
        let event = event_loop
            .poll()
            .await
            .map_err(|e| TraceportError::Transport {
                message: e.to_string(),
            })?;

        match event {
            Event::Incoming(Packet::ConnAck(_)) => {
                // (Re)subscribe on every ConnAck so a broker-side session
                // reset cannot leave us connected but deaf
                client
                    .subscribe(&filter, QoS::AtLeastOnce)
                    .await
                    .map_err(|e| TraceportError::Transport {
                        message: e.to_string(),
                    })?;
                tracing::info!(
                    component = module_path!(),
                    op = "run_session",
                    event = traceport_core_types::schema::EVENT_START,
                    topic = %filter,
                );
            }
            Event::Incoming(Packet::Publish(publish)) => {
                // Per-message isolation: a bad message is logged and
                // dropped, the session keeps consuming
                if let Err(e) = handle_message(&conn, &publish.topic, &publish.payload) {
                    tracing::warn!(
                        component = module_path!(),
                        op = "handle_message",
                        event = traceport_core_types::schema::EVENT_DISCARD,
                        topic = %publish.topic,
                        payload_bytes = publish.payload.len(),
                        error = %e,
                    );
                }
            }
            _ => {}
        }
    }
}

/// Decode and apply a single telemetry message.
///
/// Pure with respect to the broker: callers feed raw topic and payload
/// bytes, which keeps this testable without a live connection.
///
/// # Errors
///
/// InvalidTopic for malformed topics, InvalidPayload when the payload is
/// not a JSON object, plus anything the delta pipeline surfaces.
pub fn handle_message(conn: &Connection, topic: &str, payload: &[u8]) -> Result<DeltaOutcome> {
    let product_id = product_id_from_topic(topic)?;

    let delta: OperationalSnapshot =
        serde_json::from_slice(payload).map_err(|e| TraceportError::InvalidPayload {
            reason: format!("telemetry payload must be a JSON object: {}", e),
        })?;

    let request_id = RequestId::new();
    let outcome = apply_operational_delta(
        conn,
        product_id,
        &delta,
        &DeltaContext::broker(request_id.as_str()),
    )?;

    tracing::debug!(
        component = module_path!(),
        op = "handle_message",
        event = traceport_core_types::schema::EVENT_END,
        topic = %topic,
        product_id = %product_id,
        request_id = %request_id,
        changed = outcome.changed,
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use traceport_core::{Identification, Product};
    use traceport_store::migrations::apply_migrations;
    use traceport_store::repo::{AuditRepo, ProductRepo};

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn seed(conn: &Connection, id: &str) {
        let product = Product::new(id.to_string(), Identification::new("Acme", "Conveyor X1"));
        ProductRepo::upsert(conn, &product).unwrap();
    }

    #[test]
    fn test_valid_message_applies_delta() {
        let conn = setup();
        seed(&conn, "prod-1");

        let outcome = handle_message(
            &conn,
            "dpp/operational_data/prod-1",
            br#"{"motorStatus": "running", "rpm": 1450}"#,
        )
        .unwrap();

        assert!(outcome.changed);
        assert_eq!(AuditRepo::count_for_product(&conn, "prod-1").unwrap(), 1);
    }

    #[test]
    fn test_short_topic_is_rejected() {
        let conn = setup();
        let err = handle_message(&conn, "dpp/operational_data", b"{}").unwrap_err();
        assert!(matches!(err, TraceportError::InvalidTopic { .. }));
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let conn = setup();
        seed(&conn, "prod-1");

        for payload in [&b"[1, 2, 3]"[..], b"\"text\"", b"42", b"not json"] {
            let err = handle_message(&conn, "dpp/operational_data/prod-1", payload).unwrap_err();
            assert!(matches!(err, TraceportError::InvalidPayload { .. }));
        }
    }

    #[test]
    fn test_unknown_product_is_reported() {
        let conn = setup();
        let err = handle_message(&conn, "dpp/operational_data/ghost", b"{}").unwrap_err();
        assert!(matches!(err, TraceportError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_start_is_single_shot() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("traceport.db");
        {
            let mut conn = traceport_store::db::open(&db_path).unwrap();
            apply_migrations(&mut conn).unwrap();
        }

        let subscriber = TelemetrySubscriber::new(BrokerConfig::default());

        let handle = subscriber.start(db_path.clone()).unwrap();
        let second = subscriber.start(db_path);
        assert!(matches!(second, Err(TraceportError::Internal { .. })));

        handle.abort();
    }
}
