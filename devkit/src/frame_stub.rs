/*!
Mock de transport WebSocket pour développement sans serveur

Permet de tester les renderers live sans control plane réel.
Les frames envoyées sont enregistrées et délivrées dans l'ordre à la
`MockFrameSource`, qui implémente `zone_render::FrameSource`.
*/

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use zone_render::{FrameSource, RenderError, RenderSink, TableBody};

#[derive(Debug, Clone, PartialEq)]
pub enum MockFrame {
    Text(String),
    TransportError(String),
    Close,
}

/// Côté "serveur" du mock : pousse des frames vers la source
#[derive(Clone)]
pub struct MockFrameSender {
    sender: mpsc::UnboundedSender<MockFrame>,
    sent_frames: Arc<Mutex<Vec<MockFrame>>>,
}

/// Côté "client" du mock, consommé par `LiveRenderer::run`
pub struct MockFrameSource {
    receiver: mpsc::UnboundedReceiver<MockFrame>,
    closed: bool,
}

/// Crée une paire connectée sender/source
pub fn mock_channel() -> (MockFrameSender, MockFrameSource) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        MockFrameSender {
            sender,
            sent_frames: Arc::new(Mutex::new(Vec::new())),
        },
        MockFrameSource {
            receiver,
            closed: false,
        },
    )
}

impl MockFrameSender {
    fn push(&self, frame: MockFrame) -> Result<()> {
        self.sent_frames.lock().unwrap().push(frame.clone());
        self.sender
            .send(frame)
            .map_err(|e| anyhow::anyhow!("Send error: {}", e))
    }

    /// Simule une frame texte brute
    pub fn send_text<S: Into<String>>(&self, text: S) -> Result<()> {
        let text = text.into();
        log::info!("📨 [MOCK] Frame: {} bytes", text.len());
        self.push(MockFrame::Text(text))
    }

    /// Simule une frame JSON
    pub fn send_json(&self, value: &Value) -> Result<()> {
        self.send_text(serde_json::to_string(value)?)
    }

    /// Simule une erreur de transport (fin de la boucle live)
    pub fn fail<S: Into<String>>(&self, reason: S) -> Result<()> {
        self.push(MockFrame::TransportError(reason.into()))
    }

    /// Simule la fermeture propre de la connexion
    pub fn close(&self) -> Result<()> {
        log::info!("🔌 [MOCK] Close");
        self.push(MockFrame::Close)
    }

    /// Récupère toutes les frames envoyées (pour assertions de tests)
    pub fn sent_frames(&self) -> Vec<MockFrame> {
        self.sent_frames.lock().unwrap().clone()
    }
}

impl FrameSource for MockFrameSource {
    async fn next_frame(&mut self) -> Option<zone_render::Result<String>> {
        if self.closed {
            return None;
        }
        match self.receiver.recv().await {
            Some(MockFrame::Text(text)) => Some(Ok(text)),
            Some(MockFrame::TransportError(reason)) => {
                self.closed = true;
                Some(Err(RenderError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    reason,
                ))))
            }
            Some(MockFrame::Close) | None => {
                self.closed = true;
                None
            }
        }
    }
}

/// Sink qui garde une copie de chaque table publiée
#[derive(Clone, Default)]
pub struct RecordingSink {
    snapshots: Arc<Mutex<Vec<TableBody>>>,
    fail_publish: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink dont chaque publication échoue (sortie indisponible)
    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn snapshots(&self) -> Vec<TableBody> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<TableBody> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    pub fn publish_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

impl RenderSink for RecordingSink {
    fn publish(&mut self, body: &TableBody) -> zone_render::Result<()> {
        if self.fail_publish {
            return Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "table container missing",
            )));
        }
        self.snapshots.lock().unwrap().push(body.clone());
        Ok(())
    }
}

/// Helper pour créer des payloads au format du control plane
pub struct ZonePayloadBuilder;

impl ZonePayloadBuilder {
    /// Échantillon 3 colonnes
    pub fn zone_sample(id: &str, last: Value, excess: Value) -> Value {
        serde_json::json!({ "id": id, "last": last, "excess": excess })
    }

    /// Échantillon 4 colonnes
    pub fn zone_key_sample(key: &str, zone: &str, last: Value, excess: Value) -> Value {
        serde_json::json!({ "key": key, "zone": zone, "last": last, "excess": excess })
    }

    /// Échantillon 4 colonnes avec un instant RFC 3339 (millisecondes, `Z`)
    pub fn zone_key_sample_at(key: &str, zone: &str, last: DateTime<Utc>, excess: i64) -> Value {
        Self::zone_key_sample(
            key,
            zone,
            Value::String(last.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::from(excess),
        )
    }

    /// Échantillon tel que sérialisé par le control plane Go (champs capitalisés)
    pub fn go_zone_entry(key: &str, zone: &str, last_millis: i64, excess: i64) -> Value {
        serde_json::json!({ "Key": key, "Zone": zone, "Last": last_millis, "Excess": excess })
    }

    /// Tableau JSON prêt à envoyer comme frame
    pub fn frame(items: Vec<Value>) -> String {
        Value::Array(items).to_string()
    }

    /// Données `instancesData` embarquées dans la page d'index
    pub fn instances(names: &[&str]) -> String {
        serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string())
    }
}
