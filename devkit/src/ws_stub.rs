/*!
Serveur WebSocket local pour tests end-to-end

Accepte UNE connexion sur 127.0.0.1 (port éphémère), pousse les frames
scriptées dans l'ordre puis ferme proprement. Enregistre le chemin demandé
et tout message reçu du client (le viewer ne doit jamais rien envoyer).
*/

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub struct WsStub {
    addr: SocketAddr,
    requested_path: Arc<Mutex<Option<String>>>,
    received: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

/// Démarre le stub avec les frames texte à pousser après l'upgrade
pub async fn spawn_ws_stub(frames: Vec<String>) -> Result<WsStub> {
    spawn_ws_stub_with_delay(frames, Duration::ZERO).await
}

/// Variante avec une pause entre chaque frame (comme le push périodique du serveur)
pub async fn spawn_ws_stub_with_delay(frames: Vec<String>, delay: Duration) -> Result<WsStub> {
    let messages = frames.into_iter().map(|f| Message::Text(f.into())).collect();
    spawn_ws_stub_messages(messages, delay).await
}

/// Variante bas niveau: messages WebSocket bruts (binary, ping...) dans l'ordre donné
pub async fn spawn_ws_stub_messages(messages: Vec<Message>, delay: Duration) -> Result<WsStub> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let requested_path = Arc::new(Mutex::new(None));
    let received = Arc::new(Mutex::new(Vec::new()));

    let path_slot = requested_path.clone();
    let received_slot = received.clone();
    let handle = tokio::spawn(async move {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                log::error!("❌ [STUB] accept failed: {}", e);
                return;
            }
        };

        let callback = move |req: &Request, resp: Response| -> std::result::Result<Response, ErrorResponse> {
            *path_slot.lock().unwrap() = Some(req.uri().path().to_string());
            Ok(resp)
        };
        let ws = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws) => ws,
            Err(e) => {
                log::error!("❌ [STUB] handshake with {} failed: {}", peer, e);
                return;
            }
        };
        log::info!("🔗 [STUB] client connected from {}", peer);

        let (mut writer, mut reader) = ws.split();
        let reader_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = reader.next().await {
                if let Message::Text(text) = msg {
                    received_slot.lock().unwrap().push(text.as_str().to_owned());
                }
            }
        });

        for message in messages {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = writer.send(message).await {
                log::warn!("⚠️ [STUB] send failed: {}", e);
                return;
            }
        }
        let _ = writer.send(Message::Close(None)).await;
        let _ = tokio::time::timeout(Duration::from_secs(1), reader_task).await;
    });

    Ok(WsStub {
        addr,
        requested_path,
        received,
        handle: Some(handle),
    })
}

impl WsStub {
    /// `host:port` à passer au viewer
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn requested_path(&self) -> Option<String> {
        self.requested_path.lock().unwrap().clone()
    }

    pub fn received_messages(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Attend la fin du script (toutes les frames envoyées + close)
    pub async fn finished(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}
