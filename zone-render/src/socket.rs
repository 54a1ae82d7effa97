//! WebSocket frame source for the live zone tables.
//!
//! Connects to `ws://<host>/ws/<instance>` and yields every text frame the
//! control plane pushes. Nothing is ever sent back on the socket.

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::Result;
use crate::live::FrameSource;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Socket URL for an instance. The scheme is always `ws://` and the
/// instance segment is used as given.
pub fn socket_url(host: &str, instance: &str) -> String {
    format!("ws://{host}/ws/{instance}")
}

pub struct WsFrameSource {
    url: String,
    stream: WsStream,
}

impl WsFrameSource {
    pub async fn connect(host: &str, instance: &str) -> Result<Self> {
        Self::connect_url(socket_url(host, instance)).await
    }

    pub async fn connect_url(url: String) -> Result<Self> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        info!("connected to {}", url);
        Ok(Self { url, stream })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.as_str().to_owned())),
                Some(Ok(Message::Close(frame))) => {
                    debug!("close frame from {}: {:?}", self.url, frame);
                    return None;
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!("skipping {} byte binary frame", data.len());
                }
                // ping/pong are answered by tungstenite
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }
}
