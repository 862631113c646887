//! WebSocket line socket
//!
//! The debug channel talks to Core over a long-lived duplex stream that is
//! independent of the session's request connection. This module owns the
//! socket; line framing and the consumer callback live in `corelink`.

use crate::error::{Result, TransportError};
use futures::{SinkExt, StreamExt};
use http::HeaderMap;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// A connected duplex WebSocket that yields text payloads.
pub struct LineSocket {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl LineSocket {
    /// Perform the WebSocket handshake against `url`, sending `headers` with
    /// the upgrade request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] for a malformed URL, or the
    /// mapped handshake/I/O error.
    pub async fn connect(url: &str, headers: &HeaderMap) -> Result<Self> {
        let mut request = url
            .into_client_request()
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", url, e)))?;
        for (name, value) in headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }

        let (inner, response) = tokio_tungstenite::connect_async(request).await?;
        debug!(url = %url, status = response.status().as_u16(), "debug socket connected");

        Ok(Self {
            inner,
            url: url.to_string(),
        })
    }

    /// The URL this socket is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Receive the next data payload.
    ///
    /// Returns `Ok(None)` once the remote side closes. Control frames are
    /// handled internally; binary payloads are decoded as lossy UTF-8.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        while let Some(message) = self.inner.next().await {
            match message {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(bytes)) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Err(err) => match TransportError::from(err) {
                    TransportError::Closed => return Ok(None),
                    other => return Err(other),
                },
            }
        }
        Ok(None)
    }

    /// Send a text payload to the remote side.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.inner.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a close frame and flush. Errors from an already closed peer are ignored.
    pub async fn close(&mut self) -> Result<()> {
        match self.inner.close(None).await {
            Ok(()) => Ok(()),
            Err(err) => match TransportError::from(err) {
                TransportError::Closed => Ok(()),
                other => Err(other),
            },
        }
    }
}

impl std::fmt::Debug for LineSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSocket").field("url", &self.url).finish()
    }
}
