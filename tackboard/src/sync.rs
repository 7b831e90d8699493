//! WebSocket event feed.
//!
//! One `EventFeed` wraps one connection to the server's `/ws` endpoint
//! and can subscribe to any number of board topics. Subscriptions are
//! connection-scoped: when the feed drops, they are gone, and the
//! server replays nothing on reconnect. A client that reconnects must
//! re-fetch board state over HTTP before rejoining or it will render
//! stale data.

use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use tackboard_proto::codec::CodecError;
use tackboard_proto::event::BoardEvent;
use tackboard_proto::id::BoardId;
use tackboard_proto::wire::{self, ClientFrame, ServerFrame};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Errors from the event feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed URL is invalid.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// The WebSocket transport failed.
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// The server reported an error frame.
    #[error("server error: {0}")]
    Server(String),
    /// The connection closed.
    #[error("connection closed")]
    Closed,
}

/// A live subscription connection to the server's event stream.
pub struct EventFeed {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    // Events that arrived while waiting for a join acknowledgment.
    pending: VecDeque<BoardEvent>,
}

impl EventFeed {
    /// Connects to a feed URL such as `ws://127.0.0.1:5000/ws`.
    ///
    /// # Errors
    ///
    /// [`FeedError::Url`] for a bad URL, [`FeedError::Socket`] if the
    /// connection fails.
    pub async fn connect(url: &str) -> Result<Self, FeedError> {
        let url = Url::parse(url)?;
        let (ws, _) = connect_async(url.as_str()).await?;
        tracing::debug!(url = %url, "event feed connected");
        Ok(Self {
            ws,
            pending: VecDeque::new(),
        })
    }

    /// Subscribes to a board topic, returning once the server
    /// acknowledges the join.
    ///
    /// Events that arrive while waiting are buffered and handed out by
    /// [`EventFeed::next_event`] in arrival order.
    ///
    /// # Errors
    ///
    /// Transport or codec failures, [`FeedError::Server`] if the server
    /// rejects a frame, [`FeedError::Closed`] if the connection ends.
    pub async fn join(&mut self, board: BoardId) -> Result<(), FeedError> {
        self.send(&ClientFrame::Join { board }).await?;
        loop {
            match self.next_frame().await? {
                ServerFrame::Joined { board: joined } if joined == board => {
                    tracing::debug!(board = %board, "joined board topic");
                    return Ok(());
                }
                ServerFrame::Joined { .. } => {}
                ServerFrame::Event(event) => self.pending.push_back(event),
                ServerFrame::Error { reason } => return Err(FeedError::Server(reason)),
            }
        }
    }

    /// Unsubscribes from a board topic. The server does not acknowledge
    /// leaves.
    ///
    /// # Errors
    ///
    /// Transport or codec failures.
    pub async fn leave(&mut self, board: BoardId) -> Result<(), FeedError> {
        self.send(&ClientFrame::Leave { board }).await
    }

    /// Waits for the next event from any joined board.
    ///
    /// # Errors
    ///
    /// [`FeedError::Closed`] when the connection ends,
    /// [`FeedError::Server`] on a server error frame, or transport and
    /// codec failures.
    pub async fn next_event(&mut self) -> Result<BoardEvent, FeedError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        loop {
            match self.next_frame().await? {
                ServerFrame::Event(event) => return Ok(event),
                ServerFrame::Joined { .. } => {}
                ServerFrame::Error { reason } => return Err(FeedError::Server(reason)),
            }
        }
    }

    /// Closes the connection, dropping every subscription.
    ///
    /// # Errors
    ///
    /// Transport failures while sending the close frame.
    pub async fn close(mut self) -> Result<(), FeedError> {
        self.ws.close(None).await?;
        Ok(())
    }

    async fn send(&mut self, frame: &ClientFrame) -> Result<(), FeedError> {
        let bytes = wire::encode_client(frame)?;
        self.ws.send(Message::Binary(bytes.into())).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<ServerFrame, FeedError> {
        loop {
            let Some(msg) = self.ws.next().await else {
                return Err(FeedError::Closed);
            };
            match msg? {
                Message::Binary(data) => return Ok(wire::decode_server(&data)?),
                Message::Close(_) => return Err(FeedError::Closed),
                _ => {
                    // Ignore text, ping, pong frames.
                }
            }
        }
    }
}
