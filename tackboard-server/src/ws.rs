//! WebSocket endpoint for realtime board events.
//!
//! A connection subscribes to board topics with `Join` frames and
//! receives every mutation event for those boards until it leaves or
//! disconnects. The socket itself is unauthenticated; it only ever
//! carries server-published events, never mutations, and a client that
//! guesses a board id learns nothing it could act on without a session.
//!
//! The connection lifecycle:
//! 1. Upgrade at `GET /ws`.
//! 2. Client sends `Join { board }`, server acknowledges with `Joined`.
//! 3. Events for joined boards arrive as binary frames.
//! 4. On disconnect, every subscription is dropped.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tackboard_proto::wire::{self, ClientFrame, ServerFrame};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::server::AppState;
use crate::topics::ConnId;

/// axum handler that upgrades an HTTP request to a WebSocket connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles one upgraded WebSocket connection.
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn: ConnId = Uuid::now_v7();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    tracing::debug!(conn = %conn, "websocket connected");

    // Channel feeding this connection's writer task. The topic registry
    // holds clones of the sender for every joined board.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let writer_conn = conn;
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::debug!(conn = %writer_conn, "websocket write failed");
                break;
            }
        }
    });

    let reader_state = Arc::clone(&state);
    let reader_conn = conn;
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Binary(data) => {
                    handle_frame(reader_conn, &data, &reader_state, &tx).await;
                }
                Message::Close(_) => {
                    tracing::debug!(conn = %reader_conn, "received close frame");
                    break;
                }
                _ => {
                    // Ignore text, ping, pong frames.
                }
            }
        }
    });

    // Wait for either task to finish, then abort the other.
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    state.topics.leave_all(conn).await;
    tracing::debug!(conn = %conn, "websocket disconnected");
}

/// Handles one binary frame from a connection.
async fn handle_frame(
    conn: ConnId,
    data: &[u8],
    state: &Arc<AppState>,
    tx: &mpsc::UnboundedSender<Message>,
) {
    let frame = match wire::decode_client(data) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(conn = %conn, error = %e, "failed to decode client frame");
            send_frame(
                tx,
                &ServerFrame::Error {
                    reason: "unrecognized frame".to_string(),
                },
            );
            return;
        }
    };

    match frame {
        ClientFrame::Join { board } => {
            state.topics.join(board, conn, tx.clone()).await;
            tracing::debug!(conn = %conn, board = %board, "joined board topic");
            send_frame(tx, &ServerFrame::Joined { board });
        }
        ClientFrame::Leave { board } => {
            let was_subscribed = state.topics.leave(board, conn).await;
            tracing::debug!(
                conn = %conn,
                board = %board,
                was_subscribed = was_subscribed,
                "left board topic"
            );
        }
    }
}

/// Encodes and queues a server frame on a connection's writer channel.
fn send_frame(tx: &mpsc::UnboundedSender<Message>, frame: &ServerFrame) {
    match wire::encode_server(frame) {
        Ok(bytes) => {
            let _ = tx.send(Message::Binary(bytes.into()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode server frame");
        }
    }
}
