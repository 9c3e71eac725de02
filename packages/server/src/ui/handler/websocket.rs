//! WebSocket connection handlers.
//!
//! One upgraded socket goes through `Connecting -> Authorized -> Joined ->
//! Reading -> Closing -> Closed`. The reader runs on its own task and is the
//! only place that receives from the socket; a writer task drains the
//! client's outbound queue. Leaving the room happens in [`LeaveGuard::drop`]
//! so every exit path runs it.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;

use crate::{
    domain::{ClientHandle, ConnectionLifecycle, ConnectionState, OutboundReceiver},
    infrastructure::dto::websocket::ErrorFrameDto,
    ui::{handler::http::bearer_credential, state::AppState},
    usecase::{ConnectError, ConnectionRequest, DisconnectParticipantUseCase, SendMessageError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub community_id: Option<String>,
    pub auth: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let request = ConnectionRequest {
        credential: bearer_credential(&headers).or(query.auth),
        room_id: query.community_id,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, request))
}

/// Removes the client from its room when dropped
struct LeaveGuard {
    usecase: Arc<DisconnectParticipantUseCase>,
    client: Arc<ClientHandle>,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        self.usecase.execute(&self.client);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, request: ConnectionRequest) {
    let mut lifecycle = ConnectionLifecycle::new(format!(
        "community={}",
        request.room_id.as_deref().unwrap_or("-")
    ));

    let (identity, room_id) = match state.authorize_connection_usecase.execute(request).await {
        Ok(authorized) => authorized,
        Err(e) => {
            reject(socket, e, state.connection.write_timeout).await;
            advance(&mut lifecycle, ConnectionState::Closed);
            return;
        }
    };
    advance(&mut lifecycle, ConnectionState::Authorized);

    let (client, outbound) = state
        .connect_participant_usecase
        .execute(&identity, room_id);
    lifecycle.identify(client.connection_id);
    let guard = LeaveGuard {
        usecase: state.disconnect_participant_usecase.clone(),
        client: client.clone(),
    };
    advance(&mut lifecycle, ConnectionState::Joined);

    let (sink, stream) = socket.split();
    let mut send_task = tokio::spawn(writer_loop(
        outbound,
        sink,
        client.clone(),
        state.connection.write_timeout,
    ));
    let mut recv_task = tokio::spawn(reader_loop(stream, state.clone(), client.clone()));
    advance(&mut lifecycle, ConnectionState::Reading);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    advance(&mut lifecycle, ConnectionState::Closing);
    drop(guard);
    advance(&mut lifecycle, ConnectionState::Closed);
}

fn advance(lifecycle: &mut ConnectionLifecycle, next: ConnectionState) {
    // Rejections are already traced by the lifecycle
    let _ = lifecycle.transition(next);
}

/// Write one error frame and close the socket
async fn reject(mut socket: WebSocket, error: ConnectError, write_timeout: Duration) {
    tracing::info!("Rejecting connection: {}", error);

    let frame = ErrorFrameDto::new(error.status_code(), error.to_string());
    let close = CloseFrame {
        code: close_code::POLICY,
        reason: "connection rejected".into(),
    };
    let write = async {
        if let Ok(json) = serde_json::to_string(&frame) {
            socket.send(Message::Text(json.into())).await?;
        }
        socket.send(Message::Close(Some(close))).await
    };
    match tokio::time::timeout(write_timeout, write).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("Failed to write rejection frame: {}", e),
        Err(_) => tracing::debug!("Timed out writing rejection frame"),
    }
}

/// Drains the outbound queue to the socket until the client is closed or a
/// write fails
async fn writer_loop(
    mut outbound: OutboundReceiver,
    mut sink: SplitSink<WebSocket, Message>,
    client: Arc<ClientHandle>,
    write_timeout: Duration,
) {
    loop {
        let frame = tokio::select! {
            _ = client.closed() => break,
            frame = outbound.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        match tokio::time::timeout(write_timeout, sink.send(Message::Text(frame.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(connection_id = %client.connection_id, "Write failed: {}", e);
                return;
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %client.connection_id,
                    "Write timed out after {:?}, dropping client",
                    write_timeout
                );
                return;
            }
        }
    }

    let _ = tokio::time::timeout(write_timeout, sink.send(Message::Close(None))).await;
}

/// Receives frames one at a time and hands each text frame to the send use case
async fn reader_loop(
    mut stream: SplitStream<WebSocket>,
    state: Arc<AppState>,
    client: Arc<ClientHandle>,
) {
    loop {
        let message = tokio::select! {
            _ = client.closed() => break,
            next = stream.next() => match next {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %client.connection_id, "WebSocket error: {}", e);
                    break;
                }
                None => break,
            },
        };

        let text = match message {
            Message::Text(text) => text.as_str().to_string(),
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => text.to_string(),
                Err(_) => {
                    tracing::debug!(
                        connection_id = %client.connection_id,
                        "Ignoring non UTF-8 binary frame ({} bytes)",
                        bytes.len()
                    );
                    continue;
                }
            },
            Message::Close(_) => {
                tracing::info!(connection_id = %client.connection_id, "Client requested close");
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        handle_text(&state, &client, text).await;
    }
}

async fn handle_text(state: &AppState, client: &ClientHandle, text: String) {
    tracing::debug!(
        connection_id = %client.connection_id,
        "Received message ({} bytes)",
        text.len()
    );

    match state
        .send_message_usecase
        .execute(client.room_id, client.user.clone(), text)
        .await
    {
        Ok((stored, report)) => {
            tracing::debug!(
                message_id = %stored.id,
                delivered = report.delivered,
                pruned = report.pruned,
                "Message sent"
            );
        }
        Err(SendMessageError::InvalidContent(e)) => {
            tracing::warn!(connection_id = %client.connection_id, "Dropping message: {}", e);
        }
        Err(e @ SendMessageError::Persistence(_)) => {
            tracing::warn!(connection_id = %client.connection_id, "Dropping message: {}", e);
            let nack = ErrorFrameDto::new(e.status_code(), "failed to save message");
            if let Ok(json) = serde_json::to_string(&nack)
                && let Err(push) = client.try_push(json)
            {
                tracing::warn!(connection_id = %client.connection_id, "Failed to queue nack: {}", push);
            }
        }
    }
}
