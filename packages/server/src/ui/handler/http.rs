//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{ApiResponse, HistoryQuery, MessageGroupDto, RoomPresenceDto},
    ui::state::AppState,
    usecase::{ConnectionRequest, parse_room_id},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Message history of a community, grouped for rendering
///
/// `GET /api/messages?communityId=<id>&lastMessageTime=<cursor>`
pub async fn get_message_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Response {
    let request = ConnectionRequest {
        credential: bearer_credential(&headers),
        room_id: query.community_id,
    };
    let room_id = match state.authorize_connection_usecase.execute(request).await {
        Ok((_, room_id)) => room_id,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    match state
        .get_message_history_usecase
        .execute(&room_id, query.last_message_time.as_deref())
        .await
    {
        Ok(groups) => {
            // Domain Model から DTO への変換
            let data: Vec<MessageGroupDto> = groups.into_iter().map(Into::into).collect();
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse::ok(StatusCode::ACCEPTED.as_u16(), data)),
            )
                .into_response()
        }
        Err(e) => error_response(e.status_code(), e.to_string()),
    }
}

/// Debug endpoint: number of live connections in a room
pub async fn debug_room_presence(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomPresenceDto>, StatusCode> {
    let room_id = parse_room_id(Some(&room_id)).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(RoomPresenceDto {
        community_id: room_id.as_uuid(),
        connected_clients: state.registry.member_count(&room_id),
    }))
}

pub(super) fn bearer_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn error_response(status_code: u16, message: String) -> Response {
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::<()>::error(status.as_u16(), message)),
    )
        .into_response()
}
