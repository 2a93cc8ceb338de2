use crate::errors::AppError;
use crate::models::{DashboardResponse, LiveMessage, TrackEvent, TrackResponse};
use crate::state::AppState;
use crate::stats::{build_dashboard, build_initial_data};
use crate::ui::{render_dashboard, render_emitter};
use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::header,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde_json::Value;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};

pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn dashboard_page() -> Html<String> {
    Html(render_dashboard())
}

pub async fn monitoring_script(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        render_emitter(state.config.public_url.as_deref()),
    )
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn track(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let Json(body) = payload?;
    let event = TrackEvent::from_value(&body);

    // A panic while aggregating surfaces here as a JoinError and becomes a
    // generic 500; the tracker mutex is not poisoned by it.
    tokio::spawn(async move { apply_event(&state, &event).await }).await?;

    Ok(Json(TrackResponse::ok()))
}

async fn apply_event(state: &AppState, event: &TrackEvent) {
    let mut tracker = state.tracker.lock().await;
    if let Some(update) = tracker.ingest(event) {
        let viewers = state.hub.publish(update);
        debug!(viewers, "published live update");
    }
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let mut tracker = state.tracker.lock().await;
    Json(build_dashboard(&mut tracker))
}

pub async fn live(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_viewer(socket, state))
}

async fn serve_viewer(socket: WebSocket, state: AppState) {
    // Subscribing under the tracker lock means every update published after
    // the snapshot reaches this viewer exactly once.
    let (initial, updates) = {
        let mut tracker = state.tracker.lock().await;
        (build_initial_data(&mut tracker), state.hub.subscribe())
    };
    info!(viewers = state.hub.viewer_count(), "dashboard viewer connected");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        if send_message(&mut sender, &LiveMessage::InitialData(initial)).await.is_err() {
            return;
        }

        let mut updates = BroadcastStream::new(updates);
        while let Some(item) = updates.next().await {
            match item {
                Ok(message) => {
                    if send_message(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "live viewer fell behind, dropping updates");
                }
            }
        }
    });

    // Viewers never send anything meaningful; just watch for the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("dashboard viewer disconnected");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &LiveMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(text)).await
}
