use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/monitoring-script.js", get(handlers::monitoring_script))
        .route("/health", get(handlers::health))
        .route("/api/track", post(handlers::track))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/live", get(handlers::live))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Emitters post from the tracked site's origin.
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{DashboardResponse, LiveMessage, TrackEvent, TrackResponse};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use futures::{Stream, StreamExt};
    use serde::de::DeserializeOwned;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config::default())
    }

    async fn json_body<T: DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn track_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/track")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn track_accepts_event_and_dashboard_reflects_it() {
        let state = test_state();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(track_request(
                r#"{"eventType":"page_view","sessionId":"s1","timestamp":1,"data":{}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ack: TrackResponse = json_body(response).await;
        assert!(ack.success);

        let response = app
            .oneshot(Request::builder().uri("/api/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let dashboard: DashboardResponse = json_body(response).await;
        assert_eq!(dashboard.total_visits, 1);
        assert_eq!(dashboard.visits_today, 1);
        assert_eq!(dashboard.active_sessions, 1);
        assert_eq!(dashboard.realtime_activity.len(), 1);
    }

    #[tokio::test]
    async fn track_tolerates_partial_payload() {
        let app = router(test_state());
        let response = app
            .oneshot(track_request(r#"{"eventType":"button_click"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn track_rejects_non_json_with_generic_failure() {
        let app = router(test_state());
        let response = app.oneshot(track_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let ack: TrackResponse = json_body(response).await;
        assert!(!ack.success);
        assert!(!ack.message.contains("not json"));
    }

    #[tokio::test]
    async fn track_publishes_live_update() {
        let state = test_state();
        let mut viewer = state.hub.subscribe();
        let app = router(state);

        app.oneshot(track_request(
            r#"{"eventType":"button_click","sessionId":"s1","data":{"packageType":"seducao"}}"#,
        ))
        .await
        .unwrap();

        match viewer.recv().await.unwrap() {
            crate::models::LiveMessage::ButtonClick(update) => {
                assert_eq!(update.total_clicks, 1);
                assert_eq!(update.seducao_clicks, 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/track")
                    .header("origin", "https://tracked.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn monitoring_script_is_served_as_javascript() {
        let config = Config {
            public_url: Some("https://tracker.example".to_string()),
            ..Config::default()
        };
        let app = router(AppState::new(config));
        let response = app
            .oneshot(Request::builder().uri("/monitoring-script.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/javascript"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let script = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(script.contains("\"https://tracker.example\""));
    }

    async fn next_live_message(
        socket: &mut (impl Stream<Item = Result<WsMessage, WsError>> + Unpin),
    ) -> LiveMessage {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
                .await
                .expect("no live frame within 2s")
                .expect("socket closed")
                .expect("socket error");
            if let WsMessage::Text(text) = frame {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn live_viewer_gets_snapshot_then_updates_and_is_dropped_on_close() {
        let state = test_state();
        {
            let mut tracker = state.tracker.lock().await;
            for n in 0..12 {
                let event = TrackEvent::from_value(&serde_json::json!({
                    "eventType": "page_view",
                    "sessionId": format!("seed{n}"),
                }));
                tracker.ingest(&event);
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        let server = tokio::spawn(async move { axum::serve(listener, app).await });

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/api/live"))
            .await
            .unwrap();

        match next_live_message(&mut socket).await {
            LiveMessage::InitialData(initial) => {
                assert_eq!(initial.total_visits, 12);
                assert_eq!(initial.realtime_activity.len(), 10);
                assert_eq!(initial.realtime_activity[0].session_id, "seed11");
            }
            other => panic!("expected initial_data first, got {other:?}"),
        }
        assert_eq!(state.hub.viewer_count(), 1);

        let response = router(state.clone())
            .oneshot(track_request(
                r#"{"eventType":"page_view","sessionId":"viewer_test","data":{}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        match next_live_message(&mut socket).await {
            LiveMessage::Visit(visit) => {
                assert_eq!(visit.total_visits, 13);
                assert_eq!(visit.visits_by_hour.len(), 24);
            }
            other => panic!("expected a visit update, got {other:?}"),
        }

        socket.close(None).await.unwrap();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while state.hub.viewer_count() > 0 {
            assert!(tokio::time::Instant::now() < deadline, "viewer still subscribed after close");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        server.abort();
    }
}
