use crate::state::AppState;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

/// Spawns the background task that evicts expired sessions every
/// `sweep_interval`. The first sweep runs one interval after start.
pub fn spawn_session_sweeper(state: AppState) -> JoinHandle<()> {
    let period = state.config.sweep_interval;
    tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            sweep_once(&state).await;
        }
    })
}

pub async fn sweep_once(state: &AppState) -> usize {
    let mut tracker = state.tracker.lock().await;
    let removed = tracker.sweep();
    info!(
        removed,
        active_sessions = tracker.sessions().len(),
        "session sweep finished"
    );
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::TrackEvent;
    use serde_json::json;
    use std::time::Duration;

    fn page_view(session_id: &str) -> TrackEvent {
        TrackEvent::from_value(&json!({ "eventType": "page_view", "sessionId": session_id }))
    }

    #[tokio::test]
    async fn sweep_once_drops_sessions_past_max_age() {
        let config = Config {
            session_max_age: Duration::ZERO,
            ..Config::default()
        };
        let state = AppState::new(config);
        {
            let mut tracker = state.tracker.lock().await;
            let started = tracker.now() - chrono::Duration::seconds(5);
            tracker.ingest_at(&page_view("stale"), started);
        }

        assert_eq!(sweep_once(&state).await, 1);
        assert!(state.tracker.lock().await.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_on_interval() {
        let config = Config {
            session_max_age: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(300),
            ..Config::default()
        };
        let state = AppState::new(config);
        {
            let mut tracker = state.tracker.lock().await;
            let started = tracker.now() - chrono::Duration::minutes(10);
            tracker.ingest_at(&page_view("old"), started);
        }

        let handle = spawn_session_sweeper(state.clone());
        time::sleep(Duration::from_secs(301)).await;
        assert!(state.tracker.lock().await.sessions().is_empty());
        handle.abort();
    }
}
