use crate::aggregator::Tracker;
use crate::broadcast::Broadcaster;
use crate::config::Config;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<Mutex<Tracker>>,
    pub hub: Broadcaster,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let tracker = Tracker::new(&config);
        Self {
            config: Arc::new(config),
            tracker: Arc::new(Mutex::new(tracker)),
            hub: Broadcaster::new(),
        }
    }
}
