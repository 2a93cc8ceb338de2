pub mod activity;
pub mod aggregator;
pub mod app;
pub mod broadcast;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod sessions;
pub mod state;
pub mod stats;
pub mod sweeper;
pub mod ui;

pub use aggregator::Tracker;
pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use sweeper::spawn_session_sweeper;
