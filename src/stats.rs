use crate::aggregator::Tracker;
use crate::models::{DashboardResponse, InitialData};
use chrono::{DateTime, FixedOffset};

const DASHBOARD_ACTIVITY_LIMIT: usize = 20;
const INITIAL_ACTIVITY_LIMIT: usize = 10;

pub fn build_dashboard(tracker: &mut Tracker) -> DashboardResponse {
    let now = tracker.now();
    build_dashboard_at(now, tracker)
}

pub fn build_dashboard_at(now: DateTime<FixedOffset>, tracker: &mut Tracker) -> DashboardResponse {
    tracker.reset_daily_if_needed(now);

    let counters = tracker.counters();
    let clicks = counters.clicks_by_package;
    DashboardResponse {
        total_visits: counters.total_visits,
        visits_today: counters.visits_today,
        total_clicks: counters.total_clicks,
        seducao_clicks: clicks.seducao,
        premium_clicks: clicks.premium,
        unknown_clicks: clicks.unknown,
        visits_by_hour: counters.visits_by_hour.to_vec(),
        realtime_activity: tracker.activity().recent(DASHBOARD_ACTIVITY_LIMIT),
        active_sessions: tracker.sessions().len(),
        conversion_rate: conversion_rate(counters.total_clicks, counters.visits_today),
    }
}

pub fn build_initial_data(tracker: &mut Tracker) -> InitialData {
    let now = tracker.now();
    build_initial_data_at(now, tracker)
}

/// Snapshot sent to a live viewer right after it connects.
pub fn build_initial_data_at(now: DateTime<FixedOffset>, tracker: &mut Tracker) -> InitialData {
    tracker.reset_daily_if_needed(now);

    let counters = tracker.counters();
    let clicks = counters.clicks_by_package;
    InitialData {
        total_visits: counters.total_visits,
        visits_today: counters.visits_today,
        total_clicks: counters.total_clicks,
        seducao_clicks: clicks.seducao,
        premium_clicks: clicks.premium,
        unknown_clicks: clicks.unknown,
        visits_by_hour: counters.visits_by_hour.to_vec(),
        realtime_activity: tracker.activity().recent(INITIAL_ACTIVITY_LIMIT),
    }
}

/// Clicks per visit today as a percentage with one decimal, `"0"` when
/// there were no visits today.
pub fn conversion_rate(total_clicks: u64, visits_today: u64) -> String {
    if visits_today == 0 {
        return "0".to_string();
    }
    let rate = total_clicks as f64 / visits_today as f64 * 100.0;
    format!("{rate:.1}")
}
