use crate::activity::ActivityLog;
use crate::config::Config;
use crate::models::{
    ActivityEntry, ActivityKind, ClickUpdate, EventKind, HOURS_PER_DAY, LiveMessage, Package,
    TrackEvent, VisitUpdate,
};
use crate::sessions::SessionStore;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClicksByPackage {
    pub seducao: u64,
    pub premium: u64,
    pub unknown: u64,
}

impl ClicksByPackage {
    fn bump(&mut self, package: Package) {
        let slot = match package {
            Package::Seducao => &mut self.seducao,
            Package::Premium => &mut self.premium,
            Package::Unknown => &mut self.unknown,
        };
        *slot = slot.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counters {
    pub total_visits: u64,
    pub visits_today: u64,
    pub total_clicks: u64,
    pub clicks_by_package: ClicksByPackage,
    pub visits_by_hour: [u64; HOURS_PER_DAY],
    pub last_reset_day: u32,
}

impl Counters {
    fn starting_on(day: u32) -> Self {
        Self {
            total_visits: 0,
            visits_today: 0,
            total_clicks: 0,
            clicks_by_package: ClicksByPackage::default(),
            visits_by_hour: [0; HOURS_PER_DAY],
            last_reset_day: day,
        }
    }
}

/// All aggregate state of the server: running counters, the session store
/// and the recent activity feed.
///
/// Callers serialize access (see `AppState`); every mutating operation takes
/// the current time explicitly so tests can drive the clock.
#[derive(Debug)]
pub struct Tracker {
    counters: Counters,
    sessions: SessionStore,
    activity: ActivityLog,
    offset: FixedOffset,
    session_max_age_ms: i64,
}

impl Tracker {
    pub fn new(config: &Config) -> Self {
        let now = Utc::now().with_timezone(&config.utc_offset);
        Self::new_at(config, now)
    }

    pub fn new_at(config: &Config, now: DateTime<FixedOffset>) -> Self {
        Self {
            counters: Counters::starting_on(now.day()),
            sessions: SessionStore::new(config.max_sessions),
            activity: ActivityLog::new(config.activity_capacity),
            offset: config.utc_offset,
            session_max_age_ms: i64::try_from(config.session_max_age.as_millis())
                .unwrap_or(i64::MAX),
        }
    }

    /// Current wall-clock time in the tracker's timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn ingest(&mut self, event: &TrackEvent) -> Option<LiveMessage> {
        let now = self.now();
        self.ingest_at(event, now)
    }

    /// Applies one event and returns the live update to publish, if any.
    pub fn ingest_at(&mut self, event: &TrackEvent, now: DateTime<FixedOffset>) -> Option<LiveMessage> {
        self.reset_daily_if_needed(now);
        let now_ms = now.timestamp_millis();

        debug!(
            kind = ?event.kind,
            session_id = %event.session_id,
            client_ts = ?event.timestamp,
            "ingesting event"
        );

        let update = match &event.kind {
            EventKind::PageView => Some(self.record_visit(event, now)),
            EventKind::ButtonClick => Some(self.record_click(event, now_ms)),
            EventKind::ScrollEngagement => {
                debug!(
                    session_id = %event.session_id,
                    scroll_percent = ?event.scroll_percent(),
                    "scroll engagement"
                );
                None
            }
            EventKind::TimeOnPage => {
                if let Some(session) = self.sessions.get_mut(&event.session_id) {
                    session.time_on_page = event.time_on_page();
                }
                None
            }
            EventKind::PageExit => {
                if let Some(session) = self.sessions.get_mut(&event.session_id) {
                    session.end_time = Some(now_ms);
                    session.duration = Some(now_ms - session.start_time);
                }
                None
            }
            EventKind::Other(kind) => {
                debug!(kind = %kind, "ignoring unknown event type");
                None
            }
        };

        self.record_session(event, now_ms);
        update
    }

    /// Zeroes the per-day counters once the day-of-month in the tracker's
    /// timezone differs from the last reset. Returns whether a reset happened.
    pub fn reset_daily_if_needed(&mut self, now: DateTime<FixedOffset>) -> bool {
        let today = now.day();
        if today == self.counters.last_reset_day {
            return false;
        }

        self.counters.visits_today = 0;
        self.counters.visits_by_hour = [0; HOURS_PER_DAY];
        self.counters.last_reset_day = today;
        info!(day = today, "daily counters reset");
        true
    }

    pub fn sweep(&mut self) -> usize {
        let now = self.now();
        self.sweep_at(now)
    }

    /// Evicts sessions started more than the configured max age ago.
    pub fn sweep_at(&mut self, now: DateTime<FixedOffset>) -> usize {
        self.sessions
            .sweep(now.timestamp_millis(), self.session_max_age_ms)
    }

    fn record_visit(&mut self, event: &TrackEvent, now: DateTime<FixedOffset>) -> LiveMessage {
        let counters = &mut self.counters;
        counters.total_visits = counters.total_visits.saturating_add(1);
        counters.visits_today = counters.visits_today.saturating_add(1);
        let hour = now.hour() as usize;
        counters.visits_by_hour[hour] = counters.visits_by_hour[hour].saturating_add(1);

        self.activity.push(ActivityEntry {
            kind: ActivityKind::Visit,
            message: "Nova visita detectada".to_string(),
            timestamp: now.timestamp_millis(),
            session_id: event.session_id.clone(),
            package_type: None,
        });

        LiveMessage::Visit(VisitUpdate {
            total_visits: counters.total_visits,
            visits_today: counters.visits_today,
            visits_by_hour: counters.visits_by_hour.to_vec(),
        })
    }

    fn record_click(&mut self, event: &TrackEvent, now_ms: i64) -> LiveMessage {
        let package = event.package();
        let counters = &mut self.counters;
        counters.total_clicks = counters.total_clicks.saturating_add(1);
        counters.clicks_by_package.bump(package);

        self.activity.push(ActivityEntry {
            kind: ActivityKind::Click,
            message: format!("Clique no {}", package.label()),
            timestamp: now_ms,
            session_id: event.session_id.clone(),
            package_type: Some(package),
        });

        let clicks = counters.clicks_by_package;
        LiveMessage::ButtonClick(ClickUpdate {
            total_clicks: counters.total_clicks,
            seducao_clicks: clicks.seducao,
            premium_clicks: clicks.premium,
            unknown_clicks: clicks.unknown,
            package,
        })
    }

    fn record_session(&mut self, event: &TrackEvent, now_ms: i64) {
        let updates_existing_only = matches!(event.kind, EventKind::TimeOnPage | EventKind::PageExit);
        if updates_existing_only && self.sessions.get(&event.session_id).is_none() {
            return;
        }

        let session = self.sessions.upsert(&event.session_id, now_ms);
        match event.kind {
            EventKind::PageView => {
                session.page_views = session.page_views.saturating_add(1);
            }
            EventKind::ButtonClick => {
                session.button_clicks = session.button_clicks.saturating_add(1);
                let clicks = &mut session.package_clicks;
                match event.package() {
                    Package::Seducao => clicks.seducao = clicks.seducao.saturating_add(1),
                    Package::Premium => clicks.premium = clicks.premium.saturating_add(1),
                    Package::Unknown => {}
                }
            }
            _ => {}
        }
    }
}
