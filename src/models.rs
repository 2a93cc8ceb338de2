use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    Seducao,
    Premium,
    Unknown,
}

impl Package {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("seducao") => Package::Seducao,
            Some("premium") => Package::Premium,
            _ => Package::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Package::Seducao => "Pacote Sedução (R$ 10,00)",
            Package::Premium => "Pacote Premium (R$ 19,90)",
            Package::Unknown => "pacote não identificado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PageView,
    ButtonClick,
    ScrollEngagement,
    TimeOnPage,
    PageExit,
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "page_view" => EventKind::PageView,
            "button_click" => EventKind::ButtonClick,
            "scroll_engagement" => EventKind::ScrollEngagement,
            "time_on_page" => EventKind::TimeOnPage,
            "page_exit" => EventKind::PageExit,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// A client-reported event, read tolerantly from an arbitrary JSON body.
///
/// Fields of the wrong type are treated as absent instead of rejecting the
/// whole payload, since emitters are untrusted and unversioned.
#[derive(Debug, Clone)]
pub struct TrackEvent {
    pub kind: EventKind,
    pub session_id: String,
    pub timestamp: Option<i64>,
    pub data: Value,
}

impl TrackEvent {
    pub fn from_value(body: &Value) -> Self {
        let kind = EventKind::parse(body.get("eventType").and_then(Value::as_str).unwrap_or(""));
        let session_id = body
            .get("sessionId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let timestamp = body.get("timestamp").and_then(Value::as_f64).map(|ts| ts as i64);
        let data = body.get("data").cloned().unwrap_or(Value::Null);

        Self {
            kind,
            session_id,
            timestamp,
            data,
        }
    }

    pub fn package(&self) -> Package {
        Package::parse(self.data.get("packageType").and_then(Value::as_str))
    }

    pub fn time_on_page(&self) -> Option<u64> {
        self.data
            .get("timeOnPage")
            .and_then(Value::as_f64)
            .filter(|ms| *ms >= 0.0)
            .map(|ms| ms as u64)
    }

    pub fn scroll_percent(&self) -> Option<f64> {
        self.data.get("scrollPercent").and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Visit,
    Click,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: i64,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<Package>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageClicks {
    pub seducao: u64,
    pub premium: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub start_time: i64,
    pub last_seen: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub page_views: u64,
    pub button_clicks: u64,
    pub package_clicks: PackageClicks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on_page: Option<u64>,
}

impl Session {
    pub fn new(now_ms: i64) -> Self {
        Self {
            start_time: now_ms,
            last_seen: now_ms,
            end_time: None,
            duration: None,
            page_views: 0,
            button_clicks: 0,
            package_clicks: PackageClicks::default(),
            time_on_page: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
    pub message: String,
}

impl TrackResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "Dados recebidos com sucesso".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_visits: u64,
    pub visits_today: u64,
    pub total_clicks: u64,
    pub seducao_clicks: u64,
    pub premium_clicks: u64,
    pub unknown_clicks: u64,
    pub visits_by_hour: Vec<u64>,
    pub realtime_activity: Vec<ActivityEntry>,
    pub active_sessions: usize,
    pub conversion_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    pub total_visits: u64,
    pub visits_today: u64,
    pub total_clicks: u64,
    pub seducao_clicks: u64,
    pub premium_clicks: u64,
    pub unknown_clicks: u64,
    pub visits_by_hour: Vec<u64>,
    pub realtime_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitUpdate {
    pub total_visits: u64,
    pub visits_today: u64,
    pub visits_by_hour: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickUpdate {
    pub total_clicks: u64,
    pub seducao_clicks: u64,
    pub premium_clicks: u64,
    pub unknown_clicks: u64,
    pub package: Package,
}

/// Frames pushed to live dashboard viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum LiveMessage {
    InitialData(InitialData),
    Visit(VisitUpdate),
    ButtonClick(ClickUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn track_event_reads_known_fields() {
        let body = json!({
            "eventType": "button_click",
            "sessionId": "session_1",
            "timestamp": 1_700_000_000_000i64,
            "data": { "packageType": "premium" }
        });
        let event = TrackEvent::from_value(&body);
        assert_eq!(event.kind, EventKind::ButtonClick);
        assert_eq!(event.session_id, "session_1");
        assert_eq!(event.timestamp, Some(1_700_000_000_000));
        assert_eq!(event.package(), Package::Premium);
    }

    #[test]
    fn track_event_defaults_malformed_fields() {
        let body = json!({ "eventType": 7, "sessionId": ["x"], "data": "nope" });
        let event = TrackEvent::from_value(&body);
        assert_eq!(event.kind, EventKind::Other(String::new()));
        assert!(event.session_id.is_empty());
        assert_eq!(event.timestamp, None);
        assert_eq!(event.package(), Package::Unknown);
        assert_eq!(event.time_on_page(), None);
    }

    #[test]
    fn unrecognised_package_is_unknown() {
        assert_eq!(Package::parse(Some("gold")), Package::Unknown);
        assert_eq!(Package::parse(None), Package::Unknown);
        assert_eq!(Package::parse(Some("seducao")), Package::Seducao);
    }

    #[test]
    fn live_message_wire_shape() {
        let msg = LiveMessage::Visit(VisitUpdate {
            total_visits: 3,
            visits_today: 2,
            visits_by_hour: vec![0; HOURS_PER_DAY],
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "visit");
        assert_eq!(value["data"]["totalVisits"], 3);
        assert_eq!(value["data"]["visitsByHour"].as_array().unwrap().len(), 24);
    }
}
