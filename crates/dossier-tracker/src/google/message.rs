use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::domain::CalendarDeadline;

pub const EVENT_SOURCE: &str = "dossiertracker";
pub const EVENT_TIME_ZONE: &str = "Europe/Paris";
pub const CALENDAR_SUMMARY: &str = "DossierTracker";
pub const CALENDAR_DESCRIPTION: &str = "Échéances et tâches synchronisées depuis DossierTracker";
const EVENT_DESCRIPTION: &str = "Échéance DossierTracker synchronisée automatiquement.";

/// RFC 822 plain text message, base64url encoded for the Gmail API.
pub fn raw_email(to: &str, subject: &str, text: &str) -> String {
    let message = [
        format!("To: {}", to),
        "Content-Type: text/plain; charset=\"UTF-8\"".to_string(),
        "Content-Transfer-Encoding: 7bit".to_string(),
        format!("Subject: {}", subject),
        String::new(),
        text.to_string(),
    ]
    .join("\r\n");
    URL_SAFE_NO_PAD.encode(message)
}

/// Stable calendar event id for a deadline (and candidature when known).
/// Hex digits fit Google's base32hex id alphabet.
pub fn event_id(deadline: &CalendarDeadline) -> String {
    let candidature = deadline
        .candidature_id
        .as_ref()
        .map(|id| id.as_str())
        .unwrap_or_default();
    let digest = Sha256::digest(format!("dt:{}:{}", deadline.id.as_str(), candidature));
    format!("dt{}", &hex::encode(digest)[..32])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub reminders: EventReminders,
    pub extended_properties: ExtendedProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminders {
    pub use_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedProperties {
    pub private: PrivateProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateProperties {
    pub source: String,
    pub deadline_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidature_id: Option<String>,
}

impl EventBody {
    pub fn for_deadline(deadline: &CalendarDeadline) -> Self {
        let time = EventTime {
            date_time: deadline.due_at.to_rfc3339(),
            time_zone: EVENT_TIME_ZONE.to_string(),
        };
        Self {
            summary: deadline.title.clone(),
            description: EVENT_DESCRIPTION.to_string(),
            start: time.clone(),
            end: time,
            reminders: EventReminders { use_default: true },
            extended_properties: ExtendedProperties {
                private: PrivateProperties {
                    source: EVENT_SOURCE.to_string(),
                    deadline_id: deadline.id.as_str().to_string(),
                    candidature_id: deadline
                        .candidature_id
                        .as_ref()
                        .map(|id| id.as_str().to_string()),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CandidatureId, DeadlineId};
    use chrono::{TimeZone, Utc};

    fn deadline(candidature: Option<&str>) -> CalendarDeadline {
        CalendarDeadline {
            id: DeadlineId::from("ddl_42"),
            title: "Inscription TOEFL".into(),
            due_at: Utc.with_ymd_and_hms(2026, 1, 15, 23, 59, 0).unwrap(),
            candidature_id: candidature.map(CandidatureId::from),
        }
    }

    #[test]
    fn raw_email_is_decodable_rfc822() {
        let raw = raw_email("a@b.test", "Bonjour", "Texte");
        assert!(!raw.contains('='));
        let decoded = URL_SAFE_NO_PAD.decode(raw).expect("base64url");
        let text = String::from_utf8(decoded).expect("utf8");
        assert_eq!(
            text,
            "To: a@b.test\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\nContent-Transfer-Encoding: 7bit\r\nSubject: Bonjour\r\n\r\nTexte"
        );
    }

    #[test]
    fn event_ids_are_stable_and_scoped_by_candidature() {
        let first = event_id(&deadline(Some("cand_1")));
        assert_eq!(first, event_id(&deadline(Some("cand_1"))));
        assert_ne!(first, event_id(&deadline(Some("cand_2"))));
        assert_eq!(first.len(), 34);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='v').contains(&c)));
    }

    #[test]
    fn event_body_is_tagged() {
        let body = serde_json::to_value(EventBody::for_deadline(&deadline(Some("cand_1"))))
            .expect("json");
        assert_eq!(body["summary"], "Inscription TOEFL");
        assert_eq!(body["start"]["timeZone"], "Europe/Paris");
        assert_eq!(body["reminders"]["useDefault"], true);
        assert_eq!(body["extendedProperties"]["private"]["source"], "dossiertracker");
        assert_eq!(body["extendedProperties"]["private"]["candidatureId"], "cand_1");
    }
}
