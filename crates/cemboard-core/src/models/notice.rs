//! Notices and events from `/api/notices`

use crate::calendar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of notice kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    #[default]
    Notice,
    Event,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Notice => write!(f, "notice"),
            NoticeKind::Event => write!(f, "event"),
        }
    }
}

impl FromStr for NoticeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notice" => Ok(NoticeKind::Notice),
            "event" => Ok(NoticeKind::Event),
            other => Err(format!(
                "Invalid notice type: '{}'. Expected notice or event",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: NoticeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Notice {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(calendar::parse_date)
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }
}

/// Body of POST/PUT `/api/notices`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoticePayload {
    pub title: String,
    pub description: String,
    pub date: String,
    pub image: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kind_wire_format() {
        let notice: Notice =
            serde_json::from_str(r#"{"_id":"n1","title":"Eid","description":"d","type":"event"}"#)
                .unwrap();
        assert_eq!(notice.kind, NoticeKind::Event);

        let payload = NoticePayload {
            title: "Cleanup".to_string(),
            kind: NoticeKind::Notice,
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "notice");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<Notice, _> =
            serde_json::from_str(r#"{"_id":"n1","title":"x","type":"party"}"#);
        assert!(result.is_err());
        assert!("party".parse::<NoticeKind>().is_err());
        assert_eq!("Event".parse::<NoticeKind>().unwrap(), NoticeKind::Event);
    }

    #[test]
    fn test_empty_image_is_none() {
        let notice = Notice {
            image: Some(String::new()),
            ..Default::default()
        };
        assert!(notice.image().is_none());
    }
}
