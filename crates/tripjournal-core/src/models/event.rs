use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Media, ResourceId};
use crate::codec::iso8601;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: ResourceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub medias: Vec<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_from_previous: Option<String>,
}

/// Request payload for `POST /events`. The owning trip is referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCreate {
    pub trip_id: ResourceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_from_previous: Option<String>,
}

/// Request payload for `PUT /events/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_from_previous: Option<String>,
}

impl From<&Event> for EventUpdate {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            note: event.note.clone(),
            date: event.date,
            location: event.location.clone(),
            transition_from_previous: event.transition_from_previous.clone(),
        }
    }
}

impl Location {
    pub fn display(&self) -> String {
        match &self.address {
            Some(address) => address.clone(),
            None => format!("{:.5}, {:.5}", self.latitude, self.longitude),
        }
    }
}
