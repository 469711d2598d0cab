use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Event, ResourceId};
use crate::codec::iso8601;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: ResourceId,
    pub name: String,
    #[serde(with = "iso8601")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Request payload for `POST /trips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCreate {
    pub name: String,
    #[serde(with = "iso8601")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub end_date: DateTime<Utc>,
}

/// Request payload for `PUT /trips/{id}`. The id travels in the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripUpdate {
    pub name: String,
    #[serde(with = "iso8601")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub end_date: DateTime<Utc>,
}

impl Trip {
    /// Number of whole days the trip spans, counting both ends
    pub fn duration_days(&self) -> i64 {
        (self.end_date.date_naive() - self.start_date.date_naive()).num_days() + 1
    }

    pub fn formatted_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%b %d, %Y"),
            self.end_date.format("%b %d, %Y")
        )
    }
}

impl From<&Trip> for TripUpdate {
    fn from(trip: &Trip) -> Self {
        Self {
            name: trip.name.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
        }
    }
}
