use serde::{Deserialize, Serialize};

use super::ResourceId;
use crate::codec::base64_bytes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Request payload for `POST /media`: raw bytes attached to an event.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCreate {
    pub event_id: ResourceId,
    #[serde(with = "base64_bytes")]
    pub base64_data: Vec<u8>,
}

impl std::fmt::Debug for MediaCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCreate")
            .field("event_id", &self.event_id)
            .field("base64_data", &format_args!("<{} bytes>", self.base64_data.len()))
            .finish()
    }
}
