//! Drag/drop protocol adapter.
//!
//! Translates a drag gesture between two containers into a move request for
//! the state engine. The payload travels through a [`DragChannel`] (the
//! DataTransfer analog) tagged with a private content type so unrelated
//! drag data on the same channel is never misread. Malformed or foreign
//! payloads parse to `None` and cause no state mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::models::{MoveRequest, Slot};

/// Private content-type identifier for trip-activity payloads.
pub const DND_MIME: &str = "application/vnd-wanderplan.activity+json";

/// Secondary plain-text entry carrying a human-readable preview.
pub const TEXT_PLAIN: &str = "text/plain";

/// Where a drag started: the unassigned pool or a specific day. Serialized
/// on the wire as `"pool"` or `"day:<dayId>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DragSource {
    Pool,
    Day(String),
}

impl DragSource {
    pub fn container_id(&self) -> Option<&str> {
        match self {
            DragSource::Pool => None,
            DragSource::Day(id) => Some(id),
        }
    }

    pub fn to_slot(&self, index: usize) -> Slot {
        Slot {
            day_id: self.container_id().map(str::to_string),
            index,
        }
    }
}

impl From<DragSource> for String {
    fn from(source: DragSource) -> String {
        match source {
            DragSource::Pool => "pool".to_string(),
            DragSource::Day(id) => format!("day:{id}"),
        }
    }
}

impl TryFrom<String> for DragSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "pool" {
            return Ok(DragSource::Pool);
        }
        match value.strip_prefix("day:") {
            Some(id) if !id.is_empty() => Ok(DragSource::Day(id.to_string())),
            _ => Err(format!("unknown drag source: {value}")),
        }
    }
}

/// The payload carried for the duration of a drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub activity_id: String,
    pub source: DragSource,
    pub index: usize,
}

/// A tagged content-type map standing in for the platform drag channel.
/// Sources write entries at drag start; drop targets look up only the types
/// they accept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragChannel {
    entries: HashMap<String, String>,
}

impl DragChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, content_type: &str, value: String) {
        self.entries.insert(content_type.to_string(), value);
    }

    pub fn get_data(&self, content_type: &str) -> Option<&str> {
        self.entries.get(content_type).map(String::as_str)
    }

    pub fn has(&self, content_type: &str) -> bool {
        self.entries.contains_key(content_type)
    }

    pub fn types(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// Serializes a payload for the drag channel.
pub fn build_drag_payload(payload: &DragPayload) -> String {
    serde_json::to_string(payload).unwrap_or_default()
}

/// Drag-start hook: writes the tagged payload plus a plain-text preview
/// into the channel.
pub fn start_drag(channel: &mut DragChannel, payload: &DragPayload, preview: &str) {
    channel.set_data(DND_MIME, build_drag_payload(payload));
    channel.set_data(TEXT_PLAIN, preview.to_string());
}

/// Drag-over hook: whether a drop target should accept this drag.
pub fn accepts(channel: &DragChannel) -> bool {
    channel.has(DND_MIME)
}

/// Reads the activity payload back out of the channel. Foreign channels
/// (no tagged entry) and malformed JSON both yield `None`.
pub fn read_drag_payload(channel: &DragChannel) -> Option<DragPayload> {
    let raw = channel.get_data(DND_MIME)?;
    serde_json::from_str(raw).ok()
}

/// Drop hook: parses the channel and derives the engine move request for a
/// drop on `target`. The destination index defaults to append-at-end, so
/// callers pass the target container's current length.
pub fn drop_request(
    channel: &DragChannel,
    target: &DragSource,
    target_len: usize,
) -> Option<MoveRequest> {
    let payload = read_drag_payload(channel)?;
    Some(MoveRequest {
        activity_id: payload.activity_id.clone(),
        from: payload.source.to_slot(payload.index),
        to: target.to_slot(target_len),
    })
}
