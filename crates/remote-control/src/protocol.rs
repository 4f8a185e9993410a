//! The UDP wire protocol.
//!
//! Three datagram shapes are accepted, all JSON:
//! - `{"type": "GET_GROUPS"}` — metadata request; answered with a
//!   [`GroupsReply`] to the sender's address
//! - `{"x": 0.5, "y": -0.2}` — legacy single vector for whichever group
//!   is active on each object
//! - `{"Face_Mouth": {"x": 0.5, "y": -0.2}, ...}` — vectors addressed by
//!   group UID
//!
//! Anything else — broken JSON, non-object payloads, maps without a
//! single usable vector — decodes to `None` and is dropped without
//! terminating the listener.

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rigpad_rig_model::Vec2;

/// One decoded datagram, queued for the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteMessage {
    /// `GET_GROUPS` marker carrying the reply address.
    GroupsRequest { reply_to: SocketAddr },

    /// Legacy vector for each object's active group.
    ActiveVector(Vec2),

    /// Vectors addressed by group UID.
    GroupVectors(HashMap<String, Vec2>),
}

/// Reply to a `GET_GROUPS` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsReply {
    #[serde(rename = "type")]
    pub kind: String,
    pub groups: Vec<String>,
}

impl GroupsReply {
    pub fn new(groups: Vec<String>) -> Self {
        Self {
            kind: "GROUPS".to_string(),
            groups,
        }
    }
}

/// Decode one datagram. `None` means the payload is dropped.
pub fn decode(payload: &[u8], from: SocketAddr) -> Option<RemoteMessage> {
    let value: Value = serde_json::from_slice(payload).ok()?;
    let object = value.as_object()?;

    if object.get("type").and_then(Value::as_str) == Some("GET_GROUPS") {
        return Some(RemoteMessage::GroupsRequest { reply_to: from });
    }

    if let Some(vector) = vector_of(&value) {
        return Some(RemoteMessage::ActiveVector(vector));
    }

    let vectors: HashMap<String, Vec2> = object
        .iter()
        .filter_map(|(uid, entry)| vector_of(entry).map(|v| (uid.clone(), v)))
        .collect();
    if vectors.is_empty() {
        None
    } else {
        Some(RemoteMessage::GroupVectors(vectors))
    }
}

fn vector_of(value: &Value) -> Option<Vec2> {
    let x = value.get("x")?.as_f64()?;
    let y = value.get("y")?.as_f64()?;
    Some(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_decode_groups_request() {
        let message = decode(br#"{"type": "GET_GROUPS"}"#, addr());
        assert_eq!(
            message,
            Some(RemoteMessage::GroupsRequest { reply_to: addr() })
        );
    }

    #[test]
    fn test_decode_legacy_vector() {
        let message = decode(br#"{"x": 0.5, "y": -0.25}"#, addr());
        assert_eq!(
            message,
            Some(RemoteMessage::ActiveVector(Vec2::new(0.5, -0.25)))
        );
    }

    #[test]
    fn test_decode_group_vector_map_skips_bad_entries() {
        let message = decode(
            br#"{"Face_Mouth": {"x": 1, "y": 0}, "Face_Brows": {"x": "nope"}, "note": 3}"#,
            addr(),
        );
        let Some(RemoteMessage::GroupVectors(vectors)) = message else {
            panic!("expected group vectors, got {message:?}");
        };
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors["Face_Mouth"], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_malformed_payloads_drop_silently() {
        assert_eq!(decode(b"not json", addr()), None);
        assert_eq!(decode(b"[1, 2, 3]", addr()), None);
        assert_eq!(decode(br#"{"x": 0.5}"#, addr()), None);
        assert_eq!(decode(br#"{"a": {"y": 1.0}}"#, addr()), None);
        assert_eq!(decode(b"", addr()), None);
    }

    #[test]
    fn test_groups_reply_wire_shape() {
        let reply = GroupsReply::new(vec!["Face_Mouth".to_string()]);
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"type":"GROUPS","groups":["Face_Mouth"]}"#);
    }
}
