use super::time::envelope_timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Envelope handling errors
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The raw bytes were not a valid JSON envelope
    #[error("envelope is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// Well-known envelope types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Hair volume reading
    VolumeReading,
    /// Hair type reading
    TypeReading,
}

impl EventKind {
    /// Wire representation of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::VolumeReading => "volume_reading",
            EventKind::TypeReading => "type_reading",
        }
    }

    /// Parses a wire `type` value, returning `None` for unknown kinds
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "volume_reading" => Some(EventKind::VolumeReading),
            "type_reading" => Some(EventKind::TypeReading),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(w, "{}", self.as_str())
    }
}

/// On-wire unit carried by the broker topic
///
/// The `type` field is kept as a raw string so that envelopes with an unknown type survive
/// decoding and can be skipped by the consumer instead of tearing down the whole stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Raw wire `type` value
    #[serde(rename = "type")]
    pub kind: String,
    /// UTC production time in the envelope time format
    pub datetime: String,
    /// Record carried by this envelope
    pub payload: Value,
}

impl Envelope {
    /// Wraps a record into an envelope stamped with the current UTC time
    pub fn new<P: Serialize>(kind: EventKind, payload: &P) -> Result<Self, EnvelopeError> {
        Ok(Self {
            kind: kind.as_str().to_owned(),
            datetime: envelope_timestamp(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Well-known kind of this envelope, `None` if the wire value is unknown
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.kind)
    }

    /// Serializes the envelope into its UTF-8 JSON wire form
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserializes an envelope from its wire form
    pub fn decode(raw: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Deserializes the payload into a concrete record type
    pub fn decode_payload<P: DeserializeOwned>(&self) -> Result<P, EnvelopeError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_through_wire_form() {
        let envelope = Envelope::new(EventKind::VolumeReading, &json!({ "hair_volume": 12.5 })).unwrap();
        let decoded = Envelope::decode(&envelope.encode().unwrap()).unwrap();

        assert_eq!(decoded, envelope);
        assert_eq!(decoded.kind(), Some(EventKind::VolumeReading));
    }

    #[test]
    fn unknown_type_survives_decoding() {
        let raw = br#"{ "type": "humidity_reading", "datetime": "2024-03-01T10:20:30", "payload": {} }"#;
        let decoded = Envelope::decode(raw).unwrap();

        assert_eq!(decoded.kind(), None);
        assert_eq!(decoded.kind, "humidity_reading");
    }

    #[test]
    fn rejects_non_json_bytes() {
        assert!(Envelope::decode(b"\xff\xfe not json").is_err());
    }
}
