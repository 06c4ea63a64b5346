//! Well-known default values shared between services

/// Default HTTP port of the receiver service
pub const PORT_RECEIVER: &str = "8080";
/// Default HTTP port of the storage service
pub const PORT_STORAGE: &str = "8090";

/// Default broker bootstrap endpoint
pub const DEFAULT_BROKER: &str = "localhost:9092";
/// Default topic carrying reading envelopes
pub const DEFAULT_TOPIC: &str = "readings";
/// Default consumer group used by the storage service
pub const DEFAULT_CONSUMER_GROUP: &str = "event_group";

/// Format of the `datetime` field on event envelopes (UTC)
pub const ENVELOPE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Format of the timestamp fields carried inside reading payloads
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
