//! Redis Streams event bus.
//!
//! Every entry carries two fields: [`FIELD_KEY`], the partition key
//! (owner or material uuid), and [`FIELD_PAYLOAD`], the JSON body.

mod consumer;
mod publisher;

pub use consumer::{Delivery, StreamConsumer, StreamConsumerConfig, StreamHandler, StreamMessage};
pub use publisher::StreamPublisher;

/// Stream field holding the message key
pub const FIELD_KEY: &str = "key";
/// Stream field holding the JSON payload
pub const FIELD_PAYLOAD: &str = "payload";
