//! # Last-value cache on top of a topic.
//!
//! [`EventSource`] couples a [`Topic`](crate::Topic) with a snapshot of the
//! most recent value. Writers update the snapshot and publish in one call;
//! readers either [`load`](EventSource::load) the snapshot or subscribe to changes.

mod event_source;

pub use event_source::{EventSource, StoreMode};
