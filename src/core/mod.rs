//! # Core runtime of a topic.
//!
//! - [`Topic`] public handle: publish, subscribe, unsubscribe, close
//! - `control` single task owning the subscriber set and doing the fan-out
//! - `registry` side-table of forwarder tasks, joined on close
//!
//! ```text
//! Topic (clones) ──► control queue ──┐
//!                ──► publish queue ──┴──► ControlLoop ──► subscribers
//!                                              │
//!                                              └──(close)──► Registry::drain_and_join
//! ```

mod control;
mod registry;
mod topic;

pub use topic::Topic;
