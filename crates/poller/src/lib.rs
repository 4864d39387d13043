//! The ReviewBot poll loop: formats homework records into notification
//! messages and drives the fetch → validate → format → notify cycle.

pub mod format;
pub mod watcher;
