//! Social target fan-out and scheduling.
//!
//! Takes one content item and a list of (provider, account, destination)
//! targets, gates the batch on account health, creates one tracking row per
//! target, and hands the batch to the external automation endpoint that
//! performs the actual publishing. The automation system advances row
//! statuses asynchronously; this crate never talks to a social platform
//! directly.

#![warn(missing_docs)]

mod error;
mod request;
mod scheduler;

pub use error::{PublishError, PublishErrorKind};
pub use request::{PublishMode, ScheduleRequest};
pub use scheduler::PostScheduler;
