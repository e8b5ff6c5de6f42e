//! Automation webhook client.
//!
//! The publishing pipeline and the approval workflow do not talk to social
//! platforms themselves; they notify an external automation endpoint which
//! performs the actual network calls and later writes statuses back. This
//! crate owns the payload shapes, the notifier seam, and the `reqwest`
//! implementation.
//!
//! Dispatch is single-attempt. Callers decide what a failure means: the
//! fan-out component compensates by failing its rows, the approval workflow
//! logs and moves on.

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod payload;

pub use client::{AutomationClient, AutomationNotifier};
pub use config::{WebhookConfig, WebhookConfigBuilder};
pub use error::{WebhookError, WebhookErrorKind};
pub use payload::{AutomationEvent, DispatchTarget, PublishDispatch, TeamEvent};
