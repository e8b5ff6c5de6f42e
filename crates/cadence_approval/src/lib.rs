//! Approval workflow state machine.
//!
//! Tracks a tri-state review workflow (pending, approved, rejected) for
//! content entities. Requests are gated on plan tier and reviewer
//! availability; decisions are pending-only, so a decided record can never
//! be re-decided.

#![warn(missing_docs)]

mod error;
mod flow;

pub use error::{ApprovalError, ApprovalErrorKind};
pub use flow::ApprovalFlow;
