//! OAuth token acquisition and publish-target discovery.
//!
//! Completes the provider redirect: validates the signed `state` parameter
//! (single-use, HMAC-signed), exchanges the authorization code for a
//! long-lived token with short-lived fallback, discovers the pages and
//! linked Instagram business accounts reachable by the token, and upserts
//! one social account and publish target per discovery. Re-running the
//! flow is idempotent per discovered account.

#![warn(missing_docs)]

mod callback;
mod client;
mod error;
mod graph;
mod state;

pub use callback::{ConnectedTarget, OauthCallback, OauthOutcome, completion_redirect};
pub use client::{GraphConfig, GraphConfigBuilder, MetaGraphClient};
pub use error::{OauthError, OauthErrorKind};
pub use graph::{GraphToken, InstagramAccount, MetaGraph, PageInfo};
pub use state::{IssuedState, StateCodec, VerifiedState};
