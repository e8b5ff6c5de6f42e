//! Social platform providers.

use serde::{Deserialize, Serialize};

/// A social platform a post can be published to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// Facebook pages.
    Facebook,
    /// Instagram business accounts linked to a Facebook page.
    Instagram,
}
