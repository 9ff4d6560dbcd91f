//! Transfer modes.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// What a paste does with its sources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransferMode {
    /// Sources stay in place; the destination receives a clone.
    Copy,
    /// Sources are relocated to the destination.
    Move,
}

impl TransferMode {
    /// Past-tense verb for summaries ("Copied", "Moved").
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Copy => "Copied",
            Self::Move => "Moved",
        }
    }
}
