//! Internal transfer workflow types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One transferred line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItem {
    pub product_id: Uuid,
    pub qty: i64,
}

/// Transfer lifecycle: `draft → pending → completed | canceled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Draft,
    Pending,
    Completed,
    Canceled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Draft => "draft",
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Canceled => "canceled",
        }
    }

    /// The stock move only fires from `pending`
    pub fn can_complete(&self) -> bool {
        *self == TransferStatus::Pending
    }

    pub fn can_update(&self) -> bool {
        !matches!(self, TransferStatus::Completed | TransferStatus::Canceled)
    }

    pub fn can_delete(&self) -> bool {
        *self != TransferStatus::Completed
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TransferStatus::Draft),
            "pending" => Ok(TransferStatus::Pending),
            "completed" => Ok(TransferStatus::Completed),
            "canceled" => Ok(TransferStatus::Canceled),
            other => Err(format!("unknown transfer status: {other}")),
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_completes() {
        assert!(TransferStatus::Pending.can_complete());
        assert!(!TransferStatus::Draft.can_complete());
        assert!(!TransferStatus::Completed.can_complete());
        assert!(!TransferStatus::Canceled.can_complete());
    }

    #[test]
    fn terminal_states_block_updates() {
        assert!(!TransferStatus::Completed.can_update());
        assert!(!TransferStatus::Canceled.can_update());
        assert!(TransferStatus::Pending.can_update());
    }
}
