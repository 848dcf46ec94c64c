//! Stock ledger types
//!
//! Every quantity change flows through the ledger: one signed entry per
//! mutation, carrying the resulting balance snapshot and the full
//! (product, warehouse, location) key it applied to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of document that produced a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Receipt,
    Delivery,
    Transfer,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Receipt => "receipt",
            TransactionType::Delivery => "delivery",
            TransactionType::Transfer => "transfer",
            TransactionType::Adjustment => "adjustment",
        }
    }

    pub const ALL: [TransactionType; 4] = [
        TransactionType::Receipt,
        TransactionType::Delivery,
        TransactionType::Transfer,
        TransactionType::Adjustment,
    ];
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt" => Ok(TransactionType::Receipt),
            "delivery" => Ok(TransactionType::Delivery),
            "transfer" => Ok(TransactionType::Transfer),
            "adjustment" => Ok(TransactionType::Adjustment),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_parse_back() {
        for kind in TransactionType::ALL {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!("return".parse::<TransactionType>().is_err());
    }
}
