//! Warehouse and location types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Postal address of a warehouse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// Physical kind of a storage location inside a warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Rack,
    Shelf,
    Zone,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Rack => "rack",
            LocationType::Shelf => "shelf",
            LocationType::Zone => "zone",
        }
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rack" => Ok(LocationType::Rack),
            "shelf" => Ok(LocationType::Shelf),
            "zone" => Ok(LocationType::Zone),
            other => Err(format!("unknown location type: {other}")),
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
