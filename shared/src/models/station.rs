//! Preparation station

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preparation destination (出品站点)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Station {
    Kitchen,
    Bar,
}

impl Station {
    pub const ALL: [Station; 2] = [Station::Kitchen, Station::Bar];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Station::Kitchen => "KITCHEN",
            Station::Bar => "BAR",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a station name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown station: {0}")]
pub struct UnknownStation(pub String);

impl FromStr for Station {
    type Err = UnknownStation;

    /// Case-insensitive (`kitchen`, `KITCHEN`, `Bar` ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("kitchen") {
            Ok(Station::Kitchen)
        } else if s.eq_ignore_ascii_case("bar") {
            Ok(Station::Bar)
        } else {
            Err(UnknownStation(s.to_string()))
        }
    }
}
