//! Shared primitive types used across every ingestion source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar year as reported by upstream sources.
pub type Year = i32;

/// Calendar month. 1..=12 for monthly facts, 0 for annual totals.
pub type Month = u32;

/// Travel direction flag used by the tourism statistics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    /// `D`: Korean citizens departing abroad.
    #[default]
    #[serde(rename = "D")]
    Outbound,
    /// `E`: foreign visitors entering Korea.
    #[serde(rename = "E")]
    Inbound,
}

impl Direction {
    pub fn code(self) -> &'static str {
        match self {
            Direction::Outbound => "D",
            Direction::Inbound  => "E",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Direction::Outbound),
            "E" => Ok(Direction::Inbound),
            other => Err(format!("unknown direction flag '{other}' (expected D or E)")),
        }
    }
}

/// Which upstream feed a sync run pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    CyberScam,
    VoicePhishing,
    TravelApi,
    TravelCsv,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::CyberScam     => "cyber_scam",
            Source::VoicePhishing => "voice_phishing",
            Source::TravelApi     => "travel_api",
            Source::TravelCsv     => "travel_csv",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
