//! Session kinds within a race weekend

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TrackError;

/// Weekend segment a session was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionKind {
    #[serde(alias = "FP1")]
    Practice1,
    #[serde(alias = "FP2")]
    Practice2,
    #[serde(alias = "FP3")]
    Practice3,
    #[serde(alias = "Q")]
    Qualifying,
    /// Race is the canonical source of the track shape
    #[default]
    #[serde(alias = "R")]
    Race,
}

impl SessionKind {
    /// All kinds in weekend order
    pub const ALL: [SessionKind; 5] = [
        SessionKind::Practice1,
        SessionKind::Practice2,
        SessionKind::Practice3,
        SessionKind::Qualifying,
        SessionKind::Race,
    ];

    /// Short code used in archive file names and on the command line
    pub fn code(self) -> &'static str {
        match self {
            SessionKind::Practice1 => "FP1",
            SessionKind::Practice2 => "FP2",
            SessionKind::Practice3 => "FP3",
            SessionKind::Qualifying => "Q",
            SessionKind::Race => "R",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionKind {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| !c.is_whitespace() && *c != '_').collect::<String>().to_ascii_uppercase();
        match normalized.as_str() {
            "FP1" | "P1" | "PRACTICE1" => Ok(SessionKind::Practice1),
            "FP2" | "P2" | "PRACTICE2" => Ok(SessionKind::Practice2),
            "FP3" | "P3" | "PRACTICE3" => Ok(SessionKind::Practice3),
            "Q" | "QUALI" | "QUALIFYING" => Ok(SessionKind::Qualifying),
            "R" | "RACE" => Ok(SessionKind::Race),
            _ => Err(TrackError::invalid_request(format!("unknown session kind '{}'", s))),
        }
    }
}
