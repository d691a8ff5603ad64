//! The fixed set of conferences tracked by the database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A top-tier security conference.
///
/// Declaration order is the curatorial priority used for ranking search
/// results: NDSS first, CCS last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conference {
    #[serde(rename = "NDSS")]
    Ndss,
    #[serde(rename = "IEEE S&P")]
    SecurityPrivacy,
    #[serde(rename = "USENIX")]
    Usenix,
    #[serde(rename = "CCS")]
    Ccs,
}

impl Conference {
    /// All conferences in priority order.
    pub const ALL: [Conference; 4] = [
        Conference::Ndss,
        Conference::SecurityPrivacy,
        Conference::Usenix,
        Conference::Ccs,
    ];

    /// Display name, also the value persisted in the database.
    pub fn name(self) -> &'static str {
        match self {
            Conference::Ndss => "NDSS",
            Conference::SecurityPrivacy => "IEEE S&P",
            Conference::Usenix => "USENIX",
            Conference::Ccs => "CCS",
        }
    }

    /// Key used by dblp in its `db/conf/{key}/{key}{year}.html` paths.
    pub fn dblp_key(self) -> &'static str {
        match self {
            Conference::Ndss => "ndss",
            Conference::SecurityPrivacy => "sp",
            Conference::Usenix => "uss",
            Conference::Ccs => "ccs",
        }
    }

    /// Zero-based position in the priority order.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Whether the publisher is known to publish no abstracts for `year`.
    ///
    /// Extraction is never attempted for these units.
    pub fn lacks_abstracts(self, year: i32) -> bool {
        matches!((self, year), (Conference::Ndss, 2016) | (Conference::Ndss, 2018))
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Conference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Conference::ALL
            .into_iter()
            .find(|conf| conf.name() == s)
            .ok_or_else(|| AppError::UnknownConference(s.to_string()))
    }
}
