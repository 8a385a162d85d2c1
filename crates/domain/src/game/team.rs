use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two sides of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    /// Returns the other team.
    pub fn opponent(&self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Lowercase name, as stored in the `winner` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Red => "red",
        }
    }

    pub(crate) fn members_key(&self) -> &'static str {
        match self {
            Team::Blue => "teamBlueMembers",
            Team::Red => "teamRedMembers",
        }
    }

    pub(crate) fn points_key(&self) -> &'static str {
        match self {
            Team::Blue => "pointsTeamBlue",
            Team::Red => "pointsTeamRed",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown team name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown team: {0} (expected blue or red)")]
pub struct ParseTeamError(pub String);

impl FromStr for Team {
    type Err = ParseTeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(Team::Blue),
            "red" => Ok(Team::Red),
            _ => Err(ParseTeamError(s.to_string())),
        }
    }
}
