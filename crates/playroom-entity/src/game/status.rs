//! Game request status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a game invitation.
///
/// `Pending` is the only non-terminal state; an invitation transitions to
/// exactly one of the terminal states and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum GameRequestStatus {
    /// Waiting for the challenged user to respond.
    Pending,
    /// The challenged user accepted; a game session was created.
    Accepted,
    /// The challenged user declined.
    Declined,
    /// The invitation timed out without a response.
    Expired,
}

impl GameRequestStatus {
    /// Check whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for GameRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GameRequestStatus {
    type Err = playroom_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "DECLINED" => Ok(Self::Declined),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(playroom_core::AppError::validation(format!(
                "Invalid game request status: '{s}'. Expected one of: PENDING, ACCEPTED, DECLINED, EXPIRED"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!GameRequestStatus::Pending.is_terminal());
        assert!(GameRequestStatus::Accepted.is_terminal());
        assert!(GameRequestStatus::Declined.is_terminal());
        assert!(GameRequestStatus::Expired.is_terminal());
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in [
            GameRequestStatus::Pending,
            GameRequestStatus::Accepted,
            GameRequestStatus::Declined,
            GameRequestStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<GameRequestStatus>().unwrap(), status);
        }
        assert!("CANCELLED".parse::<GameRequestStatus>().is_err());
    }
}
