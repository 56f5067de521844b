//! Session Status Value Object
//!
//! ```text
//! pending ──► accepted ──► completed
//!    │
//!    └──────► rejected
//! ```
//!
//! `completed` and `rejected` are terminal.

use serde::Serialize;
use std::fmt;

/// Learning session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum SessionStatus {
    /// Requested by the learner, waiting for the teacher
    #[default]
    Pending = 0,

    /// Teacher agreed to teach
    Accepted = 1,

    /// Session took place; credits have moved
    Completed = 2,

    /// Teacher declined
    Rejected = 3,
}

impl SessionStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Get string code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Check if this is a terminal state (cannot transition out)
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Edges of the state machine
    #[inline]
    pub const fn can_transition_to(&self, target: SessionStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Rejected)
                | (Self::Accepted, Self::Completed)
        )
    }

    /// Transitions only the teacher may perform
    #[inline]
    pub const fn is_teacher_decision(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Create from numeric ID
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Accepted),
            2 => Some(Self::Completed),
            3 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Create from string code
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionStatus; 4] = [
        SessionStatus::Pending,
        SessionStatus::Accepted,
        SessionStatus::Completed,
        SessionStatus::Rejected,
    ];

    #[test]
    fn test_transition_table() {
        use SessionStatus::*;

        let allowed = [(Pending, Accepted), (Pending, Rejected), (Accepted, Completed)];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn test_id_and_code_roundtrip() {
        for status in ALL {
            assert_eq!(SessionStatus::from_id(status.id()), Some(status));
            assert_eq!(SessionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SessionStatus::from_code(" Accepted "), Some(SessionStatus::Accepted));
        assert_eq!(SessionStatus::from_code("done"), None);
        assert_eq!(SessionStatus::from_id(9), None);
    }
}
