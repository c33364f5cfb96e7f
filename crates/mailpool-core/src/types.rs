use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a mailbox account.
///
/// Declaration order is escalation priority: when an account carries labels
/// for more than one status, the highest variant wins conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Sending,
    Benched,
    Warming,
    Sick,
    /// Terminal state. Never assigned by the engine; only honored when an
    /// operator has applied the label by hand.
    Dead,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::Sending,
            Status::Benched,
            Status::Warming,
            Status::Sick,
            Status::Dead,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Sending => "sending",
            Status::Benched => "benched",
            Status::Warming => "warming",
            Status::Sick => "sick",
            Status::Dead => "dead",
        }
    }

    /// Registry label in the current scheme. "Active" is the historical
    /// spelling for the sending state and is kept for registry compatibility.
    pub fn label(self) -> &'static str {
        match self {
            Status::Sending => "Active",
            Status::Benched => "Benched",
            Status::Warming => "Warming",
            Status::Sick => "Sick",
            Status::Dead => "Dead",
        }
    }

    /// Registry label in the retired prefix scheme.
    pub fn legacy_label(self) -> &'static str {
        match self {
            Status::Sending => "status-active",
            Status::Benched => "status-benched",
            Status::Warming => "status-warming",
            Status::Sick => "status-sick",
            Status::Dead => "status-dead",
        }
    }

    /// Maps a registry label to a status, accepting both the current and the
    /// retired label scheme. Non-status labels (customer groups, ad-hoc tags)
    /// return None.
    pub fn from_label(label: &str) -> Option<Status> {
        Status::all()
            .iter()
            .find(|s| s.label() == label || s.legacy_label() == label)
            .copied()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sending" => Ok(Status::Sending),
            "benched" => Ok(Status::Benched),
            "warming" => Ok(Status::Warming),
            "sick" => Ok(Status::Sick),
            "dead" => Ok(Status::Dead),
            _ => Err(crate::error::PoolError::UnknownStatus(s.to_string())),
        }
    }
}

/// Distinct statuses present in a resolved label set, in escalation order.
/// Two spellings of the same status count once.
pub fn distinct_statuses(labels: &[String]) -> Vec<Status> {
    let mut found: Vec<Status> = Vec::new();
    for label in labels {
        if let Some(status) = Status::from_label(label) {
            if !found.contains(&status) {
                found.push(status);
            }
        }
    }
    found.sort();
    found
}

// ---------------------------------------------------------------------------
// MembershipChange
// ---------------------------------------------------------------------------

/// Campaign membership side of a decision: enroll the account into its
/// group's campaigns or pull it out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    Add,
    Remove,
}

impl fmt::Display for MembershipChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipChange::Add => "add",
            MembershipChange::Remove => "remove",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
