use serde::{Deserialize, Serialize};

use crate::types::{distinct_statuses, Status};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Resolved status, or None when the account carries no status label.
    pub effective: Option<Status>,
    /// True when more than one distinct status was labeled. The resolved
    /// status is a repair target, not trusted history.
    pub conflict: bool,
}

impl Classification {
    pub fn none() -> Self {
        Classification {
            effective: None,
            conflict: false,
        }
    }
}

/// Resolve an account's labeled statuses into one effective status.
///
/// Registries accumulate contradictory labels over time (partial runs, manual
/// edits, scheme migrations). Resolution is deterministic and needs no
/// transition history:
///
/// - no status label present: no effective status
/// - exactly one distinct status: that status, no conflict
/// - several distinct statuses: conflict. A hand-applied `Dead` label wins
///   outright. When `Sick` and `Benched` are both present the health score is
///   ground truth: below the floor the account is sick, at or above it the
///   account is resting. Any other mix resolves to the highest escalation.
///
/// Picking the "worse" status for an ambiguous account is policy: a wrongly
/// rested account costs a cycle, a wrongly sending one burns reputation.
pub fn classify(labels: &[String], health_score: u8, warmup_floor: u8) -> Classification {
    let found = distinct_statuses(labels);
    match found.as_slice() {
        [] => Classification::none(),
        [only] => Classification {
            effective: Some(*only),
            conflict: false,
        },
        many => {
            let sick_vs_benched = many.contains(&Status::Sick)
                && many.contains(&Status::Benched)
                && !many.contains(&Status::Dead);
            let effective = if sick_vs_benched {
                if health_score < warmup_floor {
                    Status::Sick
                } else {
                    Status::Benched
                }
            } else {
                // distinct_statuses sorts by escalation, so the last entry
                // is the highest.
                many[many.len() - 1]
            };
            Classification {
                effective: Some(effective),
                conflict: true,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_status_labels() {
        let c = classify(&labels(&["acme-corp"]), 80, 70);
        assert_eq!(c.effective, None);
        assert!(!c.conflict);
    }

    #[test]
    fn single_status() {
        let c = classify(&labels(&["Active", "acme-corp"]), 80, 70);
        assert_eq!(c.effective, Some(Status::Sending));
        assert!(!c.conflict);
    }

    #[test]
    fn two_spellings_of_one_status_is_not_a_conflict() {
        let c = classify(&labels(&["Active", "status-active"]), 80, 70);
        assert_eq!(c.effective, Some(Status::Sending));
        assert!(!c.conflict);
    }

    #[test]
    fn sick_and_benched_below_floor_resolves_sick() {
        let c = classify(&labels(&["Sick", "Benched"]), 40, 70);
        assert_eq!(c.effective, Some(Status::Sick));
        assert!(c.conflict);
    }

    #[test]
    fn sick_and_benched_at_floor_resolves_benched() {
        let c = classify(&labels(&["Sick", "Benched"]), 70, 70);
        assert_eq!(c.effective, Some(Status::Benched));
        assert!(c.conflict);
    }

    #[test]
    fn triple_conflict_uses_health_tiebreak() {
        // A healthy account tagged Sick, Benched and Active at once reads as
        // resting, not sick.
        let c = classify(&labels(&["Sick", "Benched", "Active"]), 95, 70);
        assert_eq!(c.effective, Some(Status::Benched));
        assert!(c.conflict);
    }

    #[test]
    fn warming_outranks_sending() {
        let c = classify(&labels(&["Warming", "Active"]), 99, 70);
        assert_eq!(c.effective, Some(Status::Warming));
        assert!(c.conflict);
    }

    #[test]
    fn sick_outranks_warming() {
        let c = classify(&labels(&["status-warming", "Sick"]), 99, 70);
        assert_eq!(c.effective, Some(Status::Sick));
        assert!(c.conflict);
    }

    #[test]
    fn benched_outranks_sending() {
        let c = classify(&labels(&["Benched", "Active"]), 99, 70);
        assert_eq!(c.effective, Some(Status::Benched));
        assert!(c.conflict);
    }

    #[test]
    fn dead_wins_over_health_tiebreak() {
        let c = classify(&labels(&["Sick", "Benched", "Dead"]), 99, 70);
        assert_eq!(c.effective, Some(Status::Dead));
        assert!(c.conflict);
    }

    #[test]
    fn label_order_does_not_matter() {
        let a = classify(&labels(&["Sick", "Benched", "Active"]), 95, 70);
        let b = classify(&labels(&["Active", "Sick", "Benched"]), 95, 70);
        let c = classify(&labels(&["Benched", "Active", "Sick"]), 95, 70);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn mixed_schemes_conflict_across_statuses() {
        let c = classify(&labels(&["status-sick", "Active"]), 80, 70);
        assert_eq!(c.effective, Some(Status::Sick));
        assert!(c.conflict);
    }
}
