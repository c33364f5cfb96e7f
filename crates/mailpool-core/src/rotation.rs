use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Status;

// ---------------------------------------------------------------------------
// BucketKey / Bucket
// ---------------------------------------------------------------------------

/// Rotation bucket identity: one per customer group, plus a catch-all for
/// ungrouped accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    Group(String),
    Shared,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Group(name) => f.write_str(name),
            BucketKey::Shared => f.write_str("(shared)"),
        }
    }
}

/// One account as the allocator sees it: identity plus the two inputs the
/// selection order depends on.
#[derive(Debug, Clone)]
pub struct BucketAccount {
    pub id: String,
    pub effective: Option<Status>,
    pub health_score: u8,
}

#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub accounts: Vec<BucketAccount>,
    /// Whether any campaign is currently running for this bucket's group.
    /// The shared bucket is always considered active.
    pub has_active_campaigns: bool,
}

// ---------------------------------------------------------------------------
// RotationPlan
// ---------------------------------------------------------------------------

/// Output of rotation planning: account id to forced target status. The
/// decision engine treats these as hints, never as overrides of health or
/// age gates.
#[derive(Debug, Clone, Default)]
pub struct RotationPlan {
    forced: HashMap<String, Status>,
}

impl RotationPlan {
    pub fn forced(&self, account_id: &str) -> Option<Status> {
        self.forced.get(account_id).copied()
    }

    pub fn len(&self) -> usize {
        self.forced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forced.is_empty()
    }

    fn force(&mut self, account_id: &str, target: Status) {
        self.forced.insert(account_id.to_string(), target);
    }
}

// ---------------------------------------------------------------------------
// plan_rotation
// ---------------------------------------------------------------------------

/// Rebalance each bucket toward `bench_percent` of its rotation-eligible
/// accounts resting. Greedy and score-ordered per bucket: the weakest
/// senders go to the bench, the healthiest rested accounts come back. Both
/// sorts are stable, so equal scores keep their input order and the same
/// inputs always select the same accounts.
///
/// Only accounts whose effective status is `Sending` or `Benched`
/// participate. Warming and sick accounts are on their own tracks and are
/// never shuffled by rotation.
pub fn plan_rotation(buckets: &BTreeMap<BucketKey, Bucket>, bench_percent: u8) -> RotationPlan {
    let mut plan = RotationPlan::default();
    if bench_percent == 0 {
        return plan;
    }

    for (key, bucket) in buckets {
        let mut sending: Vec<&BucketAccount> = Vec::new();
        let mut benched: Vec<&BucketAccount> = Vec::new();
        for account in &bucket.accounts {
            match account.effective {
                Some(Status::Sending) => sending.push(account),
                Some(Status::Benched) => benched.push(account),
                _ => {}
            }
        }

        let total = sending.len() + benched.len();
        if total == 0 {
            continue;
        }

        // A named group with nothing to send for must not hold active
        // slots: bench it wholesale until a campaign comes back.
        let idle_group = matches!(key, BucketKey::Group(_)) && !bucket.has_active_campaigns;
        let target_bench = if idle_group {
            total
        } else {
            total * usize::from(bench_percent) / 100
        };

        debug!(
            bucket = %key,
            sending = sending.len(),
            benched = benched.len(),
            target_bench,
            idle_group,
            "rotation bucket"
        );

        if benched.len() < target_bench {
            let deficit = target_bench - benched.len();
            sending.sort_by_key(|a| a.health_score);
            for account in sending.iter().take(deficit) {
                plan.force(&account.id, Status::Benched);
            }
        } else if benched.len() > target_bench {
            let surplus = benched.len() - target_bench;
            benched.sort_by_key(|a| Reverse(a.health_score));
            for account in benched.iter().take(surplus) {
                plan.force(&account.id, Status::Sending);
            }
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
