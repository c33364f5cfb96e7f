use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::account::Account;
use crate::classifier::{classify, Classification};
use crate::engine::{Decision, Engine};
use crate::rotation::{plan_rotation, Bucket, BucketAccount, BucketKey};

/// Evaluate a whole pool in one pass: classify every account, build the
/// rotation buckets, plan the rebalance, then run the engine per account
/// with its forced-status hint.
///
/// `active_groups` names the customer groups that currently have a campaign
/// running. Groups absent from the set are treated as idle and benched
/// wholesale by the allocator. Accounts are evaluated independently, so the
/// output order matches the input order.
pub fn evaluate_pool(
    accounts: &[Account],
    active_groups: &HashSet<String>,
    engine: &Engine,
    now: DateTime<Utc>,
) -> Vec<Decision> {
    let cfg = engine.config();

    let classifications: Vec<Classification> = accounts
        .iter()
        .map(|a| classify(&a.tags_resolved, a.health_score, cfg.warmup_threshold))
        .collect();

    let mut buckets: BTreeMap<BucketKey, Bucket> = BTreeMap::new();
    for (account, classification) in accounts.iter().zip(&classifications) {
        let key = if cfg.single_pool {
            BucketKey::Shared
        } else {
            match account.group_key() {
                Some(group) => BucketKey::Group(group.to_string()),
                None => BucketKey::Shared,
            }
        };
        let has_active = match &key {
            BucketKey::Group(name) => active_groups.contains(name.as_str()),
            BucketKey::Shared => true,
        };
        let bucket = buckets.entry(key).or_default();
        bucket.has_active_campaigns = has_active;
        bucket.accounts.push(BucketAccount {
            id: account.id.clone(),
            effective: classification.effective,
            health_score: account.health_score,
        });
    }

    let plan = plan_rotation(&buckets, cfg.bench_percent);

    let mut conflicts = 0usize;
    let mut decisions = Vec::new();
    for (account, classification) in accounts.iter().zip(&classifications) {
        if classification.conflict {
            conflicts += 1;
        }
        let forced = plan.forced(&account.id);
        if let Some(decision) = engine.evaluate_classified(account, *classification, forced, now) {
            decisions.push(decision);
        }
    }

    info!(
        accounts = accounts.len(),
        buckets = buckets.len(),
        conflicts,
        forced = plan.len(),
        decisions = decisions.len(),
        "pool evaluated"
    );
    decisions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::types::{MembershipChange, Status};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn account(id: &str, age_days: i64, score: u8, tags: &[&str]) -> Account {
        Account::new(
            id,
            format!("{id}@pool.test"),
            now() - Duration::days(age_days),
            score,
        )
        .with_tags(tags.iter().map(|s| s.to_string()).collect())
    }

    fn groups(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn by_id<'a>(decisions: &'a [Decision], id: &str) -> Option<&'a Decision> {
        decisions.iter().find(|d| d.account_id == id)
    }

    #[test]
    fn mixed_pool_end_to_end() {
        let accounts = vec![
            account("young", 3, 100, &[]),
            account("healthy", 60, 96, &["Active"]),
            account("weak", 60, 50, &["Active"]),
            account("torn", 60, 99, &["Warming", "Active"]),
        ];
        let engine = Engine::new(PoolConfig::default());
        let decisions = evaluate_pool(&accounts, &groups(&[]), &engine, now());

        assert_eq!(by_id(&decisions, "young").unwrap().new_status, Status::Warming);
        assert!(by_id(&decisions, "healthy").is_none());
        assert_eq!(by_id(&decisions, "weak").unwrap().new_status, Status::Sick);
        assert_eq!(by_id(&decisions, "torn").unwrap().new_status, Status::Warming);
        assert_eq!(decisions.len(), 3);
    }

    #[test]
    fn rotation_plan_flows_into_decisions() {
        let accounts = vec![
            account("a", 60, 71, &["Active"]),
            account("b", 60, 90, &["Active"]),
            account("c", 60, 72, &["Active"]),
            account("d", 60, 95, &["Active"]),
        ];
        let cfg = PoolConfig {
            bench_percent: 50,
            ..PoolConfig::default()
        };
        let engine = Engine::new(cfg);
        let decisions = evaluate_pool(&accounts, &groups(&[]), &engine, now());

        // Target 2 of 4 on the bench: the two weakest senders move.
        let benched: Vec<&str> = decisions
            .iter()
            .filter(|d| d.new_status == Status::Benched)
            .map(|d| d.account_id.as_str())
            .collect();
        assert_eq!(benched, vec!["a", "c"]);
        for d in &decisions {
            assert_eq!(d.campaigns, Some(MembershipChange::Remove));
        }
    }

    #[test]
    fn idle_group_is_benched_wholesale() {
        let accounts = vec![
            account("g1", 60, 96, &["Active", "acme-corp"]),
            account("g2", 60, 92, &["Active", "acme-corp"]),
        ];
        let cfg = PoolConfig {
            bench_percent: 10,
            ..PoolConfig::default()
        };
        let engine = Engine::new(cfg);
        let decisions = evaluate_pool(&accounts, &groups(&[]), &engine, now());
        assert_eq!(decisions.len(), 2);
        assert!(decisions.iter().all(|d| d.new_status == Status::Benched));
    }

    #[test]
    fn active_group_balances_normally() {
        let accounts = vec![
            account("g1", 60, 96, &["Active", "acme-corp"]),
            account("g2", 60, 92, &["Active", "acme-corp"]),
        ];
        let cfg = PoolConfig {
            bench_percent: 10,
            ..PoolConfig::default()
        };
        let engine = Engine::new(cfg);
        // floor(2 * 10 / 100) = 0: nothing to do.
        let decisions = evaluate_pool(&accounts, &groups(&["acme-corp"]), &engine, now());
        assert!(decisions.is_empty());
    }

    #[test]
    fn single_pool_merges_groups_into_shared_bucket() {
        let accounts = vec![
            account("a1", 60, 72, &["Active", "acme-corp"]),
            account("a2", 60, 80, &["Active", "acme-corp"]),
            account("b1", 60, 90, &["Active", "globex"]),
            account("b2", 60, 95, &["Active", "globex"]),
        ];

        // Per-group buckets of two: floor(2*25/100) = 0 each, no moves.
        let grouped = Engine::new(PoolConfig {
            bench_percent: 25,
            ..PoolConfig::default()
        });
        let decisions = evaluate_pool(
            &accounts,
            &groups(&["acme-corp", "globex"]),
            &grouped,
            now(),
        );
        assert!(decisions.is_empty());

        // One shared bucket of four: floor(4*25/100) = 1, the weakest
        // account benches regardless of its group.
        let pooled = Engine::new(PoolConfig {
            bench_percent: 25,
            single_pool: true,
            ..PoolConfig::default()
        });
        let decisions = evaluate_pool(
            &accounts,
            &groups(&["acme-corp", "globex"]),
            &pooled,
            now(),
        );
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].account_id, "a1");
        assert_eq!(decisions[0].new_status, Status::Benched);
    }

    #[test]
    fn at_most_one_decision_per_account() {
        let accounts = vec![
            account("a", 3, 40, &["Sick", "Benched", "Active"]),
            account("b", 60, 40, &["Active"]),
            account("c", 60, 96, &["Sick"]),
        ];
        let engine = Engine::new(PoolConfig {
            bench_percent: 50,
            ..PoolConfig::default()
        });
        let decisions = evaluate_pool(&accounts, &groups(&[]), &engine, now());
        let mut ids: Vec<&str> = decisions.iter().map(|d| d.account_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), decisions.len());
    }

    #[test]
    fn ungrouped_accounts_rotate_in_shared_bucket() {
        let accounts = vec![
            account("u1", 60, 72, &["Active"]),
            account("u2", 60, 90, &["Active"]),
            account("g1", 60, 75, &["Active", "acme-corp"]),
        ];
        let cfg = PoolConfig {
            bench_percent: 50,
            ..PoolConfig::default()
        };
        let engine = Engine::new(cfg);
        let decisions = evaluate_pool(&accounts, &groups(&["acme-corp"]), &engine, now());

        // Shared bucket: u1 benches (weakest of two). acme-corp bucket of
        // one: floor(0.5) = 0, g1 stays despite its lower score.
        assert_eq!(by_id(&decisions, "u1").unwrap().new_status, Status::Benched);
        assert!(by_id(&decisions, "u2").is_none());
        assert!(by_id(&decisions, "g1").is_none());
    }
}
