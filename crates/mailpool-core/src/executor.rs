use tracing::debug;

use crate::engine::{Decision, TagChange};
use crate::error::Result;
use crate::types::{MembershipChange, Status};

// ---------------------------------------------------------------------------
// ActionExecutor
// ---------------------------------------------------------------------------

/// Boundary between the pure engine and whatever applies its decisions. The
/// CLI implements this against the live registry; tests implement it with a
/// recorder; a dry run simply never calls it.
///
/// Implementations must be idempotent per operation: adding a tag that is
/// already present or removing one that is absent must succeed quietly, so a
/// partially applied cycle can be re-run.
pub trait ActionExecutor {
    fn add_tag(&mut self, account_id: &str, status: Status) -> Result<()>;
    fn remove_tag(&mut self, account_id: &str, status: Status) -> Result<()>;
    fn set_warmup(&mut self, account_id: &str, enabled: bool) -> Result<()>;
    fn set_campaign_membership(
        &mut self,
        account_id: &str,
        change: MembershipChange,
    ) -> Result<()>;
}

/// Apply one decision through an executor: tag normalization first, then the
/// warmup and campaign side effects. `current` is the account's distinct
/// labeled statuses before the decision.
///
/// Stops at the first failing operation. Because each operation is
/// idempotent, rerunning the cycle converges instead of compounding.
pub fn apply_decision(
    executor: &mut dyn ActionExecutor,
    decision: &Decision,
    current: &[Status],
) -> Result<()> {
    for change in decision.tag_changes(current) {
        match change {
            TagChange::Remove(status) => executor.remove_tag(&decision.account_id, status)?,
            TagChange::Add(status) => executor.add_tag(&decision.account_id, status)?,
        }
    }
    if let Some(enabled) = decision.warmup {
        executor.set_warmup(&decision.account_id, enabled)?;
    }
    if let Some(change) = decision.campaigns {
        executor.set_campaign_membership(&decision.account_id, change)?;
    }
    debug!(
        account_id = %decision.account_id,
        new_status = %decision.new_status,
        "decision applied"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn check(&self, op: &str) -> Result<()> {
            if self.fail_on == Some(op) {
                return Err(PoolError::Executor(format!("{op} rejected")));
            }
            Ok(())
        }
    }

    impl ActionExecutor for Recorder {
        fn add_tag(&mut self, account_id: &str, status: Status) -> Result<()> {
            self.check("add_tag")?;
            self.ops.push(format!("add_tag {account_id} {status}"));
            Ok(())
        }

        fn remove_tag(&mut self, account_id: &str, status: Status) -> Result<()> {
            self.check("remove_tag")?;
            self.ops.push(format!("remove_tag {account_id} {status}"));
            Ok(())
        }

        fn set_warmup(&mut self, account_id: &str, enabled: bool) -> Result<()> {
            self.check("set_warmup")?;
            self.ops.push(format!("set_warmup {account_id} {enabled}"));
            Ok(())
        }

        fn set_campaign_membership(
            &mut self,
            account_id: &str,
            change: MembershipChange,
        ) -> Result<()> {
            self.check("set_campaign_membership")?;
            self.ops.push(format!("campaigns {account_id} {change}"));
            Ok(())
        }
    }

    fn decision(status: Status, warmup: Option<bool>, campaigns: Option<MembershipChange>) -> Decision {
        Decision {
            account_id: "acct-9".to_string(),
            email: "nine@pool.test".to_string(),
            reason: "test".to_string(),
            new_status: status,
            warmup,
            campaigns,
        }
    }

    #[test]
    fn applies_tags_then_warmup_then_campaigns() {
        let mut rec = Recorder::default();
        let d = decision(Status::Sick, Some(true), Some(MembershipChange::Remove));
        apply_decision(&mut rec, &d, &[Status::Sending]).unwrap();
        assert_eq!(
            rec.ops,
            vec![
                "remove_tag acct-9 sending",
                "add_tag acct-9 sick",
                "set_warmup acct-9 true",
                "campaigns acct-9 remove",
            ]
        );
    }

    #[test]
    fn cleanup_decision_touches_tags_only() {
        let mut rec = Recorder::default();
        let d = decision(Status::Sick, None, None);
        apply_decision(&mut rec, &d, &[Status::Sick, Status::Benched]).unwrap();
        assert_eq!(rec.ops, vec!["remove_tag acct-9 benched"]);
    }

    #[test]
    fn already_normalized_decision_may_be_a_noop() {
        let mut rec = Recorder::default();
        let d = decision(Status::Benched, None, None);
        apply_decision(&mut rec, &d, &[Status::Benched]).unwrap();
        assert!(rec.ops.is_empty());
    }

    #[test]
    fn stops_at_first_failure() {
        let mut rec = Recorder {
            fail_on: Some("set_warmup"),
            ..Recorder::default()
        };
        let d = decision(Status::Warming, Some(true), Some(MembershipChange::Remove));
        let err = apply_decision(&mut rec, &d, &[]).unwrap_err();
        assert!(matches!(err, PoolError::Executor(_)));
        // Tag went through, campaigns never attempted.
        assert_eq!(rec.ops, vec!["add_tag acct-9 warming"]);
    }
}
