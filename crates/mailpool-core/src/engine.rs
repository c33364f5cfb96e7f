use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::Account;
use crate::classifier::{classify, Classification};
use crate::config::PoolConfig;
use crate::rules::default_rules;
use crate::types::{MembershipChange, Status};

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// One evaluated outcome for one account. Ephemeral: produced each cycle,
/// handed to the executor and the report, never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub account_id: String,
    pub email: String,
    /// Audit trail: which rule fired and the measured values it saw. A
    /// first-class output, shown to operators verbatim.
    pub reason: String,
    pub new_status: Status,
    /// Some(true)/Some(false) to flip warmup, None to leave it untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<bool>,
    /// Campaign membership side effect, None for tag-only decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaigns: Option<MembershipChange>,
}

/// A single tag edit derived from a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagChange {
    Add(Status),
    Remove(Status),
}

impl Decision {
    /// Tag edits that normalize `current` to exactly the new status: every
    /// other status label goes, the target label is added if absent.
    /// Applying these leaves the account with one status label.
    pub fn tag_changes(&self, current: &[Status]) -> Vec<TagChange> {
        let mut changes = Vec::new();
        for status in Status::all() {
            if *status != self.new_status && current.contains(status) {
                changes.push(TagChange::Remove(*status));
            }
        }
        if !current.contains(&self.new_status) {
            changes.push(TagChange::Add(self.new_status));
        }
        changes
    }
}

// ---------------------------------------------------------------------------
// AuthProbe
// ---------------------------------------------------------------------------

/// External authentication signal (SPF/DKIM/DMARC, OAuth token state).
/// The registry does not expose a reliable probe today, so the default
/// implementation reports every account as valid; the auth gate is wired
/// and tested against this seam.
pub trait AuthProbe: Send + Sync {
    fn verify(&self, account: &Account) -> bool;
}

/// Default probe: every account authenticates.
pub struct AssumeValid;

impl AuthProbe for AssumeValid {
    fn verify(&self, _account: &Account) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// EvalContext / Rule / Verdict
// ---------------------------------------------------------------------------

/// Everything a rule may consult, computed once per account.
pub struct EvalContext<'a> {
    pub account: &'a Account,
    pub effective: Option<Status>,
    pub conflict: bool,
    /// Rotation allocator hint, if any.
    pub forced: Option<Status>,
    pub age_days: i64,
    pub auth_valid: bool,
    pub config: &'a PoolConfig,
}

/// What a rule concluded about an account.
pub enum Verdict {
    /// Rule does not apply; evaluation continues with the next rule.
    Pass,
    /// Rule applies and the account is already where it should be.
    /// Evaluation stops with no decision.
    Hold,
    /// Rule applies and produces a decision. Evaluation stops.
    Act(Decision),
}

pub struct Rule {
    pub id: &'static str,
    pub eval: fn(&EvalContext) -> Verdict,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Ordered, short-circuiting rule evaluation over one account at a time.
/// Pure apart from the auth probe: no I/O, no domain errors. Input
/// sanitization (timestamps, score bounds) is the caller's job.
pub struct Engine {
    config: PoolConfig,
    rules: Vec<Rule>,
    auth: Box<dyn AuthProbe>,
}

impl Engine {
    pub fn new(config: PoolConfig) -> Self {
        Self::with_auth_probe(config, Box::new(AssumeValid))
    }

    pub fn with_auth_probe(config: PoolConfig, auth: Box<dyn AuthProbe>) -> Self {
        Engine {
            config,
            rules: default_rules(),
            auth,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Classify the account's labels, then run the rules.
    pub fn evaluate(
        &self,
        account: &Account,
        forced: Option<Status>,
        now: DateTime<Utc>,
    ) -> Option<Decision> {
        let classification = classify(
            &account.tags_resolved,
            account.health_score,
            self.config.warmup_threshold,
        );
        self.evaluate_classified(account, classification, forced, now)
    }

    /// Run the rules against an already-computed classification. The pool
    /// cycle uses this to classify once for bucketing and evaluation.
    pub fn evaluate_classified(
        &self,
        account: &Account,
        classification: Classification,
        forced: Option<Status>,
        now: DateTime<Utc>,
    ) -> Option<Decision> {
        let ctx = EvalContext {
            account,
            effective: classification.effective,
            conflict: classification.conflict,
            forced,
            age_days: account.age_days(now),
            auth_valid: self.auth.verify(account),
            config: &self.config,
        };
        debug!(
            email = %account.email,
            age_days = ctx.age_days,
            score = account.health_score,
            status = ?ctx.effective,
            conflict = ctx.conflict,
            forced = ?ctx.forced,
            "evaluating account"
        );
        for rule in &self.rules {
            match (rule.eval)(&ctx) {
                Verdict::Pass => continue,
                Verdict::Hold => {
                    debug!(email = %account.email, rule = rule.id, "account held in place");
                    return None;
                }
                Verdict::Act(decision) => {
                    debug!(
                        email = %account.email,
                        rule = rule.id,
                        new_status = %decision.new_status,
                        reason = %decision.reason,
                        "rule fired"
                    );
                    return Some(decision);
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
