use crate::engine::{Decision, EvalContext, Rule, Verdict};
use crate::types::{MembershipChange, Status};

/// The production rule order. First match wins; later rules never see an
/// account once an earlier rule returned a verdict other than `Pass`.
///
/// The order encodes policy: operator holds beat age, age beats auth, auth
/// beats health, health beats rotation, and tag cleanup runs only when no
/// substantive rule wanted the account.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "dead_guard",
            eval: dead_guard,
        },
        Rule {
            id: "age_gate",
            eval: age_gate,
        },
        Rule {
            id: "auth_gate",
            eval: auth_gate,
        },
        Rule {
            id: "health_gate",
            eval: health_gate,
        },
        Rule {
            id: "sick_recovery",
            eval: sick_recovery,
        },
        Rule {
            id: "forced_rotation",
            eval: forced_rotation,
        },
        Rule {
            id: "rest_to_active",
            eval: rest_to_active,
        },
        Rule {
            id: "conflict_cleanup",
            eval: conflict_cleanup,
        },
        Rule {
            id: "bootstrap",
            eval: bootstrap,
        },
    ]
}

fn act(
    ctx: &EvalContext,
    reason: String,
    new_status: Status,
    warmup: Option<bool>,
    campaigns: Option<MembershipChange>,
) -> Verdict {
    Verdict::Act(Decision {
        account_id: ctx.account.id.clone(),
        email: ctx.account.email.clone(),
        reason,
        new_status,
        warmup,
        campaigns,
    })
}

/// An operator-applied `Dead` label freezes the account. The engine never
/// assigns `Dead` itself, only keeps its labels tidy.
fn dead_guard(ctx: &EvalContext) -> Verdict {
    if ctx.effective != Some(Status::Dead) {
        return Verdict::Pass;
    }
    if ctx.conflict {
        return act(
            ctx,
            "conflict cleanup: operator-held dead".to_string(),
            Status::Dead,
            None,
            None,
        );
    }
    Verdict::Hold
}

/// Accounts younger than the minimum age warm up, no matter what their
/// score or the rotation plan says.
fn age_gate(ctx: &EvalContext) -> Verdict {
    if ctx.age_days >= ctx.config.min_age_days {
        return Verdict::Pass;
    }
    if ctx.effective == Some(Status::Warming) && !ctx.conflict {
        return Verdict::Hold;
    }
    act(
        ctx,
        format!(
            "age gate: {}d old, minimum {}d",
            ctx.age_days, ctx.config.min_age_days
        ),
        Status::Warming,
        Some(true),
        Some(MembershipChange::Remove),
    )
}

/// Failed authentication pulls the account out of everything, warmup
/// included. Warming a mailbox that cannot authenticate is wasted send
/// volume.
fn auth_gate(ctx: &EvalContext) -> Verdict {
    if ctx.auth_valid {
        return Verdict::Pass;
    }
    if ctx.effective == Some(Status::Sick) && !ctx.conflict {
        return Verdict::Hold;
    }
    act(
        ctx,
        "auth gate: authentication failed".to_string(),
        Status::Sick,
        Some(false),
        Some(MembershipChange::Remove),
    )
}

/// Below the health floor the account is sick and leaves campaigns, with
/// warmup kept on so the score can climb back. Accounts already classified
/// sick fall through to the recovery rule, which owns them.
fn health_gate(ctx: &EvalContext) -> Verdict {
    if ctx.account.health_score >= ctx.config.warmup_threshold {
        return Verdict::Pass;
    }
    if ctx.effective == Some(Status::Sick) {
        return Verdict::Pass;
    }
    act(
        ctx,
        format!(
            "health gate: score {} below floor {}",
            ctx.account.health_score, ctx.config.warmup_threshold
        ),
        Status::Sick,
        Some(true),
        Some(MembershipChange::Remove),
    )
}

/// Sick accounts rest on the bench once their score climbs clear of the
/// recovery threshold. A sick account that has not recovered but carries
/// conflicting labels still gets a tag-only cleanup.
fn sick_recovery(ctx: &EvalContext) -> Verdict {
    if ctx.effective != Some(Status::Sick) {
        return Verdict::Pass;
    }
    if ctx.account.health_score > ctx.config.health_recovery_threshold {
        return act(
            ctx,
            format!(
                "recovered: score {} above {}",
                ctx.account.health_score, ctx.config.health_recovery_threshold
            ),
            Status::Benched,
            Some(true),
            Some(MembershipChange::Remove),
        );
    }
    if ctx.conflict {
        return act(
            ctx,
            format!(
                "conflict cleanup: still sick at score {}",
                ctx.account.health_score
            ),
            Status::Sick,
            None,
            None,
        );
    }
    Verdict::Hold
}

/// Rotation hints from the allocator. Only reached by accounts that passed
/// the age, auth and health gates, so a forced move is always safe to take.
fn forced_rotation(ctx: &EvalContext) -> Verdict {
    let Some(target) = ctx.forced else {
        return Verdict::Pass;
    };
    if ctx.effective == Some(target) && !ctx.conflict {
        return Verdict::Hold;
    }
    let campaigns = match target {
        Status::Sending => Some(MembershipChange::Add),
        Status::Benched => Some(MembershipChange::Remove),
        _ => None,
    };
    act(
        ctx,
        format!("rotation plan: move to {target}"),
        target,
        None,
        campaigns,
    )
}

/// Rested and recovered accounts return to sending even without a rotation
/// plan.
fn rest_to_active(ctx: &EvalContext) -> Verdict {
    if ctx.effective != Some(Status::Benched) {
        return Verdict::Pass;
    }
    if ctx.account.health_score < ctx.config.health_return_threshold {
        return Verdict::Pass;
    }
    act(
        ctx,
        format!(
            "rested and recovered: score {} at or above {}",
            ctx.account.health_score, ctx.config.health_return_threshold
        ),
        Status::Sending,
        Some(true),
        Some(MembershipChange::Add),
    )
}

/// Nothing substantive wanted this account, but its labels disagree.
/// Normalize them to the resolved status without touching warmup or
/// campaigns.
fn conflict_cleanup(ctx: &EvalContext) -> Verdict {
    if !ctx.conflict {
        return Verdict::Pass;
    }
    let Some(status) = ctx.effective else {
        return Verdict::Pass;
    };
    act(
        ctx,
        format!("conflict cleanup: labels resolve to {status}"),
        status,
        None,
        None,
    )
}

/// Unlabeled accounts past the age gate join the sending pool. Younger
/// ones were already caught by the age gate.
fn bootstrap(ctx: &EvalContext) -> Verdict {
    if ctx.effective.is_some() {
        return Verdict::Pass;
    }
    act(
        ctx,
        format!("unlabeled: {}d old, assigning sending", ctx.age_days),
        Status::Sending,
        Some(true),
        Some(MembershipChange::Add),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
