//! State-transition guards for campaigns, donations, governance votes and
//! reward mints.
//!
//! Guards are pure predicates over `(record, action, context)`: they hold no
//! state, read no clock and never mutate anything. The ledger commits a
//! transition only when its guard returns `Ok(())`.

pub mod batch;
pub mod campaign;
pub mod donation;
pub mod governance;
pub mod lookup;
pub mod reward;
pub mod verdict;

pub use batch::{evaluate_batch, Transition};
pub use governance::Tally;
pub use reward::{reward_asset_name, RewardTier};
pub use verdict::{is_permitted, Denial, DenialKind, GuardKind, Verdict};

use carefund_core::{Action, GuardConfig, Purpose, Record, TxContext};

/// The guard responsible for a purpose.
pub fn guard_for(purpose: &Purpose) -> GuardKind {
    match purpose {
        Purpose::Spend(Record::Campaign(_)) => GuardKind::Campaign,
        Purpose::Spend(Record::Donation(_)) => GuardKind::Donation,
        Purpose::Spend(Record::Vote(_)) => GuardKind::Governance,
        Purpose::Mint => GuardKind::RewardMint,
    }
}

/// Runs the guard matching `purpose` against `action`.
pub fn evaluate(
    purpose: &Purpose,
    action: &Action,
    ctx: &TxContext,
    config: &GuardConfig,
) -> Verdict {
    let verdict = match purpose {
        Purpose::Spend(Record::Campaign(c)) => campaign::validate(c, action, ctx),
        Purpose::Spend(Record::Donation(d)) => donation::validate(d, action, ctx),
        Purpose::Spend(Record::Vote(v)) => governance::validate(v, action, ctx),
        Purpose::Mint => reward::validate(action, ctx, &config.reward),
    };

    let guard = guard_for(purpose);
    match &verdict {
        Ok(()) => tracing::trace!(%guard, action = action.name(), "permit"),
        Err(denial) => tracing::debug!(
            %guard,
            action = action.name(),
            campaign = ?action.campaign_id(),
            kind = %denial.kind(),
            reason = %denial,
            "deny"
        ),
    }
    verdict
}
