//! Guard outcomes.
//!
//! The contract is a plain permit/deny. `Denial` carries a reason for tests
//! and logs; callers that only need the boolean use [`is_permitted`].

use carefund_core::{CampaignId, CampaignStatus, GovernanceAction, KeyHash, Lovelace, PosixTime};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// `Ok(())` is a permit.
pub type Verdict = Result<(), Denial>;

#[inline]
pub fn is_permitted(verdict: &Verdict) -> bool {
    verdict.is_ok()
}

/// Which guard produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GuardKind {
    Campaign,
    Donation,
    Governance,
    RewardMint,
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GuardKind::Campaign => "campaign",
            GuardKind::Donation => "donation",
            GuardKind::Governance => "governance",
            GuardKind::RewardMint => "reward-mint",
        };
        f.write_str(s)
    }
}

/// The four classes every denial falls into. All are reported the same way
/// to the ledger; the split only helps whoever fixes the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DenialKind {
    /// Action does not belong to the record's action set.
    MalformedAction,
    /// A referenced campaign is not among the consumed records.
    MissingRecord,
    /// A required signer is absent.
    Unauthorized,
    /// Status, deadline, quorum, amount or name check failed.
    Invariant,
}

impl fmt::Display for DenialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenialKind::MalformedAction => "malformed-action",
            DenialKind::MissingRecord => "missing-record",
            DenialKind::Unauthorized => "unauthorized",
            DenialKind::Invariant => "invariant",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    // -- Malformed action --
    #[error("{guard} guard does not accept {action}")]
    UnexpectedAction {
        guard: GuardKind,
        action: &'static str,
    },

    // -- Missing record --
    #[error("campaign {0} is not among the consumed records")]
    CampaignNotFound(CampaignId),

    // -- Authorization --
    #[error("missing signature from {0}")]
    MissingSignature(KeyHash),

    #[error("transaction declares no signer")]
    NoSigner,

    #[error("signer {0} did not take part in the vote")]
    NotAVoter(KeyHash),

    // -- Business invariants --
    #[error("action targets campaign {action} but record is {record}")]
    CampaignMismatch {
        record: CampaignId,
        action: CampaignId,
    },

    #[error("campaign is {actual}, action requires {required}")]
    WrongStatus {
        actual: CampaignStatus,
        required: &'static str,
    },

    #[error("target amount must be positive, got {0}")]
    NonPositiveTarget(Lovelace),

    #[error("deadline {deadline} is not after current time {now}")]
    DeadlineNotInFuture { deadline: PosixTime, now: PosixTime },

    #[error("action fields do not match the campaign record")]
    CreationMismatch,

    #[error("new campaign must start with nothing raised, no donors, status Active")]
    NotZeroState,

    #[error("raised {raised} has not reached target {target}")]
    TargetNotReached { raised: Lovelace, target: Lovelace },

    #[error("deadline {0} has not passed")]
    DeadlineNotPassed(PosixTime),

    #[error("validity window reaches past the deadline {0}")]
    DonationWindowClosed(PosixTime),

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Lovelace),

    #[error("amount {claimed} does not match recorded {recorded}")]
    AmountMismatch {
        claimed: Lovelace,
        recorded: Lovelace,
    },

    #[error("refund requires a cancelled campaign or a missed target after the deadline")]
    RefundNotAllowed,

    #[error("{0} already cast this vote")]
    DuplicateVote(KeyHash),

    #[error("quorum not reached: {votes} of {quorum} voters")]
    QuorumNotReached { votes: usize, quorum: u32 },

    #[error("no majority: {approve} of {total} approve")]
    NoMajority { approve: usize, total: usize },

    #[error("proposal voted for {proposed:?} but {executed:?} was executed")]
    ProposalMismatch {
        proposed: GovernanceAction,
        executed: GovernanceAction,
    },

    #[error("invalid protocol parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("{donor} has no qualifying contribution in campaign {campaign}")]
    NoQualifyingContribution {
        campaign: CampaignId,
        donor: KeyHash,
    },

    #[error("exactly one asset class must be minted, found {0}")]
    MintClassCount(usize),

    #[error("minted quantity must be 1, found {0}")]
    MintQuantity(i64),

    #[error("asset name does not match the derived reward name")]
    AssetNameMismatch,

    #[error("arithmetic overflow")]
    Overflow,
}

impl Denial {
    pub fn kind(&self) -> DenialKind {
        match self {
            Denial::UnexpectedAction { .. } => DenialKind::MalformedAction,
            Denial::CampaignNotFound(_) => DenialKind::MissingRecord,
            Denial::MissingSignature(_) | Denial::NoSigner | Denial::NotAVoter(_) => {
                DenialKind::Unauthorized
            }
            Denial::CampaignMismatch { .. }
            | Denial::WrongStatus { .. }
            | Denial::NonPositiveTarget(_)
            | Denial::DeadlineNotInFuture { .. }
            | Denial::CreationMismatch
            | Denial::NotZeroState
            | Denial::TargetNotReached { .. }
            | Denial::DeadlineNotPassed(_)
            | Denial::DonationWindowClosed(_)
            | Denial::NonPositiveAmount(_)
            | Denial::AmountMismatch { .. }
            | Denial::RefundNotAllowed
            | Denial::DuplicateVote(_)
            | Denial::QuorumNotReached { .. }
            | Denial::NoMajority { .. }
            | Denial::ProposalMismatch { .. }
            | Denial::InvalidParameters(_)
            | Denial::NoQualifyingContribution { .. }
            | Denial::MintClassCount(_)
            | Denial::MintQuantity(_)
            | Denial::AssetNameMismatch
            | Denial::Overflow => DenialKind::Invariant,
        }
    }
}

/// `Ok(())` when `cond` holds, otherwise the given denial.
#[inline]
pub(crate) fn ensure(cond: bool, denial: impl FnOnce() -> Denial) -> Verdict {
    if cond {
        Ok(())
    } else {
        Err(denial())
    }
}
