//! Governance guard: voting, emergency release and protocol updates.

use crate::lookup::require_campaign;
use crate::verdict::{ensure, Denial, GuardKind, Verdict};
use carefund_core::{
    Action, CampaignId, GovernanceAction, KeyHash, ProtocolParameters, TxContext, VoteRecord,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Vote count over a key-hash → approve mapping.
///
/// Counting does not depend on iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub total: usize,
    pub approve: usize,
}

impl Tally {
    pub fn of(votes: &BTreeMap<KeyHash, bool>) -> Self {
        Self {
            total: votes.len(),
            approve: votes.values().filter(|v| **v).count(),
        }
    }

    #[inline]
    pub fn has_quorum(&self, quorum: u32) -> bool {
        self.total >= quorum as usize
    }

    /// Strictly more than half. A tie is not a majority.
    #[inline]
    pub fn has_majority(&self) -> bool {
        self.approve > self.total / 2
    }

    fn require_passed(&self, quorum: u32) -> Verdict {
        ensure(self.has_quorum(quorum), || Denial::QuorumNotReached {
            votes: self.total,
            quorum,
        })?;
        ensure(self.has_majority(), || Denial::NoMajority {
            approve: self.approve,
            total: self.total,
        })
    }
}

pub fn validate(record: &VoteRecord, action: &Action, ctx: &TxContext) -> Verdict {
    match action {
        Action::Vote {
            campaign_id,
            approve,
        } => vote(record, campaign_id, *approve, ctx),
        Action::EmergencyFundRelease { campaign_id } => emergency_release(record, campaign_id, ctx),
        Action::UpdateProtocol { new_parameters } => update_protocol(record, new_parameters),
        other => Err(Denial::UnexpectedAction {
            guard: GuardKind::Governance,
            action: other.name(),
        }),
    }
}

/// A new vote or a changed vote. Re-sending the recorded value is rejected.
fn vote(record: &VoteRecord, id: &CampaignId, approve: bool, ctx: &TxContext) -> Verdict {
    require_campaign(&ctx.consumed, id)?;
    let signer = ctx.first_signer().ok_or(Denial::NoSigner)?;

    ensure(record.votes.get(signer) != Some(&approve), || {
        Denial::DuplicateVote(*signer)
    })
}

fn emergency_release(record: &VoteRecord, id: &CampaignId, ctx: &TxContext) -> Verdict {
    require_campaign(&ctx.consumed, id)?;
    require_proposal(
        record,
        &GovernanceAction::EmergencyFundRelease {
            campaign_id: id.clone(),
        },
    )?;
    Tally::of(&record.votes).require_passed(record.quorum)?;

    let signer = ctx.first_signer().ok_or(Denial::NoSigner)?;
    ensure(record.votes.contains_key(signer), || Denial::NotAVoter(*signer))
}

fn update_protocol(record: &VoteRecord, params: &ProtocolParameters) -> Verdict {
    require_proposal(
        record,
        &GovernanceAction::UpdateProtocol {
            new_parameters: params.clone(),
        },
    )?;
    Tally::of(&record.votes).require_passed(record.quorum)?;
    check_parameters(params)
}

/// The executed action must be exactly what the votes were cast for.
fn require_proposal(record: &VoteRecord, executed: &GovernanceAction) -> Verdict {
    ensure(&record.governance_action == executed, || Denial::ProposalMismatch {
        proposed: record.governance_action.clone(),
        executed: executed.clone(),
    })
}

pub fn check_parameters(params: &ProtocolParameters) -> Verdict {
    ensure((1..=100).contains(&params.quorum_percentage), || {
        Denial::InvalidParameters("quorum_percentage must be within 1..=100")
    })?;
    ensure(params.min_vote_time > 0, || {
        Denial::InvalidParameters("min_vote_time must be positive")
    })?;
    ensure(params.max_vote_time > params.min_vote_time, || {
        Denial::InvalidParameters("max_vote_time must exceed min_vote_time")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carefund_core::{Campaign, GovernanceAction, Record, ValidityInterval};

    fn id() -> CampaignId {
        CampaignId::from("icu-stay")
    }

    fn campaign_record() -> Record {
        Record::Campaign(Campaign::new(id(), KeyHash::repeat(0xee), 10, 10))
    }

    fn voter(i: u8) -> KeyHash {
        KeyHash::repeat(i)
    }

    /// `total` voters, the first `approve` of them in favour.
    fn record(total: u8, approve: u8, quorum: u32) -> VoteRecord {
        let mut r = VoteRecord::open(GovernanceAction::EmergencyFundRelease { campaign_id: id() }, quorum);
        for i in 0..total {
            r.votes.insert(voter(i), i < approve);
        }
        r
    }

    fn ctx_for(signer: KeyHash) -> TxContext {
        TxContext::new(ValidityInterval::always())
            .signed_by(signer)
            .consuming(campaign_record())
    }

    #[test]
    fn tally_counts_and_majority_rule() {
        let t = Tally::of(&record(10, 5, 6).votes);
        assert_eq!(t, Tally { total: 10, approve: 5 });
        assert!(t.has_quorum(6));
        assert!(!t.has_majority());
        assert!(Tally::of(&record(10, 6, 6).votes).has_majority());
        assert!(!Tally::default().has_majority());
    }

    // -- Vote --

    #[test]
    fn first_vote_permitted() {
        let action = Action::Vote {
            campaign_id: id(),
            approve: true,
        };
        assert!(validate(&record(0, 0, 1), &action, &ctx_for(voter(9))).is_ok());
    }

    #[test]
    fn identical_vote_rejected_changed_vote_permitted() {
        let r = record(1, 1, 1); // voter(0) approved
        let same = Action::Vote {
            campaign_id: id(),
            approve: true,
        };
        let flipped = Action::Vote {
            campaign_id: id(),
            approve: false,
        };
        assert_eq!(
            validate(&r, &same, &ctx_for(voter(0))),
            Err(Denial::DuplicateVote(voter(0)))
        );
        assert!(validate(&r, &flipped, &ctx_for(voter(0))).is_ok());
    }

    #[test]
    fn vote_without_signer_or_campaign_denied() {
        let action = Action::Vote {
            campaign_id: id(),
            approve: true,
        };
        let unsigned = TxContext::new(ValidityInterval::always()).consuming(campaign_record());
        assert_eq!(validate(&record(0, 0, 1), &action, &unsigned), Err(Denial::NoSigner));

        let no_campaign = TxContext::new(ValidityInterval::always()).signed_by(voter(1));
        assert_eq!(
            validate(&record(0, 0, 1), &action, &no_campaign),
            Err(Denial::CampaignNotFound(id()))
        );
    }

    // -- EmergencyFundRelease --

    #[test]
    fn emergency_release_five_of_ten_is_not_a_majority() {
        let action = Action::EmergencyFundRelease { campaign_id: id() };
        assert_eq!(
            validate(&record(10, 5, 6), &action, &ctx_for(voter(0))),
            Err(Denial::NoMajority {
                approve: 5,
                total: 10
            })
        );
        assert!(validate(&record(10, 6, 6), &action, &ctx_for(voter(0))).is_ok());
    }

    #[test]
    fn emergency_release_needs_quorum() {
        let action = Action::EmergencyFundRelease { campaign_id: id() };
        assert_eq!(
            validate(&record(5, 5, 6), &action, &ctx_for(voter(0))),
            Err(Denial::QuorumNotReached {
                votes: 5,
                quorum: 6
            })
        );
    }

    #[test]
    fn emergency_release_signer_must_have_voted() {
        let action = Action::EmergencyFundRelease { campaign_id: id() };
        assert_eq!(
            validate(&record(10, 8, 6), &action, &ctx_for(voter(42))),
            Err(Denial::NotAVoter(voter(42)))
        );
    }

    #[test]
    fn emergency_release_uses_first_signer_only() {
        let action = Action::EmergencyFundRelease { campaign_id: id() };
        let ctx = TxContext::new(ValidityInterval::always())
            .signed_by(voter(42))
            .signed_by(voter(0))
            .consuming(campaign_record());
        assert!(validate(&record(10, 8, 6), &action, &ctx).is_err());
    }

    // -- UpdateProtocol --

    fn params() -> ProtocolParameters {
        ProtocolParameters {
            quorum_percentage: 60,
            min_vote_time: 1,
            max_vote_time: 2,
        }
    }

    fn update_record(total: u8, approve: u8, quorum: u32) -> VoteRecord {
        let mut r = record(total, approve, quorum);
        r.governance_action = GovernanceAction::UpdateProtocol {
            new_parameters: params(),
        };
        r
    }

    #[test]
    fn update_protocol_with_valid_parameters() {
        let action = Action::UpdateProtocol {
            new_parameters: params(),
        };
        // No signer or campaign required.
        let ctx = TxContext::default();
        assert!(validate(&update_record(3, 2, 3), &action, &ctx).is_ok());
        assert!(validate(&update_record(3, 1, 3), &action, &ctx).is_err());
    }

    #[test]
    fn update_protocol_must_install_the_voted_parameters() {
        let other = ProtocolParameters {
            quorum_percentage: 1,
            min_vote_time: 1,
            max_vote_time: 2,
        };
        let action = Action::UpdateProtocol {
            new_parameters: other.clone(),
        };
        assert_eq!(
            validate(&update_record(3, 3, 3), &action, &TxContext::default()),
            Err(Denial::ProposalMismatch {
                proposed: GovernanceAction::UpdateProtocol {
                    new_parameters: params()
                },
                executed: GovernanceAction::UpdateProtocol {
                    new_parameters: other
                },
            })
        );
    }

    #[test]
    fn release_proposal_cannot_be_executed_as_update() {
        let action = Action::UpdateProtocol {
            new_parameters: params(),
        };
        assert!(matches!(
            validate(&record(3, 3, 3), &action, &TxContext::default()),
            Err(Denial::ProposalMismatch { .. })
        ));
    }

    #[test]
    fn emergency_release_bound_to_proposed_campaign() {
        let other = CampaignId::from("other-ward");
        let ctx = TxContext::new(ValidityInterval::always())
            .signed_by(voter(0))
            .consuming(Record::Campaign(Campaign::new(other.clone(), KeyHash::repeat(0xee), 10, 10)));
        let action = Action::EmergencyFundRelease { campaign_id: other };
        assert!(matches!(
            validate(&record(10, 8, 6), &action, &ctx),
            Err(Denial::ProposalMismatch { .. })
        ));
    }

    #[test]
    fn parameter_bounds() {
        let ok = ProtocolParameters {
            quorum_percentage: 100,
            min_vote_time: 10,
            max_vote_time: 11,
        };
        assert!(check_parameters(&ok).is_ok());
        for bad in [
            ProtocolParameters {
                quorum_percentage: 0,
                ..ok.clone()
            },
            ProtocolParameters {
                quorum_percentage: 101,
                ..ok.clone()
            },
            ProtocolParameters {
                min_vote_time: 0,
                ..ok.clone()
            },
            ProtocolParameters {
                max_vote_time: 10,
                ..ok.clone()
            },
        ] {
            assert!(matches!(
                check_parameters(&bad),
                Err(Denial::InvalidParameters(_))
            ));
        }
    }
}
