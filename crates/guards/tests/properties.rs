//! Quantified properties of the guards, checked across whole input spaces
//! where the statement is universal and on the concrete scenarios otherwise.
//!
//! Run: `cargo test -p carefund-guards --test properties`

use alloy_primitives::{Bytes, B256};
use carefund_core::{
    Action, Campaign, CampaignId, CampaignStatus, DonorEntry, Donation, GovernanceAction,
    GuardConfig, KeyHash, Lovelace, Purpose, Record, TxContext, ValidityInterval, VoteRecord,
};
use carefund_guards::{evaluate, reward_asset_name, Denial, Tally};
use proptest::prelude::*;

const OWNER: KeyHash = KeyHash::repeat(0xa1);
const DONOR: KeyHash = KeyHash::repeat(0xd0);
const DEADLINE: i64 = 1_700_000_000_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn id() -> CampaignId {
    CampaignId::from("spinal-surgery")
}

fn campaign(status: CampaignStatus, target: Lovelace, raised: Lovelace) -> Campaign {
    let mut c = Campaign::new(id(), OWNER, target, DEADLINE);
    c.status = status;
    if raised > 0 {
        c.donors.push(DonorEntry {
            donor: DONOR,
            amount: raised,
        });
    }
    c.raised_amount = raised;
    c
}

fn spend(record: Record, action: &Action, ctx: &TxContext) -> Result<(), Denial> {
    evaluate(&Purpose::Spend(record), action, ctx, &GuardConfig::default())
}

fn status_strategy() -> impl Strategy<Value = CampaignStatus> {
    prop_oneof![
        Just(CampaignStatus::Active),
        Just(CampaignStatus::Verified),
        Just(CampaignStatus::Completed),
        Just(CampaignStatus::Cancelled),
    ]
}

fn terminal_strategy() -> impl Strategy<Value = CampaignStatus> {
    prop_oneof![
        Just(CampaignStatus::Verified),
        Just(CampaignStatus::Completed),
        Just(CampaignStatus::Cancelled),
    ]
}

fn window_strategy() -> impl Strategy<Value = ValidityInterval> {
    prop_oneof![
        Just(ValidityInterval::always()),
        (0i64..2 * DEADLINE).prop_map(ValidityInterval::starting_at),
        (0i64..2 * DEADLINE).prop_map(ValidityInterval::until),
        (0i64..DEADLINE, 0i64..DEADLINE).prop_map(|(a, b)| ValidityInterval::between(a, a + b)),
    ]
}

/// Subsets of {owner, donor, stranger} in arbitrary order.
fn signers_strategy() -> impl Strategy<Value = Vec<KeyHash>> {
    proptest::sample::subsequence(vec![OWNER, DONOR, KeyHash::repeat(0x55)], 0..=3)
        .prop_shuffle()
}

fn context(window: ValidityInterval, signers: &[KeyHash]) -> TxContext {
    signers
        .iter()
        .fold(TxContext::new(window), |ctx, s| ctx.signed_by(*s))
}

// ---------------------------------------------------------------------------
// Campaign status only moves forward
// ---------------------------------------------------------------------------

proptest! {
    /// No status-changing action is permitted out of a terminal status,
    /// whoever signs and whenever the transaction runs.
    #[test]
    fn terminal_status_is_final(
        status in terminal_strategy(),
        window in window_strategy(),
        signers in signers_strategy(),
        raised in 0i64..2_000,
    ) {
        let record = campaign(status, 1_000, raised);
        let ctx = context(window, &signers);
        for action in [
            Action::VerifyCampaign { campaign_id: id(), document_hash: B256::ZERO },
            Action::CancelCampaign { campaign_id: id() },
            Action::CompleteCampaign { campaign_id: id() },
            Action::CreateCampaign { target: 1_000, deadline: DEADLINE },
        ] {
            prop_assert!(spend(Record::Campaign(record.clone()), &action, &ctx).is_err());
        }
    }

    /// Each CreateCampaign failure condition denies on its own.
    #[test]
    fn create_denied_on_any_single_failure(
        target in -1_000i64..=0,
        now in DEADLINE..DEADLINE * 2,
    ) {
        let ok_ctx = context(ValidityInterval::starting_at(0), &[OWNER]);

        let bad_target = Campaign::new(id(), OWNER, target, DEADLINE);
        let action = Action::CreateCampaign { target, deadline: DEADLINE };
        prop_assert_eq!(
            spend(Record::Campaign(bad_target), &action, &ok_ctx),
            Err(Denial::NonPositiveTarget(target))
        );

        let good = Campaign::new(id(), OWNER, 1_000, DEADLINE);
        let action = Action::CreateCampaign { target: 1_000, deadline: DEADLINE };
        let late = context(ValidityInterval::starting_at(now), &[OWNER]);
        let is_deadline_denial = matches!(
            spend(Record::Campaign(good.clone()), &action, &late),
            Err(Denial::DeadlineNotInFuture { .. })
        );
        prop_assert!(is_deadline_denial);

        let unsigned = context(ValidityInterval::starting_at(0), &[DONOR]);
        prop_assert_eq!(
            spend(Record::Campaign(good), &action, &unsigned),
            Err(Denial::MissingSignature(OWNER))
        );
    }
}

// ---------------------------------------------------------------------------
// Donations and refunds
// ---------------------------------------------------------------------------

proptest! {
    /// A zero donation or one that disagrees with its record never passes,
    /// regardless of who signs.
    #[test]
    fn bad_donation_amounts_always_denied(
        recorded in 0i64..1_000_000,
        claimed in 0i64..1_000_000,
        signers in signers_strategy(),
    ) {
        prop_assume!(claimed == 0 || claimed != recorded);
        let donation = Donation { campaign_id: id(), donor: DONOR, amount: recorded };
        let ctx = context(ValidityInterval::between(0, 10), &signers)
            .consuming(Record::Campaign(campaign(CampaignStatus::Active, 1_000, 0)));
        let action = Action::Donate { campaign_id: id(), amount: claimed };
        prop_assert!(spend(Record::Donation(donation), &action, &ctx).is_err());
    }

    /// Refund permitted iff cancelled, or deadline passed with target missed
    /// (donor signing in both cases).
    #[test]
    fn refund_rule_is_exact(
        status in status_strategy(),
        raised in 0i64..2_000,
        window in window_strategy(),
    ) {
        let c = campaign(status, 1_000, raised);
        let expected = c.status == CampaignStatus::Cancelled
            || (window.has_passed(DEADLINE) && c.raised_amount < c.target_amount);

        let donation = Donation { campaign_id: id(), donor: DONOR, amount: 5 };
        let action = Action::RequestRefund { campaign_id: id() };
        let ctx = context(window, &[DONOR]).consuming(Record::Campaign(c));

        prop_assert_eq!(
            spend(Record::Donation(donation), &action, &ctx).is_ok(),
            expected
        );
    }
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

fn vote_record(total: u8, approve: u8, quorum: u32) -> VoteRecord {
    let mut r = VoteRecord::open(
        GovernanceAction::EmergencyFundRelease { campaign_id: id() },
        quorum,
    );
    for i in 0..total {
        r.votes.insert(KeyHash::repeat(i), i < approve);
    }
    r
}

fn governance_ctx(signer: KeyHash) -> TxContext {
    context(ValidityInterval::always(), &[signer])
        .consuming(Record::Campaign(campaign(CampaignStatus::Active, 1_000, 0)))
}

#[test]
fn emergency_release_needs_strict_majority() {
    let action = Action::EmergencyFundRelease { campaign_id: id() };
    let voter = KeyHash::repeat(0);

    let tied = vote_record(10, 5, 6);
    let t = Tally::of(&tied.votes);
    assert!(t.has_quorum(6) && !t.has_majority());
    assert!(spend(Record::Vote(tied), &action, &governance_ctx(voter)).is_err());

    let passed = vote_record(10, 6, 6);
    assert!(spend(Record::Vote(passed), &action, &governance_ctx(voter)).is_ok());
}

#[test]
fn repeated_vote_rejected_then_change_permitted() {
    let voter = KeyHash::repeat(3);
    let mut record = vote_record(0, 0, 1);
    record.votes.insert(voter, true);

    let again = Action::Vote {
        campaign_id: id(),
        approve: true,
    };
    let change = Action::Vote {
        campaign_id: id(),
        approve: false,
    };
    assert_eq!(
        spend(Record::Vote(record.clone()), &again, &governance_ctx(voter)),
        Err(Denial::DuplicateVote(voter))
    );
    assert!(spend(Record::Vote(record), &change, &governance_ctx(voter)).is_ok());
}

proptest! {
    #[test]
    fn majority_is_strictly_more_than_half(total in 0u8..60, approve_frac in 0u8..=100) {
        let approve = ((total as u32 * approve_frac as u32) / 100) as u8;
        let tally = Tally::of(&vote_record(total, approve, 1).votes);
        prop_assert_eq!(tally.has_majority(), 2 * approve as usize > total as usize);
    }
}

// ---------------------------------------------------------------------------
// Reward minting
// ---------------------------------------------------------------------------

fn silver_name(label: &str) -> Bytes {
    let mut name = b"CareFund".to_vec();
    name.extend_from_slice(id().as_slice());
    name.extend_from_slice(label.as_bytes());
    name.extend_from_slice(DONOR.as_slice());
    Bytes::from(name)
}

fn mint_ctx(asset_name: Bytes, quantity: i64) -> TxContext {
    let mut c = campaign(CampaignStatus::Active, 1_000_000_000, 0);
    c.donors.push(DonorEntry {
        donor: DONOR,
        amount: 75_000_000,
    });
    c.raised_amount = 75_000_000;
    context(ValidityInterval::always(), &[DONOR])
        .consuming(Record::Campaign(c))
        .minting(asset_name, quantity)
}

#[test]
fn seventy_five_ada_mints_silver_only_once() {
    let config = GuardConfig::default();
    let action = Action::IssueReward {
        campaign_id: id(),
        donor: DONOR,
        amount: 75_000_000,
    };

    let derived = reward_asset_name(&config.reward, &id(), &DONOR, 75_000_000);
    assert_eq!(derived, silver_name("Silver"));

    assert!(evaluate(&Purpose::Mint, &action, &mint_ctx(silver_name("Silver"), 1), &config).is_ok());
    for label in ["Bronze", "Gold", "Platinum"] {
        assert!(evaluate(&Purpose::Mint, &action, &mint_ctx(silver_name(label), 1), &config).is_err());
    }
    assert_eq!(
        evaluate(&Purpose::Mint, &action, &mint_ctx(silver_name("Silver"), 2), &config),
        Err(Denial::MintQuantity(2))
    );
}

// ---------------------------------------------------------------------------
// Permitted transitions are not repeatable against their own result
// ---------------------------------------------------------------------------

#[test]
fn advancing_campaign_actions_do_not_repeat() {
    let ctx = context(ValidityInterval::starting_at(DEADLINE + 1), &[OWNER]);

    let cases = [
        (
            Action::VerifyCampaign {
                campaign_id: id(),
                document_hash: B256::repeat_byte(1),
            },
            CampaignStatus::Verified,
        ),
        (Action::CancelCampaign { campaign_id: id() }, CampaignStatus::Cancelled),
        (Action::CompleteCampaign { campaign_id: id() }, CampaignStatus::Completed),
    ];

    for (action, next) in cases {
        let before = campaign(CampaignStatus::Active, 1_000, 1_000);
        assert!(spend(Record::Campaign(before.clone()), &action, &ctx).is_ok());

        let mut after = before;
        after.status = next;
        assert!(
            spend(Record::Campaign(after), &action, &ctx).is_err(),
            "{} permitted twice",
            action.name()
        );
    }
}

#[test]
fn applied_vote_does_not_repeat() {
    let voter = KeyHash::repeat(9);
    let action = Action::Vote {
        campaign_id: id(),
        approve: false,
    };
    let mut record = vote_record(4, 4, 3);
    assert!(spend(Record::Vote(record.clone()), &action, &governance_ctx(voter)).is_ok());

    record.votes.insert(voter, false);
    assert!(spend(Record::Vote(record), &action, &governance_ctx(voter)).is_err());
}
