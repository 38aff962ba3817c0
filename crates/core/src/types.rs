//! Persisted records and the identifiers that link them.

use alloy_primitives::{Bytes, FixedBytes, B256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lovelace-denominated amount. Signed so that malformed (negative or zero)
/// inputs can be represented and denied rather than rejected at decode time.
/// `i64` covers the total ADA supply with room to spare.
pub type Lovelace = i64;

/// POSIX time in milliseconds.
pub type PosixTime = i64;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Hash of a verification key. "Signed by X" means X is in the signer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyHash(pub FixedBytes<28>);

impl KeyHash {
    pub const fn new(bytes: [u8; 28]) -> Self {
        Self(FixedBytes(bytes))
    }

    /// Builds a key hash filled with `byte`. Handy for fixtures.
    pub const fn repeat(byte: u8) -> Self {
        Self::new([byte; 28])
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<[u8; 28]> for KeyHash {
    fn from(bytes: [u8; 28]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Opaque campaign identifier. Any byte string; hex in JSON.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub Bytes);

impl CampaignId {
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for CampaignId {
    fn from(s: &str) -> Self {
        Self::from_slice(s.as_bytes())
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Campaign
// ---------------------------------------------------------------------------

/// Lifecycle status. `Active` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Verified,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, CampaignStatus::Active)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignStatus::Active => "Active",
            CampaignStatus::Verified => "Verified",
            CampaignStatus::Completed => "Completed",
            CampaignStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Evidence attached when a provider signs off on a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub document_hash: B256,
    pub verifier: KeyHash,
    pub verified_at: PosixTime,
}

/// One contribution in the donor ledger. A donor may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorEntry {
    pub donor: KeyHash,
    pub amount: Lovelace,
}

/// A crowdfunding campaign holding pooled contributions in trust.
///
/// Invariant: `raised_amount == sum(donors.amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub owner: KeyHash,
    pub target_amount: Lovelace,
    pub raised_amount: Lovelace,
    pub status: CampaignStatus,
    #[serde(default)]
    pub donors: Vec<DonorEntry>,
    pub deadline: PosixTime,
    #[serde(default)]
    pub verification: Option<Verification>,
    #[serde(default)]
    pub votes: BTreeMap<KeyHash, bool>,
}

impl Campaign {
    /// A freshly created campaign: nothing raised, no donors, `Active`.
    pub fn new(
        id: CampaignId,
        owner: KeyHash,
        target_amount: Lovelace,
        deadline: PosixTime,
    ) -> Self {
        Self {
            id,
            owner,
            target_amount,
            raised_amount: 0,
            status: CampaignStatus::Active,
            donors: Vec::new(),
            deadline,
            verification: None,
            votes: BTreeMap::new(),
        }
    }

    /// `raised_amount = 0`, `status = Active`, `donors = []`.
    pub fn is_zero_state(&self) -> bool {
        self.raised_amount == 0 && self.status == CampaignStatus::Active && self.donors.is_empty()
    }

    /// Sum of the donor ledger, `None` on overflow.
    pub fn donor_total(&self) -> Option<Lovelace> {
        self.donors
            .iter()
            .try_fold(0 as Lovelace, |acc, entry| acc.checked_add(entry.amount))
    }

    /// Checks the record invariants: no negative contributions and
    /// `raised_amount` equal to the donor ledger total.
    pub fn is_consistent(&self) -> bool {
        self.donors.iter().all(|entry| entry.amount >= 0)
            && self.donor_total() == Some(self.raised_amount)
    }
}

// ---------------------------------------------------------------------------
// Donation
// ---------------------------------------------------------------------------

/// One contribution event against a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub campaign_id: CampaignId,
    pub donor: KeyHash,
    pub amount: Lovelace,
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

/// Governance configuration replaced wholesale by `UpdateProtocol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Valid range 1..=100. Signed so out-of-range proposals can be expressed.
    pub quorum_percentage: i64,
    pub min_vote_time: PosixTime,
    pub max_vote_time: PosixTime,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            quorum_percentage: 51,
            min_vote_time: 86_400_000,
            max_vote_time: 604_800_000,
        }
    }
}

/// The proposal a vote record is collecting votes for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GovernanceAction {
    EmergencyFundRelease { campaign_id: CampaignId },
    UpdateProtocol { new_parameters: ProtocolParameters },
}

/// Votes collected for a single proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub governance_action: GovernanceAction,
    #[serde(default)]
    pub votes: BTreeMap<KeyHash, bool>,
    /// Minimum number of distinct voters before the proposal may execute.
    pub quorum: u32,
}

impl VoteRecord {
    pub fn open(governance_action: GovernanceAction, quorum: u32) -> Self {
        Self {
            governance_action,
            votes: BTreeMap::new(),
            quorum,
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Any persisted record a guard can be asked about or see as consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Record {
    Campaign(Campaign),
    Donation(Donation),
    Vote(VoteRecord),
}

impl Record {
    pub fn as_campaign(&self) -> Option<&Campaign> {
        match self {
            Record::Campaign(c) => Some(c),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Campaign(_) => "campaign",
            Record::Donation(_) => "donation",
            Record::Vote(_) => "vote",
        }
    }
}
