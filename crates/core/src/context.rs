//! Read-only transaction facts handed to every guard.

use crate::interval::ValidityInterval;
use crate::types::{KeyHash, PosixTime, Record};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One asset class the transaction proposes to mint under the reward policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedAsset {
    pub asset_name: Bytes,
    pub quantity: i64,
}

/// Authenticated facts about the transaction requesting a transition.
///
/// `SmallVec<[KeyHash; 4]>` keeps the usual one or two signers inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    /// Declared signers, in ledger order.
    #[serde(default)]
    pub signers: SmallVec<[KeyHash; 4]>,
    #[serde(default)]
    pub validity: ValidityInterval,
    /// Records consumed by the transaction, in ledger order.
    #[serde(default)]
    pub consumed: Vec<Record>,
    #[serde(default)]
    pub minted: Vec<MintedAsset>,
}

impl TxContext {
    pub fn new(validity: ValidityInterval) -> Self {
        Self {
            validity,
            ..Self::default()
        }
    }

    pub fn signed_by(mut self, signer: KeyHash) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn consuming(mut self, record: Record) -> Self {
        self.consumed.push(record);
        self
    }

    pub fn minting(mut self, asset_name: Bytes, quantity: i64) -> Self {
        self.minted.push(MintedAsset {
            asset_name,
            quantity,
        });
        self
    }

    #[inline]
    pub fn is_signed_by(&self, key: &KeyHash) -> bool {
        self.signers.contains(key)
    }

    /// The signer guards treat as "the" actor when one party is expected.
    #[inline]
    pub fn first_signer(&self) -> Option<&KeyHash> {
        self.signers.first()
    }

    #[inline]
    pub fn reference_time(&self) -> PosixTime {
        self.validity.reference_time()
    }
}
