//! Domain records, transaction context, actions, configuration and errors.
//!
//! Foundation crate -- no I/O. Everything a guard reads is defined here.

pub mod action;
pub mod config;
pub mod context;
pub mod error;
pub mod interval;
pub mod types;

pub use action::{Action, Purpose};
pub use config::{GuardConfig, RewardConfig};
pub use context::{MintedAsset, TxContext};
pub use error::{CarefundError, CarefundResult};
pub use interval::{Bound, BoundKind, ValidityInterval};
pub use types::{
    Campaign, CampaignId, CampaignStatus, DonorEntry, Donation, GovernanceAction, KeyHash,
    Lovelace, PosixTime, ProtocolParameters, Record, Verification, VoteRecord,
};
