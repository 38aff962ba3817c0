//! Proposed actions and the purpose a guard is invoked for.

use crate::types::{CampaignId, KeyHash, Lovelace, PosixTime, ProtocolParameters, Record};
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Every action any guard understands.
///
/// One closed sum type rather than one per guard: a guard handed an action
/// outside its own set denies it as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    // -- Campaign --
    CreateCampaign {
        target: Lovelace,
        deadline: PosixTime,
    },
    VerifyCampaign {
        campaign_id: CampaignId,
        document_hash: B256,
    },
    WithdrawFunds {
        campaign_id: CampaignId,
    },
    CancelCampaign {
        campaign_id: CampaignId,
    },
    CompleteCampaign {
        campaign_id: CampaignId,
    },

    // -- Donation --
    Donate {
        campaign_id: CampaignId,
        amount: Lovelace,
    },
    RequestRefund {
        campaign_id: CampaignId,
    },

    // -- Governance --
    Vote {
        campaign_id: CampaignId,
        approve: bool,
    },
    EmergencyFundRelease {
        campaign_id: CampaignId,
    },
    UpdateProtocol {
        new_parameters: ProtocolParameters,
    },

    // -- Reward mint --
    IssueReward {
        campaign_id: CampaignId,
        donor: KeyHash,
        amount: Lovelace,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateCampaign { .. } => "CreateCampaign",
            Action::VerifyCampaign { .. } => "VerifyCampaign",
            Action::WithdrawFunds { .. } => "WithdrawFunds",
            Action::CancelCampaign { .. } => "CancelCampaign",
            Action::CompleteCampaign { .. } => "CompleteCampaign",
            Action::Donate { .. } => "Donate",
            Action::RequestRefund { .. } => "RequestRefund",
            Action::Vote { .. } => "Vote",
            Action::EmergencyFundRelease { .. } => "EmergencyFundRelease",
            Action::UpdateProtocol { .. } => "UpdateProtocol",
            Action::IssueReward { .. } => "IssueReward",
        }
    }

    /// The campaign this action refers to, if it names one.
    pub fn campaign_id(&self) -> Option<&CampaignId> {
        match self {
            Action::VerifyCampaign { campaign_id, .. }
            | Action::WithdrawFunds { campaign_id }
            | Action::CancelCampaign { campaign_id }
            | Action::CompleteCampaign { campaign_id }
            | Action::Donate { campaign_id, .. }
            | Action::RequestRefund { campaign_id }
            | Action::Vote { campaign_id, .. }
            | Action::EmergencyFundRelease { campaign_id }
            | Action::IssueReward { campaign_id, .. } => Some(campaign_id),
            Action::CreateCampaign { .. } | Action::UpdateProtocol { .. } => None,
        }
    }
}

/// Why a guard is being run: to spend (transition) a record, or to approve a
/// mint under the reward policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record")]
pub enum Purpose {
    Spend(Record),
    Mint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_json_uses_tag() {
        let action: Action =
            serde_json::from_str(r#"{"action":"CancelCampaign","campaign_id":"0xabcd"}"#).unwrap();
        assert_eq!(
            action,
            Action::CancelCampaign {
                campaign_id: CampaignId::from_slice(&[0xab, 0xcd])
            }
        );
        assert_eq!(action.name(), "CancelCampaign");
    }

    #[test]
    fn create_and_update_name_no_campaign() {
        let create = Action::CreateCampaign {
            target: 1,
            deadline: 1,
        };
        assert!(create.campaign_id().is_none());
        let vote = Action::Vote {
            campaign_id: CampaignId::from("x"),
            approve: true,
        };
        assert_eq!(vote.campaign_id(), Some(&CampaignId::from("x")));
    }

    #[test]
    fn mint_purpose_has_no_record() {
        let purpose: Purpose = serde_json::from_str(r#"{"kind":"Mint"}"#).unwrap();
        assert_eq!(purpose, Purpose::Mint);
    }
}
