//! Campaign lookup among the records a transaction consumes.
//!
//! Linear scan; storage does not guarantee unique ids, so the first match
//! wins and "none" is an explicit outcome.

use crate::verdict::Denial;
use carefund_core::{Campaign, CampaignId, Record};

pub fn find_campaign<'a>(consumed: &'a [Record], id: &CampaignId) -> Option<&'a Campaign> {
    consumed
        .iter()
        .filter_map(Record::as_campaign)
        .find(|c| &c.id == id)
}

/// [`find_campaign`], denying with `CampaignNotFound` when absent.
pub fn require_campaign<'a>(consumed: &'a [Record], id: &CampaignId) -> Result<&'a Campaign, Denial> {
    find_campaign(consumed, id).ok_or_else(|| Denial::CampaignNotFound(id.clone()))
}
