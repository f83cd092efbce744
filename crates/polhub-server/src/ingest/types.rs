//! Core types for the ingestion pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded row of a source file, keyed by header cell text.
///
/// No schema is validated before normalization; whatever columns the file
/// declares are carried through verbatim.
pub type RawRow = HashMap<String, String>;

/// Partial record naming the servicing agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_name: Option<String>,
}

/// Partial record describing the policy holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub first_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub user_type: Option<String>,
}

/// Partial record naming the user's account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_name: Option<String>,
}

/// Partial record naming the policy's category (line of business).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyCategoryRecord {
    pub category_name: Option<String>,
}

/// Partial record naming the carrier underwriting the policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyCarrierRecord {
    pub company_name: Option<String>,
}

/// Partial record holding the policy details.
///
/// The four `*_ref` fields are raw values carried over from the source row
/// verbatim; no referential resolution happens during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyInfoRecord {
    pub policy_number: Option<String>,
    pub policy_start_date: Option<NaiveDate>,
    pub policy_end_date: Option<NaiveDate>,
    pub policy_category_ref: Option<String>,
    pub account_ref: Option<String>,
    pub carrier_ref: Option<String>,
    pub user_ref: Option<String>,
}

/// The six partial records produced from one raw row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    pub agent: AgentRecord,
    pub user: UserRecord,
    pub account: AccountRecord,
    pub policy_category: PolicyCategoryRecord,
    pub policy_carrier: PolicyCarrierRecord,
    pub policy_info: PolicyInfoRecord,
}

/// Six index-aligned batches, one per record type, in source row order.
///
/// Invariant: all six vectors always have equal length; every pushed row
/// contributes exactly one entry to each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBatches {
    pub agents: Vec<AgentRecord>,
    pub users: Vec<UserRecord>,
    pub accounts: Vec<AccountRecord>,
    pub policy_categories: Vec<PolicyCategoryRecord>,
    pub policy_carriers: Vec<PolicyCarrierRecord>,
    pub policy_infos: Vec<PolicyInfoRecord>,
}

impl RecordBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one normalized row, one entry per batch.
    pub fn push(&mut self, row: NormalizedRow) {
        self.agents.push(row.agent);
        self.users.push(row.user);
        self.accounts.push(row.account);
        self.policy_categories.push(row.policy_category);
        self.policy_carriers.push(row.policy_carrier);
        self.policy_infos.push(row.policy_info);
    }

    /// Number of source rows represented (length of every batch).
    pub fn row_count(&self) -> usize {
        debug_assert!(
            self.agents.len() == self.users.len()
                && self.users.len() == self.accounts.len()
                && self.accounts.len() == self.policy_categories.len()
                && self.policy_categories.len() == self.policy_carriers.len()
                && self.policy_carriers.len() == self.policy_infos.len()
        );
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_batches_aligned() {
        let mut batches = RecordBatches::new();
        for _ in 0..3 {
            batches.push(NormalizedRow::default());
        }

        assert_eq!(batches.row_count(), 3);
        assert_eq!(batches.agents.len(), 3);
        assert_eq!(batches.users.len(), 3);
        assert_eq!(batches.accounts.len(), 3);
        assert_eq!(batches.policy_categories.len(), 3);
        assert_eq!(batches.policy_carriers.len(), 3);
        assert_eq!(batches.policy_infos.len(), 3);
    }

    #[test]
    fn test_empty_batches() {
        let batches = RecordBatches::new();
        assert!(batches.is_empty());
        assert_eq!(batches.row_count(), 0);
    }
}
