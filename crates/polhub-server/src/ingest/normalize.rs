//! Row normalization: one raw row into the six partial records
//!
//! The column mapping is fixed and declarative. Missing columns become
//! `None`, malformed dates become `None`; normalization is total over any
//! input row and never fails.

use chrono::NaiveDate;

use super::types::{
    AccountRecord, AgentRecord, NormalizedRow, PolicyCarrierRecord, PolicyCategoryRecord,
    PolicyInfoRecord, RawRow, UserRecord,
};

/// Map one raw row onto the six target record shapes.
///
/// Pure and side-effect free; safe to invoke once per row, any number of
/// times, in any order.
pub fn normalize(row: &RawRow) -> NormalizedRow {
    NormalizedRow {
        agent: AgentRecord {
            agent_name: field(row, "agent"),
        },
        user: UserRecord {
            first_name: field(row, "firstname"),
            date_of_birth: date_field(row, "dob"),
            address: field(row, "address"),
            phone_number: field(row, "phone"),
            state: field(row, "state"),
            zip_code: field(row, "zip"),
            email: field(row, "email"),
            gender: field(row, "gender"),
            user_type: field(row, "userType"),
        },
        account: AccountRecord {
            account_name: field(row, "account_name"),
        },
        policy_category: PolicyCategoryRecord {
            category_name: field(row, "category_name"),
        },
        policy_carrier: PolicyCarrierRecord {
            company_name: field(row, "company_name"),
        },
        policy_info: PolicyInfoRecord {
            policy_number: field(row, "policy_number"),
            policy_start_date: date_field(row, "policy_start_date"),
            policy_end_date: date_field(row, "policy_end_date"),
            policy_category_ref: field(row, "policy_category"),
            account_ref: field(row, "collectionId"),
            carrier_ref: field(row, "companyCollectionId"),
            user_ref: field(row, "userId"),
        },
    }
}

fn field(row: &RawRow, key: &str) -> Option<String> {
    row.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn date_field(row: &RawRow, key: &str) -> Option<NaiveDate> {
    field(row, key).and_then(|v| parse_date(&v))
}

/// Parse a calendar date from the formats seen in source files.
///
/// Accepts ISO (`2024-01-31`), US-style (`01/31/2024`, `01-31-2024`), and
/// Excel serial day numbers (spreadsheet cells frequently surface dates as
/// serials). Anything else yields `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // Excel serial: days since 1899-12-30. Bound to a sane range so plain
    // numeric columns (zip codes, policy numbers) do not masquerade as dates.
    if let Ok(serial) = value.parse::<f64>() {
        let days = serial.trunc() as i64;
        if (1..=219_146).contains(&days) {
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            return epoch.checked_add_signed(chrono::Duration::days(days));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_maps_known_columns() {
        let row = row(&[
            ("firstname", "Alice"),
            ("agent", "Bob"),
            ("policy_number", "P100"),
            ("account_name", "Alice Household"),
            ("category_name", "Commercial Auto"),
            ("company_name", "Integon Gen Ins Corp"),
            ("dob", "1989-11-02"),
            ("policy_start_date", "2024-01-01"),
            ("policy_end_date", "2025-01-01"),
            ("userId", "u-123"),
        ]);

        let normalized = normalize(&row);

        assert_eq!(normalized.user.first_name.as_deref(), Some("Alice"));
        assert_eq!(normalized.agent.agent_name.as_deref(), Some("Bob"));
        assert_eq!(
            normalized.policy_info.policy_number.as_deref(),
            Some("P100")
        );
        assert_eq!(
            normalized.user.date_of_birth,
            NaiveDate::from_ymd_opt(1989, 11, 2)
        );
        assert_eq!(
            normalized.policy_info.policy_start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(normalized.policy_info.user_ref.as_deref(), Some("u-123"));
        assert_eq!(normalized.account.account_name.as_deref(), Some("Alice Household"));
    }

    #[test]
    fn test_normalize_is_total_over_empty_row() {
        let normalized = normalize(&HashMap::new());

        assert_eq!(normalized.agent, AgentRecord::default());
        assert_eq!(normalized.user, UserRecord::default());
        assert_eq!(normalized.account, AccountRecord::default());
        assert_eq!(normalized.policy_category, PolicyCategoryRecord::default());
        assert_eq!(normalized.policy_carrier, PolicyCarrierRecord::default());
        assert_eq!(normalized.policy_info, PolicyInfoRecord::default());
    }

    #[test]
    fn test_normalize_malformed_date_is_none_not_error() {
        let row = row(&[("dob", "not-a-date"), ("firstname", "Alice")]);
        let normalized = normalize(&row);

        assert_eq!(normalized.user.date_of_birth, None);
        assert_eq!(normalized.user.first_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_normalize_blank_values_become_none() {
        let row = row(&[("firstname", "   "), ("agent", "")]);
        let normalized = normalize(&row);

        assert_eq!(normalized.user.first_name, None);
        assert_eq!(normalized.agent.agent_name, None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("03/15/2024"), expected);
        assert_eq!(parse_date("03-15-2024"), expected);
    }

    #[test]
    fn test_parse_date_excel_serial() {
        // 45366 is 2024-03-15 in the 1900 date system.
        assert_eq!(parse_date("45366"), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
        // Outside the serial range; looks like an id, not a date.
        assert_eq!(parse_date("99999999"), None);
    }
}
