//! Domain operations: the listing, show, add, and remove flows shared by the
//! dashboard and the CLI.
//!
//! Listing merges two keyed sources: the provider's paginated account stream
//! and the `paid_users` record map. The merge is a uid lookup; everything
//! else here is timestamp conversion for display.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::provider::identity::Account;
use crate::provider::ProviderClient;
use crate::types::{PaidRecord, PaidRecordPatch, PaidUserDetail, UserSelector, UserView};
use crate::validation;

/// List every identity account, cross-referenced against the paid records.
///
/// The paid map is fetched once; accounts are then paginated sequentially
/// until the provider stops returning a page token.
pub async fn list_users(provider: &ProviderClient) -> AppResult<Vec<UserView>> {
    let paid = provider.fetch_paid_records().await?;

    let mut users = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = provider.list_accounts(page_token.as_deref()).await?;
        users.extend(page.users.iter().map(|account| project_account(account, &paid)));

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    info!(total = users.len(), "Listed users");
    Ok(users)
}

/// Show one user's detail projection, including paid-record timestamps.
pub async fn show_user(
    provider: &ProviderClient,
    selector: &UserSelector,
) -> AppResult<PaidUserDetail> {
    let account = resolve_account(provider, selector).await?;
    let record = provider.fetch_paid_record(&account.local_id).await?;
    Ok(build_detail(&account, record.as_ref()))
}

/// Mark a user as paid. Returns the resolved account for messaging.
pub async fn add_paid_user(
    provider: &ProviderClient,
    selector: &UserSelector,
) -> AppResult<Account> {
    set_paid_state(provider, selector, true).await
}

/// Unmark a paid user. Returns the resolved account for messaging.
pub async fn remove_paid_user(
    provider: &ProviderClient,
    selector: &UserSelector,
) -> AppResult<Account> {
    set_paid_state(provider, selector, false).await
}

/// Resolve a selector to a full account, validating the input first. A uid
/// lookup learns the email and vice versa, so the subsequent record write
/// always carries both.
pub async fn resolve_account(
    provider: &ProviderClient,
    selector: &UserSelector,
) -> AppResult<Account> {
    let account = match selector {
        UserSelector::Uid(uid) => {
            let uid = validation::validate_uid(uid)
                .map_err(|e| AppError::BadRequest(format!("invalid uid: {e}")))?;
            provider.lookup_by_uid(&uid).await?
        }
        UserSelector::Email(email) => {
            let email = validation::validate_email(email)
                .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
            provider.lookup_by_email(&email).await?
        }
    };

    info!(uid = %account.local_id, email = %account.email, "Resolved user");
    Ok(account)
}

async fn set_paid_state(
    provider: &ProviderClient,
    selector: &UserSelector,
    is_paid: bool,
) -> AppResult<Account> {
    let account = resolve_account(provider, selector).await?;

    let now = Utc::now().timestamp();
    let patch = PaidRecordPatch {
        uid: account.local_id.clone(),
        email: account.email.clone(),
        is_paid,
        paid_at: is_paid.then_some(now),
        unpaid_at: (!is_paid).then_some(now),
    };

    provider.patch_paid_record(&account.local_id, &patch).await?;
    info!(uid = %account.local_id, is_paid = %is_paid, "Updated paid state");
    Ok(account)
}

/// Project an account into its display row, deriving the paid flag from the
/// record map.
pub fn project_account(account: &Account, paid: &HashMap<String, PaidRecord>) -> UserView {
    UserView {
        uid: account.local_id.clone(),
        identifier: account.email.clone(),
        providers: account.providers(),
        created_at: format_millis(account.created_at.as_deref()),
        signed_in: format_millis(account.last_login_at.as_deref()),
        is_paid: paid
            .get(&account.local_id)
            .map(|record| record.is_paid)
            .unwrap_or(false),
    }
}

/// Build the detail projection, overlaying the paid record when present.
pub fn build_detail(account: &Account, record: Option<&PaidRecord>) -> PaidUserDetail {
    let mut detail = PaidUserDetail {
        uid: account.local_id.clone(),
        email: account.email.clone(),
        providers: account.providers(),
        is_paid: false,
        paid_at: String::new(),
        unpaid_at: String::new(),
        created_at: format_millis(account.created_at.as_deref()),
        signed_in: format_millis(account.last_login_at.as_deref()),
    };

    if let Some(record) = record {
        detail.is_paid = record.is_paid;
        detail.paid_at = record.paid_at.map(format_epoch_secs).unwrap_or_default();
        detail.unpaid_at = record.unpaid_at.map(format_epoch_secs).unwrap_or_default();
    }

    detail
}

/// Format a millisecond-epoch string (the identity API's timestamp encoding)
/// as RFC 3339. Unset, zero, and unparseable values render as empty.
fn format_millis(value: Option<&str>) -> String {
    value
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|millis| *millis > 0)
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Format epoch seconds (the paid-record timestamp encoding) as RFC 3339.
fn format_epoch_secs(secs: i64) -> String {
    if secs <= 0 {
        return String::new();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(uid: &str, email: &str) -> Account {
        serde_json::from_value(serde_json::json!({
            "localId": uid,
            "email": email,
            "providerUserInfo": [{"providerId": "password"}],
            "createdAt": "1693526400000",
            "lastLoginAt": "1693530000000"
        }))
        .unwrap()
    }

    #[test]
    fn format_millis_converts_wire_strings() {
        assert_eq!(format_millis(Some("1704067200000")), "2024-01-01T00:00:00Z");
        assert_eq!(format_millis(Some("0")), "");
        assert_eq!(format_millis(Some("garbage")), "");
        assert_eq!(format_millis(None), "");
    }

    #[test]
    fn format_epoch_secs_handles_unset() {
        assert_eq!(format_epoch_secs(1704067200), "2024-01-01T00:00:00Z");
        assert_eq!(format_epoch_secs(0), "");
        assert_eq!(format_epoch_secs(-5), "");
    }

    #[test]
    fn projection_derives_paid_flag_from_map() {
        let mut paid = HashMap::new();
        paid.insert(
            "u1".to_string(),
            PaidRecord {
                uid: "u1".into(),
                email: "a@example.com".into(),
                is_paid: true,
                paid_at: Some(1704067200),
                unpaid_at: None,
            },
        );
        paid.insert(
            "u3".to_string(),
            PaidRecord {
                is_paid: false,
                ..Default::default()
            },
        );

        let view = project_account(&account("u1", "a@example.com"), &paid);
        assert!(view.is_paid);
        assert_eq!(view.identifier, "a@example.com");
        assert_eq!(view.providers, "password");
        assert_eq!(view.created_at, "2023-09-01T00:00:00Z");

        // No record at all
        let view = project_account(&account("u2", "b@example.com"), &paid);
        assert!(!view.is_paid);

        // Record exists but the flag is off (previously removed user)
        let view = project_account(&account("u3", "c@example.com"), &paid);
        assert!(!view.is_paid);
    }

    #[test]
    fn detail_overlays_record_timestamps() {
        let record = PaidRecord {
            uid: "u1".into(),
            email: "a@example.com".into(),
            is_paid: false,
            paid_at: Some(1704067200),
            unpaid_at: Some(1706745600),
        };

        let detail = build_detail(&account("u1", "a@example.com"), Some(&record));
        assert!(!detail.is_paid);
        assert_eq!(detail.paid_at, "2024-01-01T00:00:00Z");
        assert_eq!(detail.unpaid_at, "2024-02-01T00:00:00Z");
        assert_eq!(detail.signed_in, "2023-09-01T01:00:00Z");

        let detail = build_detail(&account("u2", "b@example.com"), None);
        assert!(!detail.is_paid);
        assert_eq!(detail.paid_at, "");
        assert_eq!(detail.unpaid_at, "");
    }
}
