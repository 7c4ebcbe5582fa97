//! Type definitions shared between the dashboard, the CLI, and the provider
//! client.

use serde::{Deserialize, Serialize};

/// Read-only projection of an identity account merged with its paid record.
///
/// This is what the dashboard table and the CLI listing render. It is never
/// persisted; the paid flag is derived by looking the account's uid up in the
/// `paid_users` store.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    /// Identity provider account id
    pub uid: String,
    /// Primary identifier (email address)
    pub identifier: String,
    /// Sign-in providers attached to the account
    pub providers: String,
    /// Account creation time, RFC 3339
    pub created_at: String,
    /// Last sign-in time, RFC 3339 (empty when the account never signed in)
    pub signed_in: String,
    /// Whether a paid record with `isPaid: true` exists for this uid
    pub is_paid: bool,
}

/// A stored paid record, keyed by uid under the fixed `paid_users` path.
///
/// Wire field names are camelCase, matching what the store has always held.
/// Records are created on first add and updated in place afterwards; they are
/// never deleted, so an unpaid user keeps their historical `paidAt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaidRecord {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "isPaid", default)]
    pub is_paid: bool,
    /// Epoch seconds of the most recent add
    #[serde(rename = "paidAt", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    /// Epoch seconds of the most recent remove
    #[serde(rename = "unPaidAt", skip_serializing_if = "Option::is_none")]
    pub unpaid_at: Option<i64>,
}

/// Partial write applied to a paid record on add/remove.
///
/// Only one of the two timestamps is ever present; the database merge-upsert
/// leaves the other untouched.
#[derive(Debug, Clone, Serialize)]
pub struct PaidRecordPatch {
    pub uid: String,
    pub email: String,
    #[serde(rename = "isPaid")]
    pub is_paid: bool,
    #[serde(rename = "paidAt", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(rename = "unPaidAt", skip_serializing_if = "Option::is_none")]
    pub unpaid_at: Option<i64>,
}

/// Detail projection for a single user, including paid-record timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct PaidUserDetail {
    pub uid: String,
    pub email: String,
    pub providers: String,
    pub is_paid: bool,
    /// RFC 3339, empty when the user was never marked paid
    pub paid_at: String,
    /// RFC 3339, empty when the user was never unmarked
    pub unpaid_at: String,
    pub created_at: String,
    pub signed_in: String,
}

/// JSON reply of the dashboard's add/remove endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Selects a user by uid or by email.
///
/// Uid lookups resolve the email and vice versa, so downstream writes always
/// carry both fields.
#[derive(Debug, Clone)]
pub enum UserSelector {
    Uid(String),
    Email(String),
}

impl std::fmt::Display for UserSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserSelector::Uid(uid) => write!(f, "uid={uid}"),
            UserSelector::Email(email) => write!(f, "email={email}"),
        }
    }
}
