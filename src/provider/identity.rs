//! Identity-toolkit operations: paginated account listing and lookups by
//! email or uid.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{check_status, ProviderClient};
use crate::error::{AppError, AppResult};

/// An identity account as returned by the provider.
///
/// `createdAt` / `lastLoginAt` arrive as millisecond-epoch strings; they are
/// kept raw here and converted at projection time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub provider_user_info: Vec<ProviderUserInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserInfo {
    #[serde(default)]
    pub provider_id: String,
}

impl Account {
    /// Comma-joined sign-in providers for display.
    pub fn providers(&self) -> String {
        self.provider_user_info
            .iter()
            .map(|info| info.provider_id.as_str())
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One page of accounts from the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPage {
    #[serde(default)]
    pub users: Vec<Account>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<Account>,
}

impl ProviderClient {
    /// Fetch one page of accounts. Pass the previous page's token to
    /// continue; an absent token in the response means the listing is done.
    pub async fn list_accounts(&self, page_token: Option<&str>) -> AppResult<AccountPage> {
        let url = format!("{}/accounts:batchGet", self.identity_url());

        let mut request = self
            .get(&url)
            .query(&[("maxResults", self.page_size().to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("nextPageToken", token)]);
        }

        debug!(page_token = ?page_token, "Listing identity accounts");
        let response = check_status(request.send().await?, "listing accounts").await?;
        Ok(response.json().await?)
    }

    /// Look an account up by email address.
    pub async fn lookup_by_email(&self, email: &str) -> AppResult<Account> {
        self.lookup(json!({ "email": [email] }), &format!("email {email}"))
            .await
    }

    /// Look an account up by uid.
    pub async fn lookup_by_uid(&self, uid: &str) -> AppResult<Account> {
        self.lookup(json!({ "localId": [uid] }), &format!("uid {uid}"))
            .await
    }

    async fn lookup(&self, body: Value, what: &str) -> AppResult<Account> {
        let url = format!("{}/accounts:lookup", self.identity_url());

        debug!(lookup = %what, "Looking up identity account");
        let response = check_status(self.post(&url).json(&body).send().await?, "account lookup")
            .await?;
        let lookup: LookupResponse = response.json().await?;

        lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("no user with {what}")))
    }
}
