//! Realtime-database operations on the `paid_users` records.
//!
//! Writes go through PATCH, which the database treats as a merge-upsert:
//! fields absent from the patch keep their stored value. That is what lets an
//! add/remove cycle preserve the opposite timestamp.

use std::collections::HashMap;

use tracing::debug;

use super::{check_status, ProviderClient};
use crate::error::AppResult;
use crate::types::{PaidRecord, PaidRecordPatch};

/// Fixed path the paid records live under.
pub const PAID_USERS_PATH: &str = "paid_users";

impl ProviderClient {
    /// Fetch every paid record, keyed by uid. An empty store serializes as
    /// JSON `null`, which maps to an empty map.
    pub async fn fetch_paid_records(&self) -> AppResult<HashMap<String, PaidRecord>> {
        let url = format!("{}/{}.json", self.database_url(), PAID_USERS_PATH);

        debug!("Reading paid records");
        let response = check_status(self.get(&url).send().await?, "reading paid records").await?;
        let records: Option<HashMap<String, PaidRecord>> = response.json().await?;
        Ok(records.unwrap_or_default())
    }

    /// Fetch the paid record for a single uid, if one exists.
    pub async fn fetch_paid_record(&self, uid: &str) -> AppResult<Option<PaidRecord>> {
        let url = format!("{}/{}/{}.json", self.database_url(), PAID_USERS_PATH, uid);

        debug!(uid = %uid, "Reading paid record");
        let response = check_status(self.get(&url).send().await?, "reading paid record").await?;
        Ok(response.json().await?)
    }

    /// Merge-upsert the paid record for a uid.
    pub async fn patch_paid_record(&self, uid: &str, patch: &PaidRecordPatch) -> AppResult<()> {
        let url = format!("{}/{}/{}.json", self.database_url(), PAID_USERS_PATH, uid);

        debug!(uid = %uid, is_paid = %patch.is_paid, "Updating paid record");
        check_status(
            self.patch(&url).json(patch).send().await?,
            "updating paid record",
        )
        .await?;
        Ok(())
    }
}
