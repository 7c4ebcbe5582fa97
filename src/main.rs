//! Standalone paid-admin binary: web dashboard plus CLI for managing paid
//! users.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    paid_admin::cli::run().await
}
