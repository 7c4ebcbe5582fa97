//! Client operations backing the CLI subcommands.
//!
//! These talk to the provider directly (not through the dashboard), print
//! user-facing output on stdout, and keep diagnostics on tracing.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::info;

use crate::config::UserConfig;
use crate::provider::ProviderClient;
use crate::types::{UserSelector, UserView};
use crate::users;

/// List all users as an aligned table with their derived paid flag.
pub async fn list_users(config: &UserConfig) -> Result<()> {
    let provider = ProviderClient::from_user_config(config)?;
    let users = users::list_users(&provider).await?;

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    print_user_table(&users);

    let paid_total = users.iter().filter(|user| user.is_paid).count();
    println!();
    println!("{} users, {} paid", users.len(), paid_total);
    Ok(())
}

/// Print one user's detail projection, including paid-record timestamps.
pub async fn show_user(config: &UserConfig, selector: &UserSelector) -> Result<()> {
    let provider = ProviderClient::from_user_config(config)?;
    let detail = users::show_user(&provider, selector).await?;

    let paid_display = if detail.is_paid {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    };

    println!("UID:       {}", detail.uid);
    println!("Email:     {}", detail.email.bright_white());
    println!("Providers: {}", detail.providers);
    println!("Created:   {}", or_dash(&detail.created_at));
    println!("Signed in: {}", or_dash(&detail.signed_in));
    println!("Paid:      {}", paid_display);
    println!("Paid at:   {}", or_dash(&detail.paid_at));
    println!("Unpaid at: {}", or_dash(&detail.unpaid_at));
    Ok(())
}

/// Mark a user as paid.
pub async fn add_user(config: &UserConfig, selector: &UserSelector) -> Result<()> {
    let provider = ProviderClient::from_user_config(config)?;
    let account = users::add_paid_user(&provider, selector).await?;

    info!(uid = %account.local_id, "Marked user as paid");
    println!(
        "✅ Successfully added user: {} ({})",
        account.email.bright_white(),
        account.local_id
    );
    Ok(())
}

/// Remove the paid flag from a user, confirming first unless forced.
pub async fn remove_user(config: &UserConfig, selector: &UserSelector, force: bool) -> Result<()> {
    if !force {
        let confirm = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove the paid flag for {selector}?"))
            .default(false)
            .interact()?;

        if !confirm {
            println!("Removal cancelled");
            return Ok(());
        }
    }

    let provider = ProviderClient::from_user_config(config)?;
    let account = users::remove_paid_user(&provider, selector).await?;

    info!(uid = %account.local_id, "Removed paid flag");
    println!(
        "✅ Successfully removed user: {} ({})",
        account.email.bright_white(),
        account.local_id
    );
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_user_table(users: &[UserView]) {
    let id_width = column_width("Identifier", users.iter().map(|u| u.identifier.as_str()));
    let provider_width = column_width("Providers", users.iter().map(|u| u.providers.as_str()));
    let time_width = column_width(
        "Signed In",
        users
            .iter()
            .flat_map(|u| [u.created_at.as_str(), u.signed_in.as_str()]),
    );
    let uid_width = column_width("User UID", users.iter().map(|u| u.uid.as_str()));

    // Pad before colorizing; ANSI escapes would otherwise count toward the
    // field width and break the alignment.
    println!(
        "{}  {}  {}  {}  {}  {}",
        format!("{:<id_width$}", "Identifier").bold(),
        format!("{:<provider_width$}", "Providers").bold(),
        format!("{:<time_width$}", "Created").bold(),
        format!("{:<time_width$}", "Signed In").bold(),
        format!("{:<uid_width$}", "User UID").bold(),
        "Paid".bold(),
    );

    for user in users {
        let paid = if user.is_paid {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        };
        println!(
            "{:<id_width$}  {:<provider_width$}  {:<time_width$}  {:<time_width$}  {:<uid_width$}  {}",
            user.identifier, user.providers, user.created_at, user.signed_in, user.uid, paid,
        );
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .chain([header.chars().count()])
        .max()
        .unwrap_or(0)
}
