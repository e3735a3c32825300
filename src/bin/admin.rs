//! CLI administration tool for relink.
//!
//! Provides commands for managing accounts and API tokens, viewing
//! statistics, and performing database operations without requiring HTTP API
//! access.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! cargo run --bin admin -- account create --username alice
//!
//! # Create a new API token for an account
//! cargo run --bin admin -- token create --account alice
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke tokens by label
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for token commands): HMAC key used to
//!   hash tokens before storage
//!
//! # Security
//!
//! - Only the HMAC-SHA256 hash of a token is stored in the database
//! - Raw tokens are displayed once and cannot be retrieved later
//! - Account passwords are hashed with Argon2id

use relink::application::services::AuthService;
use relink::domain::entities::NewAccount;
use relink::domain::repositories::{AccountRepository, TokenRepository};
use relink::infrastructure::persistence::{PgAccountRepository, PgTokenRepository};
use relink::utils::password::Argon2Verifier;

use anyhow::{Context, Result};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing relink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Account management subcommands.
#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Login name (unique)
        #[arg(short, long)]
        username: Option<String>,

        /// Display name shown in referral statistics
        #[arg(short, long)]
        display_name: Option<String>,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Username of the account the token belongs to
        #[arg(short, long)]
        account: Option<String>,

        /// Token label (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        label: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke tokens by label
    Revoke {
        /// Token label to revoke
        label: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Account { action } => handle_account_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches account management commands.
async fn handle_account_action(action: AccountAction, pool: &PgPool) -> Result<()> {
    let repo = PgAccountRepository::new(Arc::new(pool.clone()));

    match action {
        AccountAction::Create {
            username,
            display_name,
        } => {
            create_account(&repo, username, display_name).await?;
        }
    }

    Ok(())
}

/// Creates a new account with an interactive password prompt.
async fn create_account(
    repo: &PgAccountRepository,
    username: Option<String>,
    display_name: Option<String>,
) -> Result<()> {
    println!("{}", "Create Account".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    if repo.find_by_username(&username).await.ok().flatten().is_some() {
        println!("{}", "An account with this username already exists".red());
        return Ok(());
    }

    let display_name = match display_name {
        Some(d) => d,
        None => Input::new()
            .with_prompt("Display name")
            .with_initial_text(username.clone())
            .interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let password_hash = Argon2Verifier::hash(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let account = repo
        .create(NewAccount {
            username,
            display_name,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    println!();
    println!("{}", "Account created!".green().bold());
    println!("  ID:       {}", account.id.to_string().bright_white());
    println!("  Username: {}", account.username.cyan());
    println!();

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            account,
            label,
            yes,
        } => {
            let accounts = PgAccountRepository::new(Arc::new(pool.clone()));
            create_token(repo, &accounts, account, label, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { label } => {
            revoke_tokens(repo, label).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// # Flow
///
/// 1. Resolve the owning account by username
/// 2. Prompt for a token label (or use provided)
/// 3. Generate a random token
/// 4. Confirm creation (unless `--yes` flag)
/// 5. Hash the token with HMAC-SHA256 and store the hash
/// 6. Display the raw token once with usage instructions
async fn create_token(
    repo: Arc<PgTokenRepository>,
    accounts: &PgAccountRepository,
    account: Option<String>,
    label: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let signing_secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    let username = match account {
        Some(a) => a,
        None => Input::new().with_prompt("Account username").interact_text()?,
    };

    let account = accounts
        .find_by_username(&username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Account not found")?;

    let label = match label {
        Some(l) => l,
        None => Input::new()
            .with_prompt("Token label")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = generate_token();

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Account: {}", account.username.cyan());
    println!("  Label:   {}", label.cyan());
    println!("  Token:   {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let auth = AuthService::new(repo.clone(), signing_secret);
    let token_hash = auth.hash_token(&token_value);

    repo.create(account.id, &token_hash, &label)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list(None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<10} {:<30} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Account".bright_white().bold(),
        "Label".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(78).bright_black());

    for token in &tokens {
        let status = if token.revoked {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<3} {:<10} {:<30} {:<20} {}",
            token.id.to_string().bright_black(),
            token.account_id.to_string().bright_black(),
            token.label.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes all active tokens with the given label, after confirmation.
async fn revoke_tokens(repo: Arc<PgTokenRepository>, label: String) -> Result<()> {
    println!("{}", "Revoke API Tokens".bright_blue().bold());
    println!();
    println!("  Label: {}", label.cyan());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke all active tokens with this label?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    let revoked = repo
        .revoke_by_label(&label)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke tokens: {}", e))?;

    println!();
    if revoked == 0 {
        println!("{}", "No active tokens matched this label".yellow());
    } else {
        println!(
            "{}",
            format!("Revoked {} token(s)", revoked).green().bold()
        );
    }
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links (and referral links)
/// - Total number of recorded visits
/// - Number of accounts and active API tokens
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let referral_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE is_referral")
        .fetch_one(pool)
        .await?;

    let visits_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits")
        .fetch_one(pool)
        .await?;

    let accounts_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE NOT revoked")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:          {} ({} referral)",
        links_count.to_string().bright_green().bold(),
        referral_count.to_string().bright_green()
    );
    println!(
        "  Visits:         {}",
        visits_count.to_string().bright_green().bold()
    );
    println!(
        "  Accounts:       {}",
        accounts_count.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens:  {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a cryptographically random API token.
///
/// 32 random bytes encoded as unpadded URL-safe base64 (43 characters,
/// 256 bits of entropy).
fn generate_token() -> String {
    let mut buffer = [0u8; 32];
    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}
