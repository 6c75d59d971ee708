use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use podium::modules::auth::service::normalize_email;
use podium::modules::users::model::NewUser;
use podium::modules::users::store::{PgUserStore, UserStore};
use podium_auth::Role;
use podium_config::{AuthConfig, ServerConfig};
use podium_core::hash_password_with_cost;

#[derive(Parser)]
#[command(name = "podium-cli")]
#[command(about = "Podium CLI - Administrative tools for Podium", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account with any role (the API only creates USER accounts)
    CreateUser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// USER, ORGANIZER or ADMIN
        #[arg(short = 'r', long, default_value = "ADMIN")]
        role: Role,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Mark onboarding as already completed
        #[arg(long)]
        onboarded: bool,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = ServerConfig::from_env()
        .database_url
        .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;
    let pool = podium_db::connect(&database_url, 2).await?;

    match cli.command {
        Commands::CreateUser {
            email,
            name,
            role,
            password,
            onboarded,
        } => {
            podium_db::run_migrations(&pool).await?;
            handle_create_user(PgUserStore::new(pool), email, name, role, password, onboarded)
                .await
        }
        Commands::Migrate => {
            podium_db::run_migrations(&pool).await?;
            println!("✅ Migrations applied");
            Ok(())
        }
    }
}

async fn handle_create_user(
    store: PgUserStore,
    email: Option<String>,
    name: Option<String>,
    role: Role,
    password: Option<String>,
    onboarded: bool,
) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Name")
            .interact_text()
            .context("Failed to read name")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    if password.len() < 8 {
        return Err(anyhow!("Password must be at least 8 characters"));
    }

    let config = AuthConfig::from_env();
    let password_hash = hash_password_with_cost(&password, config.password_hash_cost)
        .map_err(|err| err.error)?;

    let user = store
        .create_user(NewUser {
            name,
            email: normalize_email(&email),
            password_hash,
            role,
            onboarding_completed: onboarded,
        })
        .await
        .map_err(|err| err.error)?;

    println!("\n✅ User created successfully!");
    println!("   Email: {}", user.email);
    println!("   Name: {}", user.name);
    println!("   Role: {}", user.role);
    Ok(())
}
