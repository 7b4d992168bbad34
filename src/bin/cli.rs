use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use gatehouse::cli::{DEFAULT_SECRET_BYTES, create_admin, generate_secret};
use gatehouse_config::PasswordConfig;
use gatehouse_core::PasswordHasher;
use gatehouse_db::{PgUserRepository, init_db_pool, revert_last_migration, run_migrations};

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(about = "Gatehouse CLI - Administrative tools for Gatehouse", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending database migrations
    Migrate {
        /// Revert the most recently applied migration instead
        #[arg(long)]
        revert: bool,

        /// Skip the confirmation prompt when reverting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Print a random hex secret for JWT_SECRET
    GenerateSecret {
        /// Number of random bytes
        #[arg(short = 'b', long, default_value_t = DEFAULT_SECRET_BYTES)]
        bytes: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(name, email, password).await,
        Commands::Migrate { revert, yes } => handle_migrate(revert, yes).await,
        Commands::GenerateSecret { bytes } => {
            println!("{}", generate_secret(bytes));
            Ok(())
        }
    }
}

fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))
}

async fn handle_migrate(revert: bool, yes: bool) -> anyhow::Result<()> {
    let pool = init_db_pool(&database_url()?).await?;

    if !revert {
        run_migrations(&pool).await?;
        println!("✅ Migrations applied");
        return Ok(());
    }

    let confirmed = yes
        || Confirm::new()
            .with_prompt("Revert the most recent migration?")
            .default(false)
            .interact()?;
    if !confirmed {
        println!("Aborted");
        return Ok(());
    }

    match revert_last_migration(&pool).await? {
        Some(version) => println!("✅ Reverted migration {}", version),
        None => println!("No applied migrations to revert"),
    }
    Ok(())
}

async fn handle_create_admin(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let database_url = database_url()?;

    // Use provided values or prompt interactively
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let pool = init_db_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let users = PgUserRepository::new(pool);
    let hasher = PasswordHasher::new(PasswordConfig::from_env().bcrypt_cost);

    match create_admin(&users, &hasher, &name, &email, &password).await {
        Ok(user) => {
            println!("\n✅ Admin created successfully!");
            println!("   Id: {}", user.id);
            println!("   Email: {}", user.email);
            println!("   Name: {}", user.name);
            Ok(())
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}
