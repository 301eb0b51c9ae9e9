use accounts::{
    db, AccountService, Argon2Encoder, LocalMediaStore, PgStore, PushTokenRequest, Settings,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "accounts-admin")]
#[command(about = "Administrative access to the accounts database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a user without issuing a token
    CreateUser {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        avatar: String,
    },
    /// Bind an externally generated token value to a user
    IssueToken {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        token: String,
    },
    /// Show the user a token belongs to
    Whoami {
        #[arg(long)]
        token: String,
    },
    /// Register a device push token, optionally for a user
    PushToken {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: Option<i64>,
    },
}

type Service = AccountService<PgStore, Argon2Encoder, LocalMediaStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load settings")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pool = db::connect(&settings.database)
        .await
        .context("Failed to connect to database")?;

    let service: Service = AccountService::new(
        PgStore::new(pool),
        Argon2Encoder::with_settings(&settings.password)?,
        LocalMediaStore::new(settings.media.upload_dir.clone()),
    );
    run(&service, cli.command).await
}

async fn run(service: &Service, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => {
            db::migrate(service.store().pool())
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");
        }
        Commands::CreateUser {
            login,
            password,
            name,
            avatar,
        } => {
            let user = service.create(&login, &password, &name, &avatar).await?;
            tracing::info!(user_id = user.id, login = %user.login, "User created");
            println!("created user {} ({})", user.id, user.login);
        }
        Commands::IssueToken { user_id, token } => {
            service.save_initial_token(user_id, &token).await?;
            tracing::info!(user_id, "Initial token saved");
            println!("token bound to user {}", user_id);
        }
        Commands::Whoami { token } => match service.get_by_token(&token).await? {
            Some(user) => println!("{} {} {}", user.id, user.login, user.name),
            None => anyhow::bail!("unknown token"),
        },
        Commands::PushToken { token, user_id } => {
            let saved = service
                .save_push_token(&PushTokenRequest::new(token), user_id)
                .await?;
            tracing::info!(id = saved.id, user_id = saved.user_id, "Push token saved");
            println!("push token {} owned by user {}", saved.id, saved.user_id);
        }
    }
    Ok(())
}
