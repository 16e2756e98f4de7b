use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::{info, warn};

use matrimony_auth::config::AuthConfig;
use matrimony_auth::domain::repository::CodeMailer;
use matrimony_auth::infra::google::GoogleProvider;
use matrimony_auth::infra::mailer::{ConsoleMailer, SmtpMailer};
use matrimony_auth::router::build_router;
use matrimony_auth::state::AppState;
use matrimony_auth::usecase::dispatch::CodeDispatcher;
use matrimony_auth_migration::{Migrator, MigratorTrait};
use matrimony_core::config::Config;
use matrimony_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AuthConfig::from_env().context("load auth config")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        Migrator::up(&db, None).await.context("apply migrations")?;
        info!("migrations applied");
    }

    let mailer: Arc<dyn CodeMailer> = match config.smtp() {
        Some(settings) => Arc::new(SmtpMailer::new(settings).context("build smtp mailer")?),
        None => {
            warn!("SMTP is not configured; verification codes are written to the log");
            Arc::new(ConsoleMailer)
        }
    };

    let google = match config.google_credentials() {
        Some((client_id, client_secret)) => Some(
            GoogleProvider::new(client_id, client_secret, config.google_redirect_url.clone())
                .context("build google provider")?,
        ),
        None => {
            info!("google sign-in disabled");
            None
        }
    };

    let state = AppState {
        db,
        dispatcher: CodeDispatcher {
            mailer,
            app_name: config.app_name.clone(),
        },
        google,
        cookie: config.cookie(),
        password_hash_cost: config.password_hash_cost,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
