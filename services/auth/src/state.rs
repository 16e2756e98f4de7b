use sea_orm::DatabaseConnection;

use matrimony_auth_types::cookie::SessionCookieConfig;

use crate::infra::db::{
    DbCodeRepository, DbOAuthStateRepository, DbSessionRepository, DbUserRepository,
};
use crate::infra::google::GoogleProvider;
use crate::usecase::dispatch::CodeDispatcher;
use crate::usecase::federated::FederatedReconciler;
use crate::usecase::otp::CodeLedger;
use crate::usecase::session::SessionIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub dispatcher: CodeDispatcher,
    /// `None` disables the federated routes.
    pub google: Option<GoogleProvider>,
    pub cookie: SessionCookieConfig,
    pub password_hash_cost: u32,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn oauth_state_repo(&self) -> DbOAuthStateRepository {
        DbOAuthStateRepository {
            db: self.db.clone(),
        }
    }

    pub fn ledger(&self) -> CodeLedger<DbCodeRepository> {
        CodeLedger {
            codes: self.code_repo(),
        }
    }

    pub fn session_issuer(&self) -> SessionIssuer<DbSessionRepository> {
        SessionIssuer {
            sessions: self.session_repo(),
            ttl_secs: self.cookie.ttl_secs,
        }
    }

    pub fn reconciler(&self) -> FederatedReconciler<DbUserRepository> {
        FederatedReconciler {
            users: self.user_repo(),
        }
    }
}
