use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use matrimony_auth_schema::{
    login_logs, oauth_states, one_time_codes, pending_verifications, sessions, users,
};
use matrimony_auth_types::session::SessionId;

use crate::domain::repository::{
    OAuthStateRepository, OneTimeCodeRepository, SessionRepository, UserRepository,
};
use crate::domain::types::{
    AuthMethod, CodePurpose, NewUser, OAuthState, OneTimeCode, PendingAction,
    PendingVerification, SessionState, User, UserChanges,
};
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_federated_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::GoogleId.eq(google_id))
            .one(&self.db)
            .await
            .context("find user by google id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthServiceError> {
        let now = Utc::now();
        let (password_hash, google_id) = match user.auth {
            AuthMethod::Password(hash) => (Some(hash), None),
            AuthMethod::Federated(id) => (None, Some(id)),
        };
        let inserted = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(user.email),
            password_hash: Set(password_hash),
            google_id: Set(google_id),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            profile_image_url: Set(user.profile_image_url),
            email_verified: Set(user.email_verified),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok(user_from_model(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AuthServiceError::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AuthServiceError> {
        let model = users::ActiveModel {
            id: Set(id),
            password_hash: changes.password_hash.map_or(NotSet, |h| Set(Some(h))),
            google_id: changes.google_id.map_or(NotSet, |g| Set(Some(g))),
            email_verified: changes.email_verified.map_or(NotSet, Set),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user")?;
        Ok(user_from_model(model))
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        google_id: model.google_id,
        first_name: model.first_name,
        last_name: model.last_name,
        profile_image_url: model.profile_image_url,
        email_verified: model.email_verified,
        is_admin: model.is_admin,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── One-time code repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
}

impl OneTimeCodeRepository for DbCodeRepository {
    async fn insert(&self, code: &OneTimeCode) -> Result<(), AuthServiceError> {
        one_time_codes::ActiveModel {
            id: Set(code.id),
            email: Set(code.email.clone()),
            code: Set(code.code.clone()),
            purpose: Set(code.purpose.as_str().to_owned()),
            expires_at: Set(code.expires_at),
            consumed: Set(code.consumed),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert one-time code")?;
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        let candidate: Option<Uuid> = one_time_codes::Entity::find()
            .select_only()
            .column(one_time_codes::Column::Id)
            .filter(one_time_codes::Column::Email.eq(email))
            .filter(one_time_codes::Column::Code.eq(code))
            .filter(one_time_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(one_time_codes::Column::Consumed.eq(false))
            .filter(one_time_codes::Column::ExpiresAt.gt(now))
            .into_tuple()
            .one(&self.db)
            .await
            .context("find redeemable one-time code")?;
        let Some(id) = candidate else {
            return Ok(false);
        };

        // The guard on `consumed` makes the flip a compare-and-set: of two racing
        // verifiers only one sees an affected row.
        let result = one_time_codes::Entity::update_many()
            .col_expr(one_time_codes::Column::Consumed, Expr::value(true))
            .filter(one_time_codes::Column::Id.eq(id))
            .filter(one_time_codes::Column::Consumed.eq(false))
            .filter(one_time_codes::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume one-time code")?;
        Ok(result.rows_affected == 1)
    }
}

// ── Session repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

fn session_failure<E>(context: &'static str) -> impl FnOnce(E) -> AuthServiceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| AuthServiceError::Session(anyhow::Error::new(e).context(context))
}

impl SessionRepository for DbSessionRepository {
    async fn load(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, AuthServiceError> {
        let session = sessions::Entity::find_by_id(session_id.as_str().to_owned())
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(session_failure("load session"))?;
        let Some(session) = session else {
            return Ok(SessionState::Anonymous);
        };
        if let Some(user_id) = session.user_id {
            return Ok(SessionState::Authenticated(user_id));
        }

        let pending = pending_verifications::Entity::find_by_id(session.id)
            .filter(pending_verifications::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(session_failure("load pending verification"))?;
        Ok(pending
            .and_then(pending_from_model)
            .map_or(SessionState::Anonymous, SessionState::Pending))
    }

    async fn establish(
        &self,
        previous: &SessionId,
        session_id: &SessionId,
        user: &User,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let previous = previous.as_str().to_owned();
        let id = session_id.as_str().to_owned();
        let user_id = user.id;
        let email = user.email.clone();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    pending_verifications::Entity::delete_by_id(previous.clone())
                        .exec(txn)
                        .await?;
                    sessions::Entity::delete_by_id(previous).exec(txn).await?;
                    upsert_session(txn, id, Some(user_id), expires_at).await?;
                    login_logs::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        user_id: Set(user_id),
                        email: Set(email),
                        login_time: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .map_err(session_failure("establish session"))
    }

    async fn begin_pending(
        &self,
        session_id: &SessionId,
        pending: &PendingVerification,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let id = session_id.as_str().to_owned();
        let pending = pending.clone();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    upsert_session(txn, id.clone(), None, expires_at).await?;
                    upsert_pending(txn, id, &pending).await?;
                    Ok(())
                })
            })
            .await
            .map_err(session_failure("begin pending verification"))
    }

    async fn destroy(&self, session_id: &SessionId) -> Result<(), AuthServiceError> {
        let id = session_id.as_str().to_owned();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    pending_verifications::Entity::delete_by_id(id.clone())
                        .exec(txn)
                        .await?;
                    sessions::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(session_failure("destroy session"))
    }
}

async fn upsert_session(
    txn: &DatabaseTransaction,
    id: String,
    user_id: Option<Uuid>,
    expires_at: DateTime<Utc>,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    sessions::Entity::insert(sessions::ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(sessions::Column::Id)
            .update_columns([
                sessions::Column::UserId,
                sessions::Column::ExpiresAt,
                sessions::Column::UpdatedAt,
            ])
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

async fn upsert_pending(
    txn: &DatabaseTransaction,
    session_id: String,
    pending: &PendingVerification,
) -> Result<(), sea_orm::DbErr> {
    let (password_hash, first_name, last_name) = match &pending.action {
        PendingAction::Register {
            password_hash,
            first_name,
            last_name,
        } => (
            Some(password_hash.clone()),
            first_name.clone(),
            last_name.clone(),
        ),
        PendingAction::Login => (None, None, None),
    };
    pending_verifications::Entity::insert(pending_verifications::ActiveModel {
        session_id: Set(session_id),
        email: Set(pending.email.clone()),
        action: Set(pending.action.as_str().to_owned()),
        password_hash: Set(password_hash),
        first_name: Set(first_name),
        last_name: Set(last_name),
        expires_at: Set(pending.expires_at),
        created_at: Set(pending.created_at),
    })
    .on_conflict(
        OnConflict::column(pending_verifications::Column::SessionId)
            .update_columns([
                pending_verifications::Column::Email,
                pending_verifications::Column::Action,
                pending_verifications::Column::PasswordHash,
                pending_verifications::Column::FirstName,
                pending_verifications::Column::LastName,
                pending_verifications::Column::ExpiresAt,
                pending_verifications::Column::CreatedAt,
            ])
            .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

/// Rows with an unknown action or a register row missing its hash are ignored.
fn pending_from_model(model: pending_verifications::Model) -> Option<PendingVerification> {
    let action = match model.action.as_str() {
        "register" => PendingAction::Register {
            password_hash: model.password_hash?,
            first_name: model.first_name,
            last_name: model.last_name,
        },
        "login" => PendingAction::Login,
        _ => return None,
    };
    Some(PendingVerification {
        email: model.email,
        action,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}

// ── OAuth state repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOAuthStateRepository {
    pub db: DatabaseConnection,
}

impl OAuthStateRepository for DbOAuthStateRepository {
    async fn save(&self, state: &OAuthState) -> Result<(), AuthServiceError> {
        oauth_states::ActiveModel {
            state: Set(state.state.clone()),
            session_id: Set(state.session_id.as_str().to_owned()),
            pkce_verifier: Set(state.pkce_verifier.clone()),
            expires_at: Set(state.expires_at),
            created_at: Set(state.created_at),
        }
        .insert(&self.db)
        .await
        .context("save oauth state")?;
        Ok(())
    }

    async fn take(
        &self,
        state: &str,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AuthServiceError> {
        let Some(model) = oauth_states::Entity::find_by_id(state.to_owned())
            .filter(oauth_states::Column::SessionId.eq(session_id.as_str()))
            .filter(oauth_states::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find oauth state")?
        else {
            return Ok(None);
        };

        // Only the caller whose delete removed the row may use the verifier.
        let result = oauth_states::Entity::delete_many()
            .filter(oauth_states::Column::State.eq(model.state))
            .filter(oauth_states::Column::SessionId.eq(model.session_id))
            .filter(oauth_states::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume oauth state")?;
        Ok((result.rows_affected == 1).then_some(model.pkce_verifier))
    }
}
