use chrono::{Duration, Utc};

use matrimony_auth_types::session::SessionId;

use crate::domain::repository::{
    IdentityProvider, OAuthStateRepository, SessionRepository, UserRepository,
};
use crate::domain::types::{
    AuthMethod, FederatedProfile, NewUser, OAUTH_STATE_TTL_SECS, OAuthState, User, UserChanges,
};
use crate::error::AuthServiceError;
use crate::usecase::session::{SessionIssuer, SignedIn};
use crate::usecase::validation::normalize_email;

/// Maps a provider assertion onto exactly one local account.
///
/// Resolution order: federated id, then email (linking the federated id and marking
/// the email verified, since the provider has vouched for it), then a new account.
pub struct FederatedReconciler<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> FederatedReconciler<U>
where
    U: UserRepository,
{
    pub async fn reconcile(&self, profile: FederatedProfile) -> Result<User, AuthServiceError> {
        let email = profile.email.as_deref().map(normalize_email);

        if let Some(user) = self.resolve(&profile.provider_id, email.as_deref()).await? {
            return Ok(user);
        }

        let created = self
            .users
            .create(NewUser {
                email: email.clone(),
                auth: AuthMethod::Federated(profile.provider_id.clone()),
                first_name: profile.first_name,
                last_name: profile.last_name,
                profile_image_url: profile.picture,
                email_verified: true,
            })
            .await;
        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created from federated sign-in");
                Ok(user)
            }
            // A concurrent callback created the account first.
            Err(AuthServiceError::EmailTaken) => self
                .resolve(&profile.provider_id, email.as_deref())
                .await?
                .ok_or(AuthServiceError::EmailTaken),
            Err(e) => Err(e),
        }
    }

    async fn resolve(
        &self,
        provider_id: &str,
        email: Option<&str>,
    ) -> Result<Option<User>, AuthServiceError> {
        if let Some(user) = self.users.find_by_federated_id(provider_id).await? {
            return Ok(Some(user));
        }
        let Some(email) = email else {
            return Ok(None);
        };
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        let linked = self
            .users
            .update(
                user.id,
                UserChanges {
                    google_id: Some(provider_id.to_owned()),
                    email_verified: Some(true),
                    ..UserChanges::default()
                },
            )
            .await?;
        tracing::info!(user_id = %linked.id, "federated identity linked to existing account");
        Ok(Some(linked))
    }
}

pub struct FederatedLoginUseCase<P, O, U, S>
where
    P: IdentityProvider,
    O: OAuthStateRepository,
    U: UserRepository,
    S: SessionRepository,
{
    pub provider: P,
    pub states: O,
    pub reconciler: FederatedReconciler<U>,
    pub sessions: SessionIssuer<S>,
}

impl<P, O, U, S> FederatedLoginUseCase<P, O, U, S>
where
    P: IdentityProvider,
    O: OAuthStateRepository,
    U: UserRepository,
    S: SessionRepository,
{
    /// Persist CSRF state and PKCE verifier for `session_id`; returns the provider URL
    /// to redirect to.
    pub async fn begin(&self, session_id: &SessionId) -> Result<String, AuthServiceError> {
        let request = self.provider.authorization_request();
        let now = Utc::now();
        self.states
            .save(&OAuthState {
                state: request.csrf_state,
                session_id: session_id.clone(),
                pkce_verifier: request.pkce_verifier,
                expires_at: now + Duration::seconds(OAUTH_STATE_TTL_SECS),
                created_at: now,
            })
            .await?;
        Ok(request.url)
    }

    /// The state must have been issued to this same session by `begin`.
    pub async fn complete(
        &self,
        session_id: &SessionId,
        code: &str,
        state: &str,
    ) -> Result<SignedIn, AuthServiceError> {
        let pkce_verifier = self
            .states
            .take(state, session_id, Utc::now())
            .await?
            .ok_or_else(|| {
                AuthServiceError::FederatedFailed(anyhow::anyhow!(
                    "unknown or expired oauth state"
                ))
            })?;
        let profile = self.provider.fetch_profile(code, &pkce_verifier).await?;
        let user = self.reconciler.reconcile(profile).await?;
        self.sessions.establish(session_id, &user).await
    }
}
