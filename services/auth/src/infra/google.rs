//! Google sign-in: authorization-code flow with PKCE, then the userinfo endpoint.

use anyhow::Context as _;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::domain::repository::IdentityProvider;
use crate::domain::types::{AuthorizationRequest, FederatedProfile};
use crate::error::AuthServiceError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// OAuth client type with auth URL, token URL and redirect URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google userinfo response.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUser> for FederatedProfile {
    fn from(user: GoogleUser) -> Self {
        Self {
            provider_id: user.id,
            email: user.email,
            first_name: user.given_name,
            last_name: user.family_name,
            picture: user.picture,
        }
    }
}

#[derive(Clone)]
pub struct GoogleProvider {
    client: ConfiguredClient,
    http: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> anyhow::Result<Self> {
        let client = BasicClient::new(ClientId::new(client_id))
            .set_client_secret(ClientSecret::new(client_secret))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_owned()).context("google auth url")?)
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_owned()).context("google token url")?)
            .set_redirect_uri(RedirectUrl::new(redirect_url).context("google redirect url")?);
        // Token endpoint responses must not be followed as redirects.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build oauth http client")?;
        Ok(Self { client, http })
    }
}

impl IdentityProvider for GoogleProvider {
    fn authorization_request(&self) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_owned()))
            .add_scope(Scope::new("email".to_owned()))
            .add_scope(Scope::new("profile".to_owned()))
            .set_pkce_challenge(pkce_challenge)
            .url();
        AuthorizationRequest {
            url: url.to_string(),
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    async fn fetch_profile(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<FederatedProfile, AuthServiceError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_owned()))
            .request_async(&self.http)
            .await
            .context("exchange google authorization code")
            .map_err(AuthServiceError::FederatedFailed)?;

        let user: GoogleUser = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("fetch google userinfo")
            .map_err(AuthServiceError::FederatedFailed)?
            .json()
            .await
            .context("decode google userinfo")
            .map_err(AuthServiceError::FederatedFailed)?;
        Ok(user.into())
    }
}
