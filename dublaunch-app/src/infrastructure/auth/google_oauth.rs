use crate::domain::Profile;
use dublaunch_errors::AppError;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: String,
    pub picture: Option<String>,
    /// Hosted domain, only present for Workspace accounts.
    pub hd: Option<String>,
}

impl GoogleUserInfo {
    pub fn into_profile(self) -> Profile {
        Profile::new(self.sub, self.email, self.name, self.picture)
    }
}

type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Google sign-in limited to one university e-mail domain.
#[derive(Clone)]
pub struct GoogleOAuth {
    client: ConfiguredClient,
    redirect_uri: RedirectUrl,
    allowed_domain: String,
    http_client: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        allowed_domain: &str,
    ) -> Result<Self, AppError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let redirect = RedirectUrl::new(redirect_uri.to_string())
            .map_err(|e| AppError::invalid(format!("GOOGLE_REDIRECT_URI: {}", e)))?;

        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url);

        Ok(Self {
            client,
            redirect_uri: redirect,
            allowed_domain: allowed_domain.trim_start_matches('@').to_lowercase(),
            http_client: reqwest::Client::new(),
        })
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    /// Authorization URL plus the CSRF state and PKCE verifier to keep in the session.
    pub fn get_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .add_extra_param("hd", self.allowed_domain.clone())
            .set_pkce_challenge(pkce_challenge)
            .url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchanges the code, fetches the user info and checks the e-mail domain.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<GoogleUserInfo, AppError> {
        let http_client = oauth2::reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(std::borrow::Cow::Borrowed(&self.redirect_uri))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .map_err(|e| {
                tracing::warn!("Token exchange failed: {:?}", e);
                AppError::Unauthenticated
            })?;

        let access_token = token_result.access_token().secret();

        let user_info = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("userinfo: {}", e)))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse user info: {}", e)))?;

        self.check_domain(&user_info)?;
        Ok(user_info)
    }

    fn check_domain(&self, info: &GoogleUserInfo) -> Result<(), AppError> {
        if !info.email_verified {
            return Err(AppError::invalid("Your Google e-mail is not verified"));
        }
        if !email_in_domain(&info.email, &self.allowed_domain) {
            tracing::info!("Rejected sign-in outside {}", self.allowed_domain);
            return Err(AppError::invalid(format!(
                "Sign in with your @{} account",
                self.allowed_domain
            )));
        }
        Ok(())
    }
}

fn email_in_domain(email: &str, domain: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oauth() -> GoogleOAuth {
        GoogleOAuth::new("id", "secret", "http://localhost:3000/auth/callback", "@UW.edu").unwrap()
    }

    fn info(email: &str, verified: bool) -> GoogleUserInfo {
        GoogleUserInfo {
            sub: "123".into(),
            email: email.into(),
            email_verified: verified,
            name: "Husky".into(),
            picture: None,
            hd: None,
        }
    }

    #[test]
    fn test_domain_is_normalized() {
        assert_eq!(oauth().allowed_domain(), "uw.edu");
    }

    #[test]
    fn test_only_university_accounts_pass() {
        let oauth = oauth();
        assert!(oauth.check_domain(&info("dawg@uw.edu", true)).is_ok());
        assert!(oauth.check_domain(&info("dawg@UW.EDU", true)).is_ok());
        assert!(oauth.check_domain(&info("dawg@gmail.com", true)).is_err());
        assert!(oauth.check_domain(&info("dawg@cs.uw.edu.evil.com", true)).is_err());
        assert!(oauth.check_domain(&info("dawg@uw.edu", false)).is_err());
    }

    #[test]
    fn test_auth_url_carries_hosted_domain() {
        let (url, _, _) = oauth().get_auth_url();
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("hd=uw.edu"));
        assert!(url.contains("code_challenge="));
    }

    #[test]
    fn test_user_info_becomes_profile() {
        let profile = info("Husky.Dawg@uw.edu", true).into_profile();
        assert_eq!(profile.provider_subject, "123");
        assert_eq!(profile.username, "husky.dawg");
    }
}
