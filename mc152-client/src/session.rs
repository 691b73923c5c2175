//! Session authentication: the Yggdrasil token exchange and the legacy
//! join-server announcement used by online-mode servers.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::debug;


/// Default Yggdrasil authentication service.
pub const YGGDRASIL_URL: &str = "https://authserver.mojang.com";
/// Legacy session service used to announce a server join.
pub const SESSION_URL: &str = "http://session.minecraft.net/game/joinserver.jsp";


/// Errors of the session exchanges.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// The authentication service answered with an error body.
    #[error("authentication failed: {error}: {message}")]
    AuthFailed {
        error: String,
        message: String,
        cause: String,
    },
    /// The access token no longer validates.
    #[error("access token expired")]
    Expired,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}


/// The credentials produced by a successful authentication. The refresh
/// exchange rotates both tokens in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub access_token: String,
    pub client_token: String,
    /// Id of the selected game profile.
    pub profile_id: String,
    /// Name of the selected game profile.
    pub profile_name: String,
}


#[derive(Serialize)]
struct Agent {
    name: &'static str,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    agent: Agent,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_token: Option<&'a str>,
}

#[derive(Deserialize)]
struct Profile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResponse {
    access_token: String,
    client_token: String,
    selected_profile: Profile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    access_token: &'a str,
    client_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    client_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    error_message: String,
    #[serde(default)]
    cause: String,
}


/// Client for the Yggdrasil authentication endpoints.
pub struct YggdrasilClient {
    /// Base URL of the service, without a trailing slash.
    pub url: String,
    http: reqwest::blocking::Client,
}

impl Default for YggdrasilClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YggdrasilClient {

    pub fn new() -> Self {
        Self::with_url(YGGDRASIL_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Exchange the account credentials for a token pair and the selected
    /// game profile. Passing a client token asks the service to keep it.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
    ) -> Result<SessionToken, SessionError> {

        let response = self.http
            .post(format!("{}/authenticate", self.url))
            .json(&AuthenticateRequest {
                agent: Agent { name: "Minecraft", version: 1 },
                username,
                password,
                client_token,
            })
            .send()?;

        let body: AuthenticateResponse = check(response)?.json()?;
        debug!("authenticated as {}", body.selected_profile.name);

        Ok(SessionToken {
            access_token: body.access_token,
            client_token: body.client_token,
            profile_id: body.selected_profile.id,
            profile_name: body.selected_profile.name,
        })

    }

    /// Rotate the token pair in place.
    pub fn refresh(&self, token: &mut SessionToken) -> Result<(), SessionError> {

        let response = self.http
            .post(format!("{}/refresh", self.url))
            .json(&RefreshRequest {
                access_token: &token.access_token,
                client_token: &token.client_token,
            })
            .send()?;

        let body: RefreshResponse = check(response)?.json()?;
        token.access_token = body.access_token;
        token.client_token = body.client_token;
        Ok(())

    }

    /// Check that the access token is still usable, any non-success answer
    /// means it expired.
    pub fn validate(&self, token: &SessionToken) -> Result<(), SessionError> {

        let response = self.http
            .post(format!("{}/validate", self.url))
            .json(&ValidateRequest { access_token: &token.access_token })
            .send()?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionError::Expired)
        }

    }

}

/// Map a non-success answer to the error body the service returned.
fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, SessionError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let http_err = response.error_for_status_ref().err();
    match response.json::<ErrorBody>() {
        Ok(body) => Err(SessionError::AuthFailed {
            error: body.error,
            message: body.error_message,
            cause: body.cause,
        }),
        // Not a Yggdrasil error body, report the transport error.
        Err(e) => Err(SessionError::Http(http_err.unwrap_or(e))),
    }
}


/// Client for the legacy join-server announcement.
pub struct JoinClient {
    pub url: String,
    http: reqwest::blocking::Client,
}

impl Default for JoinClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinClient {

    pub fn new() -> Self {
        Self::with_url(SESSION_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Announce that the user joins the server identified by the handshake
    /// material, so that the server can verify the account.
    pub fn join_server(
        &self,
        username: &str,
        session_id: &str,
        server_id: &str,
        shared_secret: &[u8],
        public_key: &[u8],
    ) -> Result<(), SessionError> {

        let hash = server_hash(server_id, shared_secret, public_key);
        debug!("joining server {server_id:?} as {username}");

        self.http
            .get(&self.url)
            .query(&[("user", username), ("sessionId", session_id), ("serverId", &hash)])
            .send()?
            .error_for_status()?;

        Ok(())

    }

}

/// SHA-1 of the server id, the shared secret and the public key, rendered
/// the way Java prints a signed big integer in hexadecimal: lowercase, no
/// leading zeros, and a minus sign with the two's-complement magnitude for
/// digests with the high bit set.
pub fn server_hash(server_id: &str, shared_secret: &[u8], public_key: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(server_id.as_bytes());
    hasher.update(shared_secret);
    hasher.update(public_key);
    signed_hex_digest(&hasher.finalize())
}

fn signed_hex_digest(bytes: &[u8]) -> String {
    BigInt::from_signed_bytes_be(bytes).to_str_radix(16)
}
