//! REST backend over `reqwest::blocking`.
//!
//! One request per call, no retries. Non-2xx responses become
//! [`CafeError::Backend`] carrying the most specific text the body offers.

use super::{Backend, UsernameChange};
use crate::error::{CafeError, Result};
use crate::model::{
    Cafe, CafeId, CafeReviews, NewReview, Registration, ReviewId, ReviewReceipt, UserId,
    UserProfile, UserSummary,
};
use crate::session::{Session, SessionContext};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ProfileUpdate<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserSearchResponse {
    #[serde(default)]
    users: Vec<UserSummary>,
}

#[derive(Debug, Deserialize)]
struct FriendsResponse {
    #[serde(default)]
    friends: Vec<UserSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    new_username: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
    session: SessionContext,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: SessionContext,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "backend request");
        self.client.request(method, self.url(path))
    }

    /// Like [`request`](Self::request) but with the bearer token attached.
    /// Fails locally, before any traffic, when nobody is logged in.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let bearer = self.session.bearer().ok_or(CafeError::NotAuthenticated)?;
        Ok(self.request(method, path).header(AUTHORIZATION, bearer))
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            debug!(status = status.as_u16(), "backend rejected request");
            return Err(backend_error(status, &body));
        }
        Ok(response.json()?)
    }
}

impl Backend for HttpBackend {
    fn login(&mut self, username: &str, password: &str) -> Result<Session> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&Credentials { username, password });
        let response: LoginResponse = self.execute(request)?;
        let mut session = Session::new(
            response.token,
            response.username.unwrap_or_else(|| username.to_string()),
        );
        session.user_id = response.id;
        Ok(session)
    }

    fn register(&mut self, form: &Registration) -> Result<String> {
        let request = self
            .request(Method::POST, "/auth/register")
            .json(&RegisterRequest {
                username: form.username.trim(),
                email: form.email.trim(),
                password: &form.password,
            });
        let response: MessageResponse = self.execute(request)?;
        Ok(response.message)
    }

    fn fetch_cafes(&self) -> Result<Vec<Cafe>> {
        self.execute(self.request(Method::GET, "/cafes"))
    }

    fn fetch_trending(&self) -> Result<Vec<Cafe>> {
        self.execute(self.request(Method::GET, "/cafes/trending"))
    }

    fn fetch_cafe(&self, id: CafeId) -> Result<Cafe> {
        self.execute(self.request(Method::GET, &format!("/cafes/{}", id)))
    }

    fn fetch_reviews(&self, cafe_id: CafeId) -> Result<CafeReviews> {
        self.execute(self.request(Method::GET, &format!("/reviews/cafe/{}", cafe_id)))
    }

    fn submit_review(&mut self, cafe_id: CafeId, review: &NewReview) -> Result<ReviewReceipt> {
        let request = self
            .authed(Method::POST, &format!("/reviews/cafe/{}", cafe_id))?
            .json(review);
        self.execute(request)
    }

    fn delete_review(&mut self, review_id: ReviewId) -> Result<ReviewReceipt> {
        let request = self.authed(Method::DELETE, &format!("/reviews/{}", review_id))?;
        self.execute(request)
    }

    fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        let request = self
            .authed(Method::GET, "/users/search")?
            .query(&[("query", query)]);
        let response: UserSearchResponse = self.execute(request)?;
        Ok(response.users)
    }

    fn friends(&self) -> Result<Vec<UserSummary>> {
        let response: FriendsResponse = self.execute(self.authed(Method::GET, "/users/friends")?)?;
        Ok(response.friends)
    }

    fn add_friend(&mut self, friend_id: UserId) -> Result<String> {
        let request = self.authed(Method::POST, &format!("/users/add-friend/{}", friend_id))?;
        let response: MessageResponse = self.execute(request)?;
        Ok(response.message)
    }

    fn remove_friend(&mut self, friend_id: UserId) -> Result<String> {
        let request = self.authed(
            Method::DELETE,
            &format!("/users/remove-friend/{}", friend_id),
        )?;
        let response: MessageResponse = self.execute(request)?;
        Ok(response.message)
    }

    fn update_username(&mut self, new_username: &str) -> Result<UsernameChange> {
        let current = self.session.require()?;
        let request = self
            .authed(Method::PUT, "/users/profile")?
            .json(&ProfileUpdate {
                username: new_username,
            });
        let response: ProfileUpdateResponse = self.execute(request)?;
        Ok(UsernameChange {
            message: response.message,
            new_username: response
                .new_username
                .unwrap_or_else(|| new_username.to_string()),
            token: response.token.unwrap_or(current.token),
        })
    }

    fn current_user(&self) -> Result<UserSummary> {
        self.execute(self.authed(Method::GET, "/users/me")?)
    }

    fn user_profile(&self, user_id: UserId) -> Result<UserProfile> {
        let request = self.authed(Method::GET, &format!("/users/{}/profile", user_id))?;
        self.execute(request)
    }
}

/// Builds the error for a rejected request from its status and raw body.
fn backend_error(status: StatusCode, body: &str) -> CafeError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| error_message(&value))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    CafeError::Backend {
        status: status.as_u16(),
        message,
    }
}

/// First available text in an error body: `error`, then `message`, then the
/// values of a field → message map.
fn error_message(value: &Value) -> Option<String> {
    if let Some(text) = value.as_str() {
        return Some(text.to_string());
    }
    let object = value.as_object()?;
    for key in ["error", "message"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    let fields: Vec<&str> = object.values().filter_map(Value::as_str).collect();
    if fields.is_empty() {
        None
    } else {
        Some(fields.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_wins() {
        let body = json!({"success": false, "error": "Cafe not found", "message": "x"});
        assert_eq!(error_message(&body).as_deref(), Some("Cafe not found"));
    }

    #[test]
    fn message_field_is_second_choice() {
        let body = json!({"message": "Search query cannot be empty"});
        assert_eq!(
            error_message(&body).as_deref(),
            Some("Search query cannot be empty")
        );
    }

    #[test]
    fn field_map_is_joined() {
        let body = json!({"username": "Username is already taken!"});
        assert_eq!(
            error_message(&body).as_deref(),
            Some("Username is already taken!")
        );
        assert_eq!(error_message(&json!({"count": 3})), None);
    }

    #[test]
    fn backend_error_falls_back_to_body_then_reason() {
        match backend_error(StatusCode::BAD_GATEWAY, "upstream down") {
            CafeError::Backend { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        match backend_error(StatusCode::FORBIDDEN, "") {
            CafeError::Backend { message, .. } => assert_eq!(message, "Forbidden"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new(
            "http://localhost:8080/api/",
            DEFAULT_TIMEOUT,
            SessionContext::in_memory(),
        )
        .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080/api");
        assert_eq!(backend.url("/cafes"), "http://localhost:8080/api/cafes");
    }

    #[test]
    fn authed_calls_fail_locally_without_session() {
        let backend = HttpBackend::new(
            DEFAULT_API_URL,
            DEFAULT_TIMEOUT,
            SessionContext::in_memory(),
        )
        .unwrap();
        assert!(matches!(backend.friends(), Err(CafeError::NotAuthenticated)));
        assert!(matches!(
            backend.search_users("amy"),
            Err(CafeError::NotAuthenticated)
        ));
    }
}
