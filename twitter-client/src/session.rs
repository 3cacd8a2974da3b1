use marketeer_core::{CoreError, SessionCookie, TwitterApiError};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const API_BASE: &str = "https://api.x.com";

/// Public web-client bearer token, same one the browser ships with.
const DEFAULT_BEARER_TOKEN: &str =
    "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs=1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

/// How often `is_logged_in` re-checks before giving up, and the fixed pause
/// between checks.
const LOGIN_CHECK_RETRIES: u32 = 2;
const LOGIN_CHECK_DELAY: Duration = Duration::from_secs(2);

/// Authenticated handle to the posting platform.
///
/// Holds the cookie jar in the same record shape as the persisted
/// `cookies.json`, so the session store can pass cookies through untouched.
pub struct TwitterSession {
    pub(crate) client: Client,
    bearer_token: String,
    guest_token: Mutex<Option<String>>,
    cookies: Mutex<Vec<SessionCookie>>,
}

impl TwitterSession {
    pub fn new() -> Result<Self, CoreError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            bearer_token: DEFAULT_BEARER_TOKEN.to_string(),
            guest_token: Mutex::new(None),
            cookies: Mutex::new(Vec::new()),
        })
    }

    /// Replaces the whole cookie jar, e.g. from a persisted cookie file.
    pub async fn set_cookies(&self, cookies: Vec<SessionCookie>) {
        let mut jar = self.cookies.lock().await;
        debug!("Setting {} cookies on the session", cookies.len());
        *jar = cookies;
    }

    /// Snapshot of the current cookie jar, for persistence.
    pub async fn cookies(&self) -> Vec<SessionCookie> {
        self.cookies.lock().await.clone()
    }

    pub async fn logout(&self) {
        let mut jar = self.cookies.lock().await;
        jar.clear();
        *self.guest_token.lock().await = None;
        info!("Session logged out, cookie jar cleared");
    }

    async fn cookie_header(&self) -> Option<String> {
        let jar = self.cookies.lock().await;
        if jar.is_empty() {
            return None;
        }
        Some(
            jar.iter()
                .map(|c| format!("{}={}", c.key, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    async fn csrf_token(&self) -> Option<String> {
        let jar = self.cookies.lock().await;
        jar.iter().find(|c| c.key == "ct0").map(|c| c.value.clone())
    }

    async fn has_auth_cookie(&self) -> bool {
        let jar = self.cookies.lock().await;
        jar.iter().any(|c| c.key == "auth_token")
    }

    /// Builds the standard header set: bearer auth, guest token when
    /// present, cookie header, and the csrf token mirrored from `ct0`.
    pub(crate) async fn install_headers(&self, headers: &mut HeaderMap) -> Result<(), CoreError> {
        let bearer = format!("Bearer {}", self.bearer_token);
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&bearer).map_err(|e| CoreError::Internal {
                message: format!("invalid bearer header: {}", e),
            })?,
        );

        if let Some(guest) = self.guest_token.lock().await.as_deref() {
            if let Ok(value) = HeaderValue::from_str(guest) {
                headers.insert("x-guest-token", value);
            }
        }

        if let Some(cookie_header) = self.cookie_header().await {
            if let Ok(value) = HeaderValue::from_str(&cookie_header) {
                headers.insert("Cookie", value);
            }
        }

        if let Some(csrf) = self.csrf_token().await {
            if let Ok(value) = HeaderValue::from_str(&csrf) {
                headers.insert("x-csrf-token", value);
            }
        }

        Ok(())
    }

    /// Sends one API request, harvests set-cookie headers into the jar and
    /// maps error statuses onto the error taxonomy. Returns the raw JSON
    /// body; callers decide what shape to expect.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, CoreError> {
        let mut headers = HeaderMap::new();
        self.install_headers(&mut headers).await?;

        let mut builder = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        debug!("Twitter API request: {} {}", method, url);
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, url, e);
                if e.is_timeout() {
                    return Err(CoreError::TwitterApi(TwitterApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        self.store_cookies_from_headers(response.headers()).await;

        let status = response.status();
        if !status.is_success() {
            error!("Request failed with status {} for {}", status, url);
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(60);
                    warn!("Rate limited, retry after {} seconds", retry_after);
                    CoreError::TwitterApi(TwitterApiError::RateLimitExceeded { retry_after })
                }
                StatusCode::UNAUTHORIZED => CoreError::TwitterApi(TwitterApiError::NotLoggedIn),
                StatusCode::FORBIDDEN => CoreError::TwitterApi(TwitterApiError::Forbidden {
                    resource: url.to_string(),
                }),
                s if s.is_server_error() => {
                    CoreError::TwitterApi(TwitterApiError::ServerError {
                        status_code: s.as_u16(),
                    })
                }
                s => CoreError::TwitterApi(TwitterApiError::InvalidResponse {
                    details: format!("unexpected status {} for {}", s, url),
                }),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse response body for {}: {}", url, e);
            CoreError::TwitterApi(TwitterApiError::InvalidResponse {
                details: format!("unparseable body for {}", url),
            })
        })?;

        Ok(body)
    }

    /// Parses `set-cookie` headers into the jar, replacing same-key entries
    /// and skipping deletions.
    async fn store_cookies_from_headers(&self, headers: &HeaderMap) {
        let mut jar = self.cookies.lock().await;
        for header in headers.get_all("set-cookie") {
            let Ok(raw) = header.to_str() else { continue };

            let lowercase = raw.to_ascii_lowercase();
            if lowercase.contains("max-age=0")
                || lowercase.contains("max-age=-")
                || lowercase.contains("expires=thu, 01 jan 1970")
            {
                continue;
            }

            if let Some(cookie) = parse_set_cookie(raw) {
                jar.retain(|c| c.key != cookie.key);
                jar.push(cookie);
            }
        }
    }

    async fn update_guest_token(&self) -> Result<(), CoreError> {
        let url = format!("{}/1.1/guest/activate.json", API_BASE);
        let response = self.request(Method::POST, &url, None).await?;

        let guest_token = response
            .get("guest_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                CoreError::TwitterApi(TwitterApiError::AuthenticationFailed {
                    reason: "no guest token in activation response".to_string(),
                })
            })?;

        debug!("Obtained guest token");
        *self.guest_token.lock().await = Some(guest_token.to_string());
        Ok(())
    }

    /// Credential login through the onboarding task flow.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<(), CoreError> {
        info!("Starting credential login for {}", username);
        self.update_guest_token().await?;

        let init_url = format!(
            "{}/1.1/onboarding/task.json?flow_name=login",
            API_BASE
        );
        let init_body = json!({
            "flow_name": "login",
            "input_flow_data": {
                "flow_context": {
                    "debug_overrides": {},
                    "start_location": { "location": "unknown" }
                }
            }
        });
        let mut flow = self.request(Method::POST, &init_url, Some(init_body)).await?;

        let task_url = format!("{}/1.1/onboarding/task.json", API_BASE);
        loop {
            let Some(subtask_id) = flow
                .pointer("/subtasks/0/subtask_id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
            else {
                break;
            };
            let flow_token = flow
                .get("flow_token")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    CoreError::TwitterApi(TwitterApiError::AuthenticationFailed {
                        reason: "login flow returned no flow token".to_string(),
                    })
                })?
                .to_string();

            debug!("Handling login subtask: {}", subtask_id);
            let input = match subtask_id.as_str() {
                "LoginJsInstrumentationSubtask" => json!({
                    "subtask_id": subtask_id,
                    "js_instrumentation": { "response": "{}", "link": "next_link" }
                }),
                "LoginEnterUserIdentifierSSO" => json!({
                    "subtask_id": subtask_id,
                    "settings_list": {
                        "setting_responses": [{
                            "key": "user_identifier",
                            "response_data": { "text_data": { "result": username } }
                        }],
                        "link": "next_link"
                    }
                }),
                "LoginEnterPassword" => json!({
                    "subtask_id": subtask_id,
                    "enter_password": { "password": password, "link": "next_link" }
                }),
                "LoginAcid" | "LoginEnterAlternateIdentifierSubtask" => {
                    let email = email.ok_or_else(|| {
                        CoreError::TwitterApi(TwitterApiError::AuthenticationFailed {
                            reason: "email required for verification subtask".to_string(),
                        })
                    })?;
                    json!({
                        "subtask_id": subtask_id,
                        "enter_text": { "text": email, "link": "next_link" }
                    })
                }
                "AccountDuplicationCheck" => json!({
                    "subtask_id": subtask_id,
                    "check_logged_in_account": { "link": "AccountDuplicationCheck_false" }
                }),
                "LoginSuccessSubtask" => {
                    let body = json!({ "flow_token": flow_token, "subtask_inputs": [] });
                    self.request(Method::POST, &task_url, Some(body)).await?;
                    break;
                }
                "DenyLoginSubtask" => {
                    return Err(CoreError::TwitterApi(
                        TwitterApiError::AuthenticationFailed {
                            reason: "login denied by platform".to_string(),
                        },
                    ));
                }
                other => {
                    return Err(CoreError::TwitterApi(
                        TwitterApiError::AuthenticationFailed {
                            reason: format!("unhandled login subtask: {}", other),
                        },
                    ));
                }
            };

            let body = json!({ "flow_token": flow_token, "subtask_inputs": [input] });
            flow = self.request(Method::POST, &task_url, Some(body)).await?;
        }

        if !self.has_auth_cookie().await {
            return Err(CoreError::TwitterApi(
                TwitterApiError::AuthenticationFailed {
                    reason: "login flow finished without an auth cookie".to_string(),
                },
            ));
        }

        info!("Credential login succeeded");
        Ok(())
    }

    /// Checks the session against the verify-credentials endpoint, retrying
    /// a fixed number of times with a short pause. A clean 401 is a definite
    /// "no"; transient errors fall through to the next attempt.
    pub async fn is_logged_in(&self) -> Result<bool, CoreError> {
        if !self.has_auth_cookie().await {
            return Ok(false);
        }

        let url = format!("{}/1.1/account/verify_credentials.json", API_BASE);
        let mut last_error = None;
        for attempt in 0..=LOGIN_CHECK_RETRIES {
            match self.request(Method::GET, &url, None).await {
                Ok(_) => return Ok(true),
                Err(CoreError::TwitterApi(TwitterApiError::NotLoggedIn)) => return Ok(false),
                Err(e) => {
                    warn!("Login check attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                    if attempt < LOGIN_CHECK_RETRIES {
                        tokio::time::sleep(LOGIN_CHECK_DELAY).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::TwitterApi(TwitterApiError::RequestTimeout)))
    }
}

/// Parses a single `set-cookie` header value into a cookie record.
fn parse_set_cookie(raw: &str) -> Option<SessionCookie> {
    let mut parts = raw.split(';');
    let (key, value) = parts.next()?.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let mut cookie = SessionCookie {
        key: key.to_string(),
        value: value.trim().to_string(),
        domain: None,
        path: None,
        expires: None,
        secure: false,
        http_only: false,
        host_only: true,
        same_site: None,
    };

    for attr in parts {
        let attr = attr.trim();
        match attr.split_once('=') {
            Some((name, val)) => match name.trim().to_ascii_lowercase().as_str() {
                "domain" => {
                    cookie.domain = Some(val.trim().to_string());
                    cookie.host_only = false;
                }
                "path" => cookie.path = Some(val.trim().to_string()),
                "expires" => cookie.expires = Some(val.trim().to_string()),
                "samesite" => cookie.same_site = Some(val.trim().to_ascii_lowercase()),
                _ => {}
            },
            None => match attr.to_ascii_lowercase().as_str() {
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            },
        }
    }

    Some(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_cookie_full() {
        let cookie = parse_set_cookie(
            "auth_token=abc123; Domain=.x.com; Path=/; Secure; HttpOnly; SameSite=None",
        )
        .unwrap();
        assert_eq!(cookie.key, "auth_token");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain.as_deref(), Some(".x.com"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert!(!cookie.host_only);
        assert_eq!(cookie.same_site.as_deref(), Some("none"));
    }

    #[test]
    fn test_parse_set_cookie_rejects_garbage() {
        assert!(parse_set_cookie("no-equals-sign").is_none());
        assert!(parse_set_cookie("=value-without-key").is_none());
    }

    #[tokio::test]
    async fn test_cookie_jar_round_trip() {
        let session = TwitterSession::new().unwrap();
        assert!(session.cookies().await.is_empty());

        session
            .set_cookies(vec![
                SessionCookie::new("auth_token", "t"),
                SessionCookie::new("ct0", "csrf"),
            ])
            .await;

        assert!(session.has_auth_cookie().await);
        assert_eq!(session.csrf_token().await.as_deref(), Some("csrf"));
        assert_eq!(
            session.cookie_header().await.as_deref(),
            Some("auth_token=t; ct0=csrf")
        );

        session.logout().await;
        assert!(session.cookies().await.is_empty());
    }

    #[tokio::test]
    async fn test_is_logged_in_short_circuits_without_auth_cookie() {
        // No auth cookie means no network traffic and a clean "no".
        let session = TwitterSession::new().unwrap();
        assert!(!session.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_install_headers_includes_csrf() {
        let session = TwitterSession::new().unwrap();
        session
            .set_cookies(vec![SessionCookie::new("ct0", "csrf-value")])
            .await;

        let mut headers = HeaderMap::new();
        session.install_headers(&mut headers).await.unwrap();
        assert_eq!(headers.get("x-csrf-token").unwrap(), "csrf-value");
        assert!(headers.get("Authorization").is_some());
        assert_eq!(headers.get("Cookie").unwrap(), "ct0=csrf-value");
    }
}
