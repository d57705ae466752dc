// Router client - AcquisitionClient over the router's HTTP web API
use crate::application::acquisition_client::{AcquisitionClient, AcquisitionError};
use crate::domain::endpoint::Endpoint;
use crate::domain::reading::{RawReading, READING_FIELDS};
use crate::infrastructure::router_xml::{check_response, extract_tag};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

const SESSION_TOKEN_PATH: &str = "api/webserver/SesTokInfo";
const LOGIN_PATH: &str = "api/user/login";
const LOGOUT_PATH: &str = "api/user/logout";
const SIGNAL_PATH: &str = "api/device/signal";
// Sent as __RequestVerificationToken; header names are case-insensitive
const TOKEN_HEADER: &str = "__requestverificationtoken";
// Login hands out the next token under this name
const LOGIN_TOKEN_HEADER: &str = "__requestverificationtokenone";
const SESSION_COOKIE: &str = "SessionID=";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Clone)]
pub struct RouterClient {
    client: reqwest::Client,
}

impl RouterClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(HeaderMap, String), AcquisitionError> {
        let response = request
            .send()
            .await
            .map_err(|e| AcquisitionError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AcquisitionError::Status { status, body });
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| AcquisitionError::Transport(e.without_url().to_string()))?;
        Ok((headers, body))
    }

    async fn get(
        &self,
        endpoint: &Endpoint,
        path: &str,
        headers: HeaderMap,
    ) -> Result<String, AcquisitionError> {
        let url = format!("{}{}", endpoint.url(), path);
        let (_, body) = self.send(self.client.get(&url).headers(headers)).await?;
        Ok(body)
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        path: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<(HeaderMap, String), AcquisitionError> {
        let url = format!("{}{}", endpoint.url(), path);
        let request = self
            .client
            .post(&url)
            .headers(headers)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        self.send(request).await
    }

    /// Session cookie and verification token from a fresh session.
    async fn session_headers(&self, endpoint: &Endpoint) -> Result<HeaderMap, AcquisitionError> {
        let body = self
            .get(endpoint, SESSION_TOKEN_PATH, HeaderMap::new())
            .await?;
        let body = check_response(&body)?;

        let mut headers = HeaderMap::new();
        if let Some(session) = extract_tag(body, "SesInfo").filter(|s| !s.is_empty()) {
            headers.insert(COOKIE, header_value(&session)?);
        }
        if let Some(token) = extract_tag(body, "TokInfo").filter(|t| !t.is_empty()) {
            headers.insert(TOKEN_HEADER, header_value(&token)?);
        }

        tracing::debug!("Got {} session headers from {}", headers.len(), endpoint.host());
        Ok(headers)
    }

    /// Log in with the session token and return the headers for the next request.
    async fn login(
        &self,
        endpoint: &Endpoint,
        mut headers: HeaderMap,
    ) -> Result<HeaderMap, AcquisitionError> {
        let token = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AcquisitionError::Malformed("router sent no session token".into()))?
            .to_string();

        let request = login_request(endpoint.username(), endpoint.password(), &token);
        let (response_headers, body) = self
            .post(endpoint, LOGIN_PATH, headers.clone(), request)
            .await?;
        check_response(&body)?;

        // The login rotates both the session cookie and the token
        if let Some(cookie) = session_cookie(&response_headers) {
            headers.insert(COOKIE, header_value(&cookie)?);
        }
        let next_token = response_headers
            .get(LOGIN_TOKEN_HEADER)
            .or_else(|| response_headers.get(TOKEN_HEADER))
            .and_then(|v| v.to_str().ok());
        if let Some(next_token) = next_token {
            // The header can carry several tokens separated by '#'
            let next_token = next_token.split('#').next().unwrap_or(next_token);
            headers.insert(TOKEN_HEADER, header_value(next_token)?);
        }

        tracing::debug!("Logged in to {}", endpoint.host());
        Ok(headers)
    }

    /// Best effort, a failed logout never fails the fetch.
    async fn logout(&self, endpoint: &Endpoint, headers: HeaderMap) {
        let request = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><request><Logout>1</Logout></request>";
        if let Err(e) = self
            .post(endpoint, LOGOUT_PATH, headers, request.to_string())
            .await
        {
            tracing::debug!("Logout from {} failed: {}", endpoint.host(), e);
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AcquisitionError> {
    HeaderValue::from_str(value)
        .map_err(|_| AcquisitionError::Malformed(format!("invalid session value: {}", value)))
}

fn sha256_base64(text: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(text.as_bytes()));
    STANDARD.encode(digest)
}

/// Login body using the router's hashed password scheme (password_type 4).
pub fn login_request(username: &str, password: &str, token: &str) -> String {
    let hashed = sha256_base64(&format!("{}{}{}", username, sha256_base64(password), token));
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><request><Username>{}</Username><Password>{}</Password><password_type>4</password_type></request>",
        username, hashed
    )
}

/// `SessionID=...` from the Set-Cookie headers, without attributes.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .find(|v| v.starts_with(SESSION_COOKIE))
        .map(str::to_string)
}

/// Map a `<response>` signal document onto a reading; absent fields stay empty.
pub fn reading_from_xml(body: &str) -> Result<RawReading, AcquisitionError> {
    let body = check_response(body)?;
    let fields: BTreeMap<String, String> = READING_FIELDS
        .iter()
        .map(|field| {
            (
                field.to_string(),
                extract_tag(body, field).unwrap_or_default(),
            )
        })
        .collect();
    Ok(RawReading::new(fields))
}

#[async_trait]
impl AcquisitionClient for RouterClient {
    async fn fetch_metrics(&self, endpoint: &Endpoint) -> Result<RawReading, AcquisitionError> {
        let headers = self.session_headers(endpoint).await?;
        let headers = self.login(endpoint, headers).await?;
        let result = self.get(endpoint, SIGNAL_PATH, headers.clone()).await;
        self.logout(endpoint, headers).await;
        reading_from_xml(&result?)
    }
}
