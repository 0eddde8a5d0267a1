//! Blocking Twitter v1.1 client.
//!
//! Only the four calls list reconciliation needs are implemented. Each fetch
//! reads a single page; accounts following more than [`MAX_PAGE_SIZE`]
//! others are truncated to that page.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::types::{ApiErrors, FriendIds, ListMembers};
use log::debug;
use reconcile::{ApplyStatus, GatewayError, Identifier, IdentifierSet, ListGateway, ListId};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default API base URL.
pub const API_BASE: &str = "https://api.twitter.com/1.1";

/// Largest page the friends and list-members endpoints return.
pub const MAX_PAGE_SIZE: u32 = 5000;

const USER_AGENT: &str = concat!("listsync/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout, connect to last byte.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Twitter API client.
///
/// # Example
///
/// ```no_run
/// use twitterkit::{Client, Credentials};
///
/// let client = Client::new(Credentials::new("ck", "cs", "at", "ats"));
/// let friends = client.friend_ids().unwrap();
/// println!("following {} accounts", friends.len());
/// ```
pub struct Client {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL.
    api_base: String,
    credentials: Credentials,
    page_size: u32,
}

impl Client {
    /// Create a client for the public API.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_api_base(credentials, API_BASE)
    }

    /// Create a client against another API base (for testing or proxies).
    #[must_use]
    pub fn with_api_base(credentials: Credentials, api_base: impl Into<String>) -> Self {
        // Apply calls report their status instead of failing on non-2xx.
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Self {
            agent,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Set the number of identifiers requested per fetch (1..=5000).
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// IDs of the accounts the authenticated user follows.
    pub fn friend_ids(&self) -> Result<Vec<i64>> {
        let params = [("count", self.page_size.to_string())];
        let page: FriendIds = self.get_json("friends/ids.json", &params)?;
        Ok(page.ids)
    }

    /// IDs of the members of a list.
    pub fn list_member_ids(&self, list_id: i64) -> Result<Vec<i64>> {
        let params = [
            ("count", self.page_size.to_string()),
            ("include_entities", "false".to_string()),
            ("list_id", list_id.to_string()),
            ("skip_status", "true".to_string()),
        ];
        let page: ListMembers = self.get_json("lists/members.json", &params)?;
        Ok(page.ids())
    }

    /// Add accounts to a list. Returns the HTTP status.
    pub fn add_members(&self, list_id: i64, user_ids: &[i64]) -> Result<u16> {
        self.post_members("lists/members/create_all.json", list_id, user_ids)
    }

    /// Remove accounts from a list. Returns the HTTP status.
    pub fn remove_members(&self, list_id: i64, user_ids: &[i64]) -> Result<u16> {
        self.post_members("lists/members/destroy_all.json", list_id, user_ids)
    }

    fn post_members(&self, path: &str, list_id: i64, user_ids: &[i64]) -> Result<u16> {
        let params = [
            ("list_id", list_id.to_string()),
            ("user_id", join_ids(user_ids)),
        ];
        self.post_form(path, &params)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        let auth = self.credentials.authorization_header("GET", &url, params)?;
        debug!("GET {url}");

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", auth.as_str())
            .header("User-Agent", USER_AGENT);
        for (key, value) in params {
            request = request.query(*key, value);
        }

        let mut response = request.call()?;
        let status = response.status().as_u16();
        if status != 200 {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(Error::http(
                format!("HTTP {status}: {}", ApiErrors::message_from_body(&body)),
                Some(status),
            ));
        }

        let body = response.body_mut().read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn post_form(&self, path: &str, params: &[(&str, String)]) -> Result<u16> {
        let url = self.url(path);
        let auth = self.credentials.authorization_header("POST", &url, params)?;
        debug!("POST {url}");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", auth.as_str())
            .header("User-Agent", USER_AGENT)
            .send_form(params.iter().map(|(k, v)| (*k, v.as_str())))?;

        Ok(response.status().as_u16())
    }
}

impl ListGateway for Client {
    fn fetch_reference_set(&self) -> std::result::Result<IdentifierSet, GatewayError> {
        Ok(self.friend_ids()?)
    }

    fn fetch_list_members(
        &self,
        list_id: ListId,
    ) -> std::result::Result<IdentifierSet, GatewayError> {
        Ok(self.list_member_ids(list_id)?)
    }

    fn add_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> std::result::Result<ApplyStatus, GatewayError> {
        Ok(ApplyStatus::new(self.add_members(list_id, ids)?))
    }

    fn remove_list_members(
        &self,
        list_id: ListId,
        ids: &[Identifier],
    ) -> std::result::Result<ApplyStatus, GatewayError> {
        Ok(ApplyStatus::new(self.remove_members(list_id, ids)?))
    }
}

/// Comma-separated IDs as the batch endpoints expect them.
fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn credentials() -> Credentials {
        Credentials::new("ck", "cs", "at", "ats")
    }

    /// Serve one canned HTTP response and hand back the raw request.
    fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0u8; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8(payload).unwrap());

            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });

        (base, handle)
    }

    #[test]
    fn test_default_api_base() {
        let client = Client::new(credentials());
        assert_eq!(client.api_base(), "https://api.twitter.com/1.1");
        assert_eq!(
            client.url("friends/ids.json"),
            "https://api.twitter.com/1.1/friends/ids.json"
        );
    }

    #[test]
    fn test_custom_api_base_trailing_slash() {
        let client = Client::with_api_base(credentials(), "http://localhost:8080/1.1/");
        assert_eq!(client.api_base(), "http://localhost:8080/1.1");
    }

    #[test]
    fn test_page_size_clamped() {
        let client = Client::new(credentials()).page_size(0);
        assert_eq!(client.page_size, 1);
        let client = Client::new(credentials()).page_size(100_000);
        assert_eq!(client.page_size, MAX_PAGE_SIZE);
        let client = Client::new(credentials()).page_size(200);
        assert_eq!(client.page_size, 200);
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[1, 22, 333]), "1,22,333");
        assert_eq!(join_ids(&[7]), "7");
        assert_eq!(join_ids(&[]), "");
    }

    #[test]
    fn test_fetch_friend_ids() {
        let (base, server) = serve_once(200, r#"{"ids":[3,1,2],"next_cursor":0}"#);
        let client = Client::with_api_base(credentials(), base).page_size(10);

        let ids = client.fetch_reference_set().unwrap();

        assert_eq!(ids, vec![3, 1, 2]);
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /friends/ids.json?count=10 "));
        assert!(request.to_ascii_lowercase().contains("authorization: oauth "));
    }

    #[test]
    fn test_fetch_list_members() {
        let (base, server) = serve_once(200, r#"{"users":[{"id":10},{"id":20}],"next_cursor":0}"#);
        let client = Client::with_api_base(credentials(), base);

        let ids = client.fetch_list_members(99).unwrap();

        assert_eq!(ids, vec![10, 20]);
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /lists/members.json?"));
        assert!(request.contains("list_id=99"));
        assert!(request.contains("skip_status=true"));
    }

    #[test]
    fn test_fetch_error_status() {
        let (base, server) = serve_once(
            404,
            r#"{"errors":[{"code":34,"message":"Sorry, that page does not exist."}]}"#,
        );
        let client = Client::with_api_base(credentials(), base);

        let err = client.list_member_ids(1).unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("does not exist"));
        server.join().unwrap();
    }

    #[test]
    fn test_add_members_posts_form() {
        let (base, server) = serve_once(200, r#"{"id":99}"#);
        let client = Client::with_api_base(credentials(), base);

        let status = client.add_list_members(99, &[1, 2, 3]).unwrap();

        assert!(status.is_success());
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /lists/members/create_all.json "));
        assert!(request.contains("list_id=99"));
        assert!(request.contains("user_id=1%2C2%2C3"));
    }

    #[test]
    fn test_remove_members_reports_rejection() {
        let (base, server) = serve_once(403, r#"{"errors":[{"code":104,"message":"no"}]}"#);
        let client = Client::with_api_base(credentials(), base);

        let status = client.remove_list_members(99, &[4]).unwrap();

        assert_eq!(status, ApplyStatus::new(403));
        assert!(!status.is_success());
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /lists/members/destroy_all.json "));
    }

    #[test]
    fn test_connection_refused_is_gateway_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = Client::with_api_base(credentials(), base);

        let err = client.fetch_reference_set().unwrap_err();

        assert!(matches!(err, GatewayError::Http { status: None, .. }));
        assert!(err.is_retryable());
    }
}
