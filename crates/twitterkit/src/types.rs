//! Response types for the Twitter v1.1 endpoints we use.

use serde::Deserialize;

/// `GET friends/ids.json`
#[derive(Debug, Clone, Deserialize)]
pub struct FriendIds {
    pub ids: Vec<i64>,
    #[serde(default)]
    pub next_cursor: i64,
}

/// `GET lists/members.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ListMembers {
    pub users: Vec<User>,
    #[serde(default)]
    pub next_cursor: i64,
}

impl ListMembers {
    pub fn ids(&self) -> Vec<i64> {
        self.users.iter().map(|u| u.id).collect()
    }
}

/// The parts of a user object we read.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// Error body: `{"errors":[{"code":34,"message":"..."}]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrors {
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

impl ApiErrors {
    /// Best-effort message from an error body; falls back to the raw text.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => parsed
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; "),
            _ => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_friend_ids() {
        let body = r#"{"ids":[657693,183709371,7588892],"next_cursor":0,"previous_cursor":0}"#;
        let parsed: FriendIds = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.ids, vec![657693, 183709371, 7588892]);
        assert_eq!(parsed.next_cursor, 0);
    }

    #[test]
    fn test_parse_list_members() {
        let body = r#"{
            "users": [
                {"id": 1401881, "id_str": "1401881", "screen_name": "dougw", "name": "Doug"},
                {"id": 22, "screen_name": "x"}
            ],
            "next_cursor": 0
        }"#;
        let parsed: ListMembers = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.ids(), vec![1401881, 22]);
        assert_eq!(parsed.users[0].screen_name.as_deref(), Some("dougw"));
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"errors":[{"code":34,"message":"Sorry, that page does not exist."}]}"#;
        assert_eq!(
            ApiErrors::message_from_body(body),
            "Sorry, that page does not exist. (code 34)"
        );
        assert_eq!(ApiErrors::message_from_body("  Bad Gateway\n"), "Bad Gateway");
    }
}
