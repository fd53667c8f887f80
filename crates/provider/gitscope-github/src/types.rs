//! Normalized GitHub API response types.
//!
//! Only the fields the rest of the system needs are kept; everything else in
//! GitHub's payloads is dropped at deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user's profile, from `GET /user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// One repository descriptor, from `GET /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    pub private: bool,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One entry in a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub entry_type: String,
}

/// File metadata with transport-encoded content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// Answer from the contents endpoint.
///
/// GitHub returns a JSON array for a directory and an object for a file; the
/// untagged enum discriminates on shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoContents {
    Directory(Vec<ContentEntry>),
    File(Box<ContentFile>),
}

/// A file with its content decoded out of the transport encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedFile {
    pub name: String,
    pub path: String,
    pub content: String,
    pub size: u64,
    pub sha: String,
}
