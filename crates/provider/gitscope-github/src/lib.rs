//! Authenticated GitHub REST client.
//!
//! Every operation is a stateless pipeline: attach the caller's bearer token,
//! call GitHub, reshape the answer into this crate's normalized types.
//! Nothing is cached and nothing is retried; rate limits surface as their own
//! error kind so a higher layer can decide on backoff.

mod client;
mod error;
mod types;


pub use client::GitHubClient;
pub use error::{GitHubError, GitHubResult};
pub use types::{ContentEntry, ContentFile, DecodedFile, RepoContents, Repository, UserProfile};
