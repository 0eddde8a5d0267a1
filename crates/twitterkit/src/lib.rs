//! # twitterkit
//!
//! Small blocking client for the Twitter v1.1 endpoints needed to mirror
//! "who I follow" into a list:
//!
//! | Call                                | Endpoint                              |
//! |-------------------------------------|---------------------------------------|
//! | [`Client::friend_ids`]              | `GET friends/ids.json`                |
//! | [`Client::list_member_ids`]         | `GET lists/members.json`              |
//! | [`Client::add_members`]             | `POST lists/members/create_all.json`  |
//! | [`Client::remove_members`]          | `POST lists/members/destroy_all.json` |
//!
//! Requests are signed with OAuth 1.0a user-context credentials.
//! [`Client`] implements [`reconcile::ListGateway`], so it plugs straight
//! into a [`reconcile::Reconciler`].
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::Reconciler;
//! use twitterkit::{Client, Credentials};
//!
//! let client = Client::new(Credentials::new("ck", "cs", "at", "ats"));
//! let reconciler = Reconciler::new(client, 1_234_567_890);
//! let result = reconciler.run_cycle();
//! println!("added {}", result.additions_succeeded());
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::Credentials;
pub use client::{API_BASE, Client, MAX_PAGE_SIZE};
pub use error::{Error, ErrorCategory, Result};
