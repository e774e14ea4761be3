//! Typed async client for the Vercel REST API.
//!
//! [`VercelClient`] wraps the request executor from [`vercel_core`] and adds
//! one `impl` block per resource family:
//!
//! - [`projects`]: projects
//! - [`environment`]: project environment variables
//! - [`dns`]: DNS records
//! - [`edge_config`]: Edge Config stores and schemas
//! - [`drains`]: log and trace drains
//! - [`teams`]: team lookup
//!
//! ```no_run
//! # async fn run() -> vercel_api::Result<()> {
//! use vercel_api::VercelClient;
//!
//! let client = VercelClient::builder("token").with_team_id("team_123").build()?;
//! let project = client.get_project("my-site", None).await?;
//! println!("{}", project.id);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod dns;
pub mod drains;
pub mod edge_config;
pub mod environment;
pub mod projects;
pub mod teams;

pub use client::{VercelClient, VercelClientBuilder};
pub use environment::EnvironmentVariableConflict;
pub use vercel_core::config::ClientConfig;
pub use vercel_core::ids::{
    DnsRecordId, DrainId, EdgeConfigId, EnvironmentVariableId, ProjectId, TeamId,
};
pub use vercel_core::{ApiError, Error};

/// Result type for Vercel API operations.
pub type Result<T> = vercel_core::Result<T>;
