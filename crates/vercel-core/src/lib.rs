//! # vercel-core
//!
//! Shared plumbing for talking to the Vercel REST API.
//!
//! Every resource call in `vercel-api` goes through the same path: build a
//! team-scoped URL, serialise the request body, perform one HTTP round trip
//! and classify the result. This crate owns that path.
//!
//! ## Modules
//!
//! - [`client`] - The request executor and its builder
//! - [`error`] - Error taxonomy and the structured [`ApiError`]
//! - [`config`] - Client configuration and environment loading
//! - [`query`] - Query parameters and team-scoped URL building
//! - [`ids`] - Strongly-typed identifiers for API resources

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod query;

// Re-export commonly used types
pub use client::{ApiRequest, ApiResponse, ServiceClient, ServiceClientBuilder};
pub use error::{ApiError, Error, Result};
