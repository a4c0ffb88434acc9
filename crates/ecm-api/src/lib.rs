// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ecm-api
//!
//! HTTP API for the EC case-management backend.
//!
//! This crate provides the security core and the REST surface around it:
//!
//! - **Token Service**: signs and verifies session tokens ([`auth::TokenService`])
//! - **Authenticator**: credential login and token identification
//! - **Access Policy**: role gate then ownership gate for every protected call
//! - **Server**: axum router, auth middleware, and request handlers
//!
//! ## Example
//!
//! ```rust,ignore
//! use ecm_api::{ApiServerBuilder, TokenService};
//!
//! let server = ApiServerBuilder::new()
//!     .config(config.api.clone())
//!     .token_service(TokenService::from_config(&config.security.token)?)
//!     .store(store)
//!     .build()?;
//! server.run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AccessPolicy, AuthContext, AuthError, Authenticator, Caller, Claims, Decision, ResourceRef,
    TokenKeys, TokenService,
};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
