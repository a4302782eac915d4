//! Auth module — token verification, user provisioning, role catalog.
//!
//! # Resources
//!
//! - **User** — provisioned on first authenticated request from token claims
//! - **RoleRecord** — the catalog of assignable roles
//! - **user_roles** — role grants per user, resolved into a [`Principal`]
//!
//! The module exposes `/me`, `/users` and `/roles` routes and provides
//! the authentication middleware that every other module sits behind.
//!
//! [`Principal`]: societies_core::Principal

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use societies_core::Module;
use societies_sql::SQLStore;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule, initializing the auth schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, societies_core::ServiceError> {
        let service = AuthService::new(sql, config).map_err(societies_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
