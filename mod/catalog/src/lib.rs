//! Catalog module — activity types and concrete activity occurrences.
//!
//! # Resources
//!
//! - **ActivityType** — a point-bearing category (Hackathon, Tech Event,
//!   ...). Its value is copied into logged activities at log time, so a
//!   later edit never retro-applies.
//! - **Activity** — a concrete occurrence of a type on a date, created
//!   ahead of time so members can log against it.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use societies_core::Module;
use societies_sql::SQLStore;

use crate::service::CatalogService;

/// Catalog module implementing the Module trait.
pub struct CatalogModule {
    service: Arc<CatalogService>,
}

impl CatalogModule {
    /// Create a new CatalogModule, initializing the catalog schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, societies_core::ServiceError> {
        let service = CatalogService::new(sql).map_err(societies_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying CatalogService.
    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
