//! Points module — societies, the logged-activity workflow, and the
//! redemption workflow.
//!
//! # Resources
//!
//! - **Society** — point balance holder (`total_points` grows on
//!   activity approval, `used_points` on redemption approval)
//! - **LoggedActivity** — `in review → pending → approved|rejected`
//! - **RedemptionRequest** — `pending → approved|rejected`,
//!   `approved → completed`
//! - **Cohort** / **Center** — reference data for provisioning and
//!   notification routing
//!
//! Point movements are single conditional `UPDATE` statements, so a
//! redemption can never take a society's balance below zero even under
//! concurrent approvals.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use societies_core::Module;

use crate::service::PointsService;

/// Points module implementing the Module trait.
pub struct PointsModule {
    service: Arc<PointsService>,
}

impl PointsModule {
    /// Create a new PointsModule, initializing the points schema.
    pub fn new(
        sql: Arc<dyn societies_sql::SQLStore>,
        catalog: Arc<catalog::service::CatalogService>,
        auth: Arc<auth::service::AuthService>,
        notifier: Arc<dyn societies_notify::Notifier>,
    ) -> Result<Self, societies_core::ServiceError> {
        let service = PointsService::new(sql, catalog, auth, notifier)
            .map_err(societies_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying PointsService.
    pub fn service(&self) -> &Arc<PointsService> {
        &self.service
    }
}

impl Module for PointsModule {
    fn name(&self) -> &str {
        "points"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
