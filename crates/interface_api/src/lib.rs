//! HTTP API Layer
//!
//! This crate provides the REST API for the invoicing core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for invoices, customers and catalog items
//! - **Middleware**: Request ids, tracing and request logging
//! - **DTOs**: Request/Response data transfer objects, validated on entry
//! - **Error Handling**: Domain errors mapped to status codes by error kind
//!
//! # Example
//!
//! ```rust,no_run
//! use interface_api::{create_router, config::ApiConfig, AppState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let state = AppState::in_memory(ApiConfig::default())?;
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_billing::{InMemoryInvoiceRepository, InvoiceService};
use domain_catalog::{
    canadian_taxes, CatalogError, InMemoryItemRepository, InMemoryProvinceRepository,
    InMemoryTaxProvider, ItemRepository,
};
use domain_party::{CustomerRepository, InMemoryCustomerRepository};

use crate::config::ApiConfig;
use crate::handlers::{customer, health, invoice, item};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InvoiceService>,
    pub customers: Arc<dyn CustomerRepository>,
    pub items: Arc<dyn ItemRepository>,
    /// Adapters checked by the readiness route
    pub adapters: Arc<[Arc<dyn HealthCheckable>]>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the service to in-memory adapters seeded with Canadian provinces
    /// and sales taxes
    pub fn in_memory(config: ApiConfig) -> Result<Self, CatalogError> {
        let seed = canadian_taxes()?;

        let invoices = Arc::new(InMemoryInvoiceRepository::new());
        let customers = Arc::new(InMemoryCustomerRepository::new());
        let items = Arc::new(InMemoryItemRepository::new());
        let taxes = Arc::new(InMemoryTaxProvider::from_seed(&seed));
        let provinces = Arc::new(InMemoryProvinceRepository::new(seed.provinces));

        let service = InvoiceService::new(
            invoices.clone(),
            customers.clone(),
            items.clone(),
            taxes.clone(),
            provinces.clone(),
        )
        .with_currency(config.currency);

        let adapters: Vec<Arc<dyn HealthCheckable>> = vec![
            invoices as Arc<dyn HealthCheckable>,
            customers.clone(),
            items.clone(),
            taxes,
            provinces,
        ];

        Ok(Self {
            service: Arc::new(service),
            customers,
            items,
            adapters: adapters.into(),
            config,
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoice::create_invoice))
        .route("/:id", get(invoice::get_invoice))
        .route("/:id/items", post(invoice::add_line_item))
        .route(
            "/:id/items/:line_id",
            put(invoice::change_line_item_quantity).delete(invoice::remove_line_item),
        )
        .route("/:id/items/:line_id/discounts", post(invoice::add_line_item_discount))
        .route("/:id/reorder", post(invoice::reorder_line_items))
        .route("/:id/discounts", post(invoice::apply_order_discount))
        .route("/:id/surcharges", post(invoice::add_surcharge))
        .route("/:id/shipping", put(invoice::set_shipping))
        .route("/:id/submit", post(invoice::submit_invoice))
        .route("/:id/send", post(invoice::send_invoice))
        .route("/:id/cancel", post(invoice::cancel_invoice))
        .route("/:id/overdue", post(invoice::mark_overdue))
        .route("/:id/payments", post(invoice::process_payment))
        .route("/:id/refunds", post(invoice::process_refund));

    // Customer routes
    let customer_routes = Router::new()
        .route("/", post(customer::create_customer))
        .route("/:id", get(customer::get_customer));

    // Catalog routes
    let item_routes = Router::new()
        .route("/", post(item::create_item))
        .route("/:id", get(item::get_item));

    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .nest("/customers", customer_routes)
        .nest("/items", item_routes);

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
