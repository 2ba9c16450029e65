//! HTTP surface for the order workflow.
//!
//! Wires the authorization gate, the order orchestrator and the
//! observability stack into one axum application. The same router serves
//! two deployments: a single process with in-memory collaborators, or the
//! order component alone talking HTTP to remote cart, product and
//! identity services.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use auth::TokenService;
use axum::Router;
use axum::routing::{get, post, put};
use common::{Money, ProductId, UserId};
use domain::{Product, Role, UserDetails};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderRepository, OrderOrchestrator, OrderRepository};
use services::{
    CartService, CartStore, IdentityService, InMemoryIdentityService, InMemoryInventoryService,
    InventoryService, UserDirectory,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<C, U, I, R> {
    pub orchestrator: OrderOrchestrator<C, U, I, R>,
    pub tokens: Arc<TokenService>,
    /// Authoritative user lookup for token refresh. Only present when the
    /// user directory runs in this process; remote deployments leave
    /// refresh to the identity service.
    pub directory: Option<Arc<dyn UserDirectory>>,
}

/// State type of the single-process deployment.
pub type MonoState = AppState<
    CartStore<InMemoryInventoryService>,
    InMemoryIdentityService,
    InMemoryInventoryService,
    InMemoryOrderRepository,
>;

/// Handles to the in-process collaborators, for seeding and tests.
pub struct MonoServices {
    pub inventory: InMemoryInventoryService,
    pub directory: InMemoryIdentityService,
    pub carts: CartStore<InMemoryInventoryService>,
}

/// Creates the axum application router with all routes and shared state.
pub fn create_app<C, U, I, R>(
    state: Arc<AppState<C, U, I, R>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let tokens = state.tokens.clone();

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let mut router = Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            post(routes::orders::place::<C, U, I, R>)
                .get(routes::orders::list_mine::<C, U, I, R>),
        )
        .route(
            "/orders/{order_number}",
            get(routes::orders::get_by_number::<C, U, I, R>)
                .delete(routes::orders::cancel::<C, U, I, R>),
        )
        .route(
            "/orders/{order_number}/status",
            put(routes::orders::update_status::<C, U, I, R>),
        );

    if state.directory.is_some() {
        router = router.route("/auth/refresh", post(routes::auth::refresh::<C, U, I, R>));
    }

    router
        .with_state(state)
        .merge(metrics_router)
        .layer(axum::middleware::from_fn_with_state(
            tokens,
            auth::authenticate,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state for the single-process deployment: all
/// collaborators in memory, wired through the same seams the distributed
/// deployment uses.
pub fn create_default_state(config: &Config) -> (Arc<MonoState>, MonoServices) {
    let inventory = InMemoryInventoryService::new();
    let directory = InMemoryIdentityService::new();
    let carts = CartStore::new(inventory.clone());

    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.access_ttl_secs,
        config.refresh_ttl_secs,
    ));

    let orchestrator = OrderOrchestrator::new(
        carts.clone(),
        directory.clone(),
        inventory.clone(),
        InMemoryOrderRepository::new(),
    )
    .with_rollback_on_failure(config.rollback_on_failure);

    let state = Arc::new(AppState {
        orchestrator,
        tokens,
        directory: Some(Arc::new(directory.clone()) as Arc<dyn UserDirectory>),
    });

    (
        state,
        MonoServices {
            inventory,
            directory,
            carts,
        },
    )
}

/// Seeds a demo catalogue and two accounts, mirroring what a fresh
/// deployment ships with.
pub fn seed_demo_data(services: &MonoServices) {
    let catalogue = [
        ("Trail Runner", 8999, 25, "Nimbus", "Shoes"),
        ("Canvas Backpack", 4500, 40, "Packline", "Bags"),
        ("Steel Bottle 750ml", 1999, 120, "Hydra", "Outdoor"),
    ];
    for (index, (name, cents, quantity, brand, category)) in catalogue.into_iter().enumerate() {
        services.inventory.seed(Product {
            id: ProductId::new(index as i64 + 1),
            name: name.to_string(),
            price: Money::from_cents(cents),
            quantity,
            image_url: Some(format!("/images/{}.png", index + 1)),
            brand: brand.to_string(),
            category: category.to_string(),
        });
    }

    services.directory.seed(UserDetails {
        id: UserId::new(1),
        username: "admin".to_string(),
        first_name: "Store".to_string(),
        last_name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        phone_number: "555-0100".to_string(),
        address: "1 Depot Rd".to_string(),
        role: Role::Admin,
    });
    services.directory.seed(UserDetails {
        id: UserId::new(2),
        username: "customer".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Doe".to_string(),
        email: "customer@example.com".to_string(),
        phone_number: "555-0101".to_string(),
        address: "42 Market St".to_string(),
        role: Role::User,
    });
}
