//! # api-adapters
//!
//! Transport layer of Rusty-Blog. Everything that speaks HTTP lives behind
//! the `web-axum` feature; the event bus, metrics and rate limiter are plain
//! building blocks usable without it.

pub mod events;
pub mod metrics;
pub mod rate_limit;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod graphql;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod rest;
#[cfg(feature = "web-axum")]
pub mod state;

pub use events::BroadcastEventBus;
pub use metrics::Metrics;
pub use rate_limit::RateLimiter;

#[cfg(feature = "web-axum")]
pub use state::{AppState, Ports};

/// Full application router: REST under `/api`, GraphQL, health and metrics.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// votes are attributed to the peer address.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> axum::Router {
    use async_graphql_axum::GraphQLSubscription;
    use axum::http::{header, HeaderValue};
    use axum::routing::get;
    use axum::{middleware::from_fn_with_state, Extension, Router};
    use tower::ServiceBuilder;
    use tower_http::compression::CompressionLayer;
    use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
    use tower_http::set_header::SetResponseHeaderLayer;
    use tower_http::trace::TraceLayer;

    let schema = graphql::build_schema(state.clone());

    Router::new()
        .route("/health", get(rest::health::health))
        .route("/metrics", get(rest::health::metrics))
        .nest("/api", rest::routes())
        .route(
            graphql::ENDPOINT,
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .route_service(graphql::SUBSCRIPTION_ENDPOINT, GraphQLSubscription::new(schema.clone()))
        .layer(Extension(schema))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=15552000; includeSubDomains"),
                ))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
