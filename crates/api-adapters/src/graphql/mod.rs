//! GraphQL schema, HTTP handlers and per-request context.

use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::Extension;
use domains::Identity;

use crate::extract::{bearer_token, ClientIp};
use crate::state::AppState;

pub mod errors;
pub mod mutation;
pub mod query;
pub mod subscription;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use subscription::SubscriptionRoot;

pub type BlogSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

pub const ENDPOINT: &str = "/graphql";
pub const SUBSCRIPTION_ENDPOINT: &str = "/graphql/ws";

/// Peer IP of the request, used as the voter identity.
#[derive(Debug, Clone)]
pub struct VoterIp(pub String);

/// Raw bearer token of the request, verified lazily by resolvers that need it.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub fn build_schema(state: AppState) -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(state)
        .finish()
}

pub fn export_schema_sdl(state: AppState) -> String {
    build_schema(state).sdl()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint(ENDPOINT)
            .subscription_endpoint(SUBSCRIPTION_ENDPOINT)
            .finish(),
    )
}

pub async fn graphql_handler(
    Extension(schema): Extension<BlogSchema>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner().data(VoterIp(ip.to_string()));
    if let Some(token) = bearer_token(&headers) {
        request = request.data(BearerToken(token.to_string()));
    }
    schema.execute(request).await.into()
}

pub(crate) fn app_state<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a AppState> {
    ctx.data::<AppState>()
}

/// The caller's identity, or `UNAUTHENTICATED` when the request carries no
/// valid token.
pub(crate) fn require_identity(ctx: &Context<'_>) -> async_graphql::Result<Identity> {
    let state = app_state(ctx)?;
    let token = ctx.data_opt::<BearerToken>().ok_or_else(errors::unauthenticated)?;
    state
        .users
        .authenticate(&token.0)
        .map_err(|_| errors::unauthenticated())
}

pub(crate) fn parse_id(label: &str, id: &async_graphql::ID) -> async_graphql::Result<i64> {
    services::validation::parse_id(label, id.as_str()).map_err(errors::to_gql)
}
