//! The GraphQL endpoint.
//!
//! `POST /graphql` executes an operation; `GET /graphql` serves GraphiQL.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::graphql::loader_config;
use crate::graphql::loaders::Loaders;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /graphql -- the in-browser IDE.
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// POST /graphql -- execute one operation as `identity`, with a loader set
/// that lives exactly as long as the request.
async fn execute(
    State(state): State<AppState>,
    identity: Identity,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let loaders = Loaders::new(
        state.pool.clone(),
        identity.author_id(),
        loader_config(&state.config),
    );

    let request = request.into_inner().data(identity).data(loaders);
    state.schema.execute(request).await.into()
}

pub fn router() -> Router<AppState> {
    Router::new().route("/graphql", get(graphiql).post(execute))
}
