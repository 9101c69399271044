use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use serde_json::{Value, json};

use std::sync::Arc;

use crate::{ServerError, categories, expenses, export, identity::IdentityGate};
use engine::{Engine, UserId};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<IdentityGate>,
}

impl ServerState {
    pub fn new(engine: Engine, identity: IdentityGate) -> Self {
        Self {
            engine: Arc::new(engine),
            identity: Arc::new(identity),
        }
    }
}

/// The caller resolved by [`auth`], available to handlers as an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(user_id) = state.identity.resolve(request.headers()) else {
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the application router.
///
/// `/health` and `GET /categories` are public, everything else requires a
/// bearer token.
pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/categories", get(categories::list));

    let protected = Router::new()
        .route("/categories", axum::routing::post(categories::create))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/export", get(export::export_csv))
        .route("/expenses/summary", get(expenses::summary))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(protected).with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
