use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use engine::Engine;

use crate::{balances, expenses, groups, health, memberships, reports, settlements};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Builds the application router. Exposed so tests can drive the API
/// in-process without binding a listener.
pub fn app(engine: Engine, db: DatabaseConnection) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };
    router(state)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/groups", post(groups::create))
        .route("/groups/{group_id}", get(groups::get))
        .route(
            "/groups/{group_id}/members",
            get(memberships::list).post(memberships::add),
        )
        .route(
            "/groups/{group_id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            get(expenses::get_detail).delete(expenses::remove),
        )
        .route("/groups/{group_id}/balance", get(balances::get))
        .route("/groups/{group_id}/settlements", post(settlements::create))
        .route("/groups/{group_id}/activity", get(reports::group_activity))
        .route("/users/{user_id}/summary", get(reports::user_summary))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, db)).await
}
