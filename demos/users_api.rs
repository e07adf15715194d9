//! Small users API built on stdapi handlers
//!
//! Every route returns a `Res` or a `Fault`, and one `Dispatcher` turns them
//! into responses. Inspection callbacks log each response before it is
//! written.
//!
//! Run with:
//! ```bash
//! cargo run -p stdapi-demos --bin users_api -- --port 3000
//! curl -s localhost:3000/users/1
//! ```

use anyhow::Result;
use askama::Template;
use axum::routing::get;
use axum::{Extension, Router};
use clap::Parser;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stdapi_core::config::load_from_file;
use stdapi_core::prelude::*;
use stdapi_core::{DispatchConfig, Fault, Res};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Users API demo for stdapi")]
struct Args {
    /// HTTP port
    #[arg(short, long, env = "USERS_API_PORT", default_value = "3000")]
    port: u16,

    /// Dispatch configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u32,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

#[derive(Debug)]
struct UserStore {
    users: RwLock<BTreeMap<u32, User>>,
    next_id: AtomicU32,
}

impl UserStore {
    fn seeded() -> Self {
        let store = Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(1),
        };
        store.insert("Ada Lovelace".to_string(), "ada@example.com".to_string());
        store.insert("Grace Hopper".to_string(), "grace@example.com".to_string());
        store
    }

    fn insert(&self, name: String, email: String) -> User {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User { id, name, email };
        self.users.write().insert(id, user.clone());
        user
    }
}

#[derive(Template)]
#[template(
    source = r#"<article><h1>{{ user.name }}</h1><a href="mailto:{{ user.email }}">{{ user.email }}</a></article>"#,
    ext = "html"
)]
struct UserCard<'a> {
    user: &'a User,
}

fn store(ctx: &Context) -> Result<Arc<UserStore>, Fault> {
    ctx.extension::<Arc<UserStore>>()
        .ok_or_else(internal_server_error)
}

fn user_id(ctx: &Context) -> Result<u32, Fault> {
    ctx.param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Invalid user id"))
}

fn user_not_found(id: u32) -> Fault {
    error_message(
        StatusCode::NOT_FOUND,
        "User Not Found",
        format!("No user with id {id} exists."),
    )
}

async fn health(_ctx: Context) -> Res {
    string(StatusCode::OK, "ok")
}

async fn list_users(ctx: Context) -> Result<Res, Fault> {
    let store = store(&ctx)?;
    let users: Vec<User> = store.users.read().values().cloned().collect();
    Ok(data(StatusCode::OK, users))
}

async fn show_user(ctx: Context) -> Result<Res, Fault> {
    let store = store(&ctx)?;
    let id = user_id(&ctx)?;
    let user = store.users.read().get(&id).cloned();
    user.map(|user| data(StatusCode::OK, user))
        .ok_or_else(|| user_not_found(id))
}

async fn create_user(ctx: Context) -> Result<Res, Fault> {
    let store = store(&ctx)?;
    let new_user: NewUser = ctx.bind_json().await?;

    if !new_user.email.contains('@') {
        return Err(error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid Email",
            "The email address must contain an @.",
        ));
    }

    let user = store.insert(new_user.name, new_user.email);
    info!(user_id = user.id, "user created");
    Ok(data(StatusCode::CREATED, user))
}

async fn delete_user(ctx: Context) -> Result<Res, Fault> {
    let store = store(&ctx)?;
    let id = user_id(&ctx)?;
    let removed = store.users.write().remove(&id);
    match removed {
        Some(_) => Ok(raw_status(StatusCode::NO_CONTENT)),
        None => Err(user_not_found(id)),
    }
}

// Writes its own body and tells the dispatcher to stay out of the way.
async fn user_card(ctx: Context) -> Result<Res, Fault> {
    let store = store(&ctx)?;
    let id = user_id(&ctx)?;
    let user = store
        .users
        .read()
        .get(&id)
        .cloned()
        .ok_or_else(|| user_not_found(id))?;

    let card = UserCard { user: &user }.render().map_err(|e| {
        warn!(error = %e, user_id = id, "failed to render user card");
        internal_server_error()
    })?;
    ctx.raw(StatusCode::OK, "text/html; charset=utf-8", card.as_bytes())?;
    Ok(already_handled())
}

async fn login(_ctx: Context) -> Res {
    redirect(StatusCode::FOUND, "/users")
}

async fn teapot(_ctx: Context) -> Fault {
    raw_error_status(StatusCode::IM_A_TEAPOT)
}

fn inspection() -> Inspection {
    Inspection::new()
        .before_success(|ctx: &Context, success: &dyn Success| {
            info!(
                request_id = %ctx.request_id(),
                route = ctx.full_path().unwrap_or("-"),
                response = ?success,
                "writing response"
            );
        })
        .before_failure(|ctx: &Context, failure: &dyn Failure| {
            warn!(
                request_id = %ctx.request_id(),
                route = ctx.full_path().unwrap_or("-"),
                response = ?failure,
                "writing error response"
            );
        })
}

fn app(dispatcher: &Dispatcher, store: Arc<UserStore>) -> Router {
    Router::new()
        .route("/health", get(dispatcher.handle(health)))
        .route(
            "/users",
            get(dispatcher.handle(list_users)).post(dispatcher.handle(create_user)),
        )
        .route(
            "/users/:id",
            get(dispatcher.handle(show_user)).delete(dispatcher.handle(delete_user)),
        )
        .route("/users/:id/card", get(dispatcher.handle(user_card)))
        .route("/login", get(dispatcher.handle(login)))
        .route("/teapot", get(dispatcher.handle(teapot)))
        .layer(Extension(store))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stdapi_core=debug")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_from_file(path)?,
        None => DispatchConfig::default(),
    };
    let dispatcher = Dispatcher::new(config)?.with_inspection(inspection());

    let app = app(&dispatcher, Arc::new(UserStore::seeded()));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "users API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received terminate signal"),
    }
}
