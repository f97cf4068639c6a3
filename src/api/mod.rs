mod extract;
mod handlers;

pub use extract::AuthUser;

use crate::config::Config;
use crate::db::Database;
use anyhow::Result;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Start the API server
pub async fn start_api_server(db: Arc<Database>) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        // Auth routes
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        // User routes
        .route("/users", get(handlers::users::search_users))
        .route(
            "/users/:username",
            get(handlers::users::get_user)
                .put(handlers::users::edit_user)
                .delete(handlers::users::delete_user),
        )
        .route("/users/:username/avatar", put(handlers::users::upload_avatar))
        // Follow routes
        .route("/users/:username/follow", post(handlers::follow::follow))
        .route(
            "/users/:username/unfollow",
            delete(handlers::follow::unfollow),
        )
        .route("/requests", get(handlers::follow::get_requests))
        .route(
            "/requests/:id/accept",
            post(handlers::follow::accept_request),
        )
        .route("/requests/:id", delete(handlers::follow::decline_request))
        // Post routes
        .route("/feed", get(handlers::posts::get_feed))
        .route("/posts", post(handlers::posts::create_post))
        .route(
            "/posts/:id",
            get(handlers::posts::get_post)
                .put(handlers::posts::edit_post)
                .delete(handlers::posts::delete_post),
        )
        // Comment routes
        .route(
            "/posts/:id/comments",
            post(handlers::comments::create_comment),
        )
        .route("/comments/:id", delete(handlers::comments::delete_comment))
        // Like routes
        .route(
            "/posts/:id/like",
            post(handlers::likes::like_post).delete(handlers::likes::unlike_post),
        )
        // Media routes
        .route("/media/posts/:filename", get(handlers::media::get_post_image))
        .route(
            "/media/avatars/:filename",
            get(handlers::media::get_avatar_image),
        )
        // Add state and middleware
        .with_state(db.get_pool().clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received, stopping API server");
}
