//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use std::sync::Arc;

use actix_web::web;
use pinboard_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. The rate limiter guards the auth
/// endpoints only; the public listing stays unthrottled.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_limiter: Arc<dyn RateLimiter>) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(auth_limiter))
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            ),
    );
}
