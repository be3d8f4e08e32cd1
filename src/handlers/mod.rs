pub mod analytics;
pub mod auth;
pub mod index;
pub mod integrations;
pub mod servers;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::home))
        .route("/servers", web::get().to(servers::get_servers))
        .route("/servers/refresh", web::post().to(servers::refresh_servers))
        .route("/servers/catalog", web::get().to(servers::get_catalog))
        .route("/servers/catalog", web::put().to(servers::put_catalog))
        .route("/analytics", web::get().to(analytics::get_analytics))
        .route("/integrations", web::get().to(integrations::get_integrations))
        .route("/integrations", web::put().to(integrations::put_integrations))
        .route("/auth/signup", web::post().to(auth::sign_up))
        .route("/auth/login", web::post().to(auth::log_in))
        .route("/auth/logout", web::post().to(auth::log_out))
        .route("/auth/me", web::get().to(auth::me))
        .route("/account/profile", web::put().to(auth::update_profile))
        .route("/account/username", web::post().to(auth::change_username))
        .route("/account/password", web::post().to(auth::change_password))
        .route("/account/delete", web::post().to(auth::delete_account));
}
