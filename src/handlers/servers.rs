// src/handlers/servers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde::Serialize;

use crate::analytics::population;
use crate::directory::ServerDirectory;
use crate::filter::ServerFilter;
use crate::live::RefreshOutcome;
use crate::models::server::ServerRecord;
use crate::storage::catalog::duplicate_id;
use crate::users::UserRegistry;
use crate::utils::{peer_ip, require_admin, RefreshLimiter, RequestError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerListResponse {
    pub servers: Vec<ServerRecord>,
    pub total: usize,
    pub live_players: u64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub outcome: RefreshOutcome,
    pub servers: Vec<ServerRecord>,
}

pub async fn get_servers(
    directory: web::Data<ServerDirectory>,
    filter: web::Query<ServerFilter>,
) -> HttpResponse {
    let servers = directory.effective_servers().await;
    let filtered = filter.apply(&servers);
    debug!(
        "Listing {} of {} servers for {:?}",
        filtered.len(),
        servers.len(),
        filter.0
    );

    HttpResponse::Ok().json(ServerListResponse {
        total: servers.len(),
        live_players: population(&servers).total_players,
        servers: filtered,
    })
}

pub async fn refresh_servers(
    req: HttpRequest,
    directory: web::Data<ServerDirectory>,
    rate_limiter: web::Data<RefreshLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = peer_ip(&req)?;

    // Rate Limiting
    if rate_limiter.check_key(&peer_ip).is_err() {
        error!("Rate limit exceeded for manual refresh for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let outcome = directory.force_refresh().await;
    info!("Manual refresh from {}: {:?}", peer_ip, outcome);
    let servers = directory.current_view().await;

    Ok(HttpResponse::Ok().json(RefreshResponse { outcome, servers }))
}

/// Stored catalog, without live data, in the legacy flat-list shape.
pub async fn get_catalog(
    directory: web::Data<ServerDirectory>,
) -> Result<HttpResponse, RequestError> {
    let body = directory.catalog().export_legacy()?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

pub async fn put_catalog(
    directory: web::Data<ServerDirectory>,
    users: web::Data<UserRegistry>,
    records: web::Json<Vec<ServerRecord>>,
) -> Result<HttpResponse, RequestError> {
    let admin = require_admin(&users)?;
    let records = records.into_inner();
    if let Some(id) = duplicate_id(&records) {
        return Err(RequestError::DuplicateServerId(id.to_string()));
    }

    info!("{} replaced the catalog with {} servers", admin.username, records.len());
    directory.catalog().save(records)?;
    Ok(HttpResponse::Ok().json(directory.current_view().await))
}
