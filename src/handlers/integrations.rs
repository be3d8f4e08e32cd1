use actix_web::{web, HttpResponse};

use crate::directory::ServerDirectory;
use crate::models::integrations::IntegrationsUpdate;
use crate::users::UserRegistry;
use crate::utils::{require_admin, RequestError};

pub async fn get_integrations(
    directory: web::Data<ServerDirectory>,
    users: web::Data<UserRegistry>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&users)?;
    Ok(HttpResponse::Ok().json(directory.catalog().integrations()))
}

/// Saves the integrations panel. The catalog itself is left alone.
pub async fn put_integrations(
    directory: web::Data<ServerDirectory>,
    users: web::Data<UserRegistry>,
    update: web::Json<IntegrationsUpdate>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&users)?;
    let config = directory.catalog().update_integrations(update.into_inner())?;
    Ok(HttpResponse::Ok().json(config))
}
