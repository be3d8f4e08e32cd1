// src/handlers/index.rs
use actix_web::{web, HttpResponse};

use crate::analytics::home_highlights;
use crate::directory::ServerDirectory;

pub async fn home(directory: web::Data<ServerDirectory>) -> HttpResponse {
    let servers = directory.effective_servers().await;
    HttpResponse::Ok().json(home_highlights(&servers))
}
