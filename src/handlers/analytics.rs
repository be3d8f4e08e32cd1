use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::analytics::{summarize, AnalyticsSummary};
use crate::directory::ServerDirectory;
use crate::filter::ServerFilter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsResponse {
    #[serde(flatten)]
    summary: AnalyticsSummary,
    per_game_line: String,
}

/// Summary over the effective list, narrowed by the same filters as `/servers`.
pub async fn get_analytics(
    directory: web::Data<ServerDirectory>,
    filter: web::Query<ServerFilter>,
) -> HttpResponse {
    let servers = directory.effective_servers().await;
    let summary = summarize(&filter.apply(&servers));
    HttpResponse::Ok().json(AnalyticsResponse {
        per_game_line: summary.per_game_line(),
        summary,
    })
}
