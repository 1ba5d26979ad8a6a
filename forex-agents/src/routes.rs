use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use tracing::error;

use crate::models::{supported_currencies, CurrencyPair, EMERGING_CURRENCIES, MAJOR_CURRENCIES};
use crate::pipeline::AnalysisPipeline;
use crate::progress::CollectingProgress;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub base: String,
    pub target: String,
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[get("/currencies")]
pub async fn currencies() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "major": MAJOR_CURRENCIES,
        "emerging": EMERGING_CURRENCIES,
        "all": supported_currencies(),
    }))
}

#[post("/analysis")]
pub async fn run_analysis(
    pipeline: web::Data<AnalysisPipeline>,
    request: web::Json<AnalysisRequest>,
) -> HttpResponse {
    let pair = match CurrencyPair::new(&request.base, &request.target) {
        Ok(pair) => pair,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    let progress = CollectingProgress::new();
    match pipeline.run_with_progress(&pair, &progress).await {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "markdown": report.to_markdown(),
            "report": report,
            "progress": progress.events(),
        })),
        Err(e) => {
            error!(%pair, stage = %e.stage, error = %e, "analysis failed");
            HttpResponse::BadGateway().json(serde_json::json!({
                "stage": e.stage,
                "error": e.to_string(),
                "progress": progress.events(),
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(currencies)
        .service(run_analysis);
}
