use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::handlers::AnalysisHandler;
use crate::models::ImagePayload;
use crate::report;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
}

pub fn create_router(handler: Arc<AnalysisHandler>) -> Router {
    let state = Arc::new(AppState { handler });

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_handler))
        .route("/history", get(history_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
    mut multipart: Multipart,
) -> Response {
    // First file field in the form is the upload; its content is passed
    // through to the model unvalidated.
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_none() {
                    continue;
                }
                let filename = field.file_name().unwrap_or("upload.jpg").to_string();
                let media_type = field.content_type().unwrap_or("image/jpeg").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((filename, media_type, bytes.to_vec()));
                        break;
                    }
                    Err(e) => {
                        log::error!("❌ Failed to read upload body: {}", e);
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "could not read uploaded file",
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("❌ Malformed multipart request: {}", e);
                return (StatusCode::UNPROCESSABLE_ENTITY, "malformed multipart request")
                    .into_response();
            }
        }
    }

    let Some((filename, media_type, data)) = upload else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "no image file in request").into_response();
    };

    let payload = ImagePayload::new(media_type, data);
    let analysis = match state.handler.analyze(&filename, payload).await {
        Ok(analysis) => analysis,
        Err(e) => {
            log::error!("❌ Analysis failed for '{}': {:#}", filename, e);
            return (StatusCode::BAD_GATEWAY, format!("Analysis failed: {}", e)).into_response();
        }
    };

    match params.format.as_deref() {
        Some("pdf") => {
            match report::pdf::render_report(&analysis.filename, &analysis.advice, &analysis.nutrients)
            {
                Ok(bytes) => (
                    [
                        (header::CONTENT_TYPE, "application/pdf"),
                        (
                            header::CONTENT_DISPOSITION,
                            "attachment; filename=\"calorie_report.pdf\"",
                        ),
                    ],
                    bytes,
                )
                    .into_response(),
                Err(e) => {
                    log::error!("❌ PDF rendering failed: {:#}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "report rendering failed").into_response()
                }
            }
        }
        Some("chart") => match report::chart::render_bar_chart(&analysis.nutrients) {
            Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
            Err(e) => {
                log::error!("❌ Chart rendering failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "chart rendering failed").into_response()
            }
        },
        _ => Json(analysis).into_response(),
    }
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let limit = params.limit.unwrap_or(5).clamp(0, 100);
    match state.handler.recent_history(limit).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            log::error!("❌ History query failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "history query failed").into_response()
        }
    }
}

async fn root_handler() -> &'static str {
    "Calorie Advisor - POST a food image to /analyze (formats: json, pdf, chart)"
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{AdvisoryService, HistoryStore};
    use anyhow::Result;

    struct StubAdvisory;

    #[async_trait::async_trait]
    impl AdvisoryService for StubAdvisory {
        async fn analyze_food_image(&self, _payload: &ImagePayload) -> Result<String> {
            Ok("Fats: 20%".to_string())
        }
    }

    #[tokio::test]
    async fn test_router_builds_with_all_routes() {
        let store = Arc::new(HistoryStore::new("sqlite::memory:").await.unwrap());
        let handler = Arc::new(AnalysisHandler::new(store, Arc::new(StubAdvisory)));

        let _router = create_router(handler);
    }
}
