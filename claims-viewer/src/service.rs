use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn,
    response::{Html, Json, Redirect},
    routing::{get, post},
};
use claims_core::{
    ClaimsPage, DetailsTable, LoadState, Notice,
    render::page_html,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::telemetry::correlation_id_middleware;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "claim_number": id
        })),
    )
}

fn unavailable_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub page: ClaimsPage,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub claim: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessForm {
    #[serde(rename = "claimNumber", default)]
    pub claim_number: String,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process_form))
        .route("/reload", post(reload))
        .route("/health", get(health_check))
        .route("/api/claims", get(list_claims))
        .route("/api/claims/{claim_number}/view", get(claim_view))
        .route("/api/claims/{claim_number}/process", post(process_api))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn index(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    let view = state.page.view(query.claim.as_deref(), None).await;
    Html(page_html(&view))
}

async fn process_form(
    State(state): State<AppState>,
    Form(form): Form<ProcessForm>,
) -> (StatusCode, Html<String>) {
    let selection = Some(form.claim_number.as_str()).filter(|s| !s.is_empty());
    info!(claim_number = ?selection, "process requested from page");

    let notice = state.page.process(selection).await;
    let status = notice_status(&notice);
    let view = state.page.view(selection, Some(notice)).await;
    (status, Html(page_html(&view)))
}

async fn reload(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.page.init().await {
        warn!(error = %e, "claim reload failed");
    }
    Redirect::to("/")
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_claims(State(state): State<AppState>) -> ApiResult<Value> {
    match state.page.cache().snapshot().await {
        LoadState::Loaded(claims) => Ok(Json(json!(claims.as_ref()))),
        LoadState::Failed(e) => Err(unavailable_error("Claims are unavailable", &e.to_string())),
        LoadState::NotLoaded => Err(unavailable_error(
            "Claims are unavailable",
            "claims have not been loaded",
        )),
    }
}

async fn claim_view(
    State(state): State<AppState>,
    Path(claim_number): Path<String>,
) -> ApiResult<DetailsTable> {
    let view = state.page.view(Some(&claim_number), None).await;
    if !view.table.is_visible() {
        return Err(not_found_error("Claim not found", &claim_number));
    }
    Ok(Json(view.table))
}

async fn process_api(
    State(state): State<AppState>,
    Path(claim_number): Path<String>,
) -> (StatusCode, Json<Notice>) {
    let notice = state.page.process(Some(&claim_number)).await;
    (notice_status(&notice), Json(notice))
}

fn notice_status(notice: &Notice) -> StatusCode {
    match notice {
        Notice::Processed { .. } => StatusCode::OK,
        Notice::NoSelection => StatusCode::BAD_REQUEST,
        Notice::AlreadyProcessing { .. } => StatusCode::CONFLICT,
        Notice::Unreachable { .. } | Notice::InvalidResponse { .. } | Notice::Rejected { .. } => {
            StatusCode::BAD_GATEWAY
        }
        Notice::Misconfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use claims_core::{ClaimSchema, ClaimsError, InMemoryClaimSource};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app(source: Arc<InMemoryClaimSource>) -> Router {
        let page = ClaimsPage::new(source, ClaimSchema::default());
        let _ = page.init().await;
        build_router(AppState { page })
    }

    fn source() -> Arc<InMemoryClaimSource> {
        Arc::new(InMemoryClaimSource::new(
            serde_json::from_value(json!([
                {"claimNumber": "C1", "status": "open", "receiptImage": "http://x/r.pdf"},
                {"claimNumber": "C2", "status": "closed"}
            ]))
            .unwrap(),
        ))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn process_request(form: &str) -> Request<Body> {
        Request::post("/process")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_selection_and_table() {
        let app = app(source()).await;

        let response = app
            .oneshot(Request::get("/?claim=C1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-correlation-id"));
        let html = body_text(response).await;
        assert!(html.contains("<option value=\"C1\" selected>C1</option>"));
        assert!(html.contains("<option value=\"C2\">C2</option>"));
        assert!(html.contains("<td>status</td><td>open</td>"));
        assert!(html.contains(">View File</a>"));
    }

    #[tokio::test]
    async fn test_index_drops_unknown_claim() {
        let source = source();
        let app = app(source.clone()).await;

        let response = app
            .clone()
            .oneshot(Request::get("/?claim=C404").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("name=\"claimNumber\" value=\"\""));
        assert!(!html.contains("C404"));
        assert!(html.contains("<option value=\"C1\">C1</option>"));
        assert!(html.contains("<table id=\"claimDetails\" style=\"display:none\">"));

        // what the page posts back is an empty selection
        let response = app.oneshot(process_request("claimNumber=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(source.processed().is_empty());
    }

    #[test]
    fn test_misconfiguration_is_a_server_error() {
        let notice = Notice::Misconfigured {
            claim_number: "C1".to_string(),
            detail: "invalid configuration: bad url".to_string(),
        };
        assert_eq!(notice_status(&notice), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_process_without_selection_shows_validation() {
        let source = source();
        let app = app(source.clone()).await;

        let response = app.oneshot(process_request("claimNumber=")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Please select a claim to process"));
        assert!(source.processed().is_empty());
    }

    #[tokio::test]
    async fn test_process_form_reports_success() {
        let source = source();
        let app = app(source.clone()).await;

        let response = app.oneshot(process_request("claimNumber=C2")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Claim C2 processed successfully"));
        assert!(html.contains("<td>status</td><td>closed</td>"));
        assert_eq!(source.processed(), vec!["C2"]);
    }

    #[tokio::test]
    async fn test_process_api_failure_has_no_success_notice() {
        let app = app(source()).await;

        let response = app
            .oneshot(
                Request::post("/api/claims/C404/process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["kind"], "rejected");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_claim_view_api() {
        let app = app(source()).await;

        let response = app
            .clone()
            .oneshot(Request::get("/api/claims/C1/view").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["visible"], true);
        assert_eq!(body["rows"][2]["cell"]["type"], "link");

        let response = app
            .oneshot(Request::get("/api/claims/C9/view").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_failure_renders_unavailable_state() {
        let source = source();
        source.set_listing_failure(Some(ClaimsError::Network("connection refused".to_string())));
        let app = app(source.clone()).await;

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Claims are unavailable"));
        assert!(html.contains("action=\"/reload\""));

        let response = app
            .clone()
            .oneshot(Request::get("/api/claims").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        source.set_listing_failure(None);
        let response = app
            .clone()
            .oneshot(Request::post("/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .oneshot(Request::get("/api/claims").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(source()).await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
