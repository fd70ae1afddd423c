//! REST API for the spending dashboard
//!
//! Serves the ledger computed at startup. Aggregates are recomputed per
//! request; only `/api/ask` reaches the text generator.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::aggregator::{
    daily_category_totals, monthly_category_totals, total_by_period, weekly_category_totals,
    yearly_category_totals, CategoryTotals, PeriodFlow,
};
use crate::models::Transaction;
use crate::summarizer::Summarizer;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardData {
    pub daily: CategoryTotals,
    pub weekly: CategoryTotals,
    pub monthly: CategoryTotals,
    pub yearly: CategoryTotals,
    pub totals: BTreeMap<String, PeriodFlow>,
}

impl DashboardData {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            daily: daily_category_totals(transactions),
            weekly: weekly_category_totals(transactions),
            monthly: monthly_category_totals(transactions),
            yearly: yearly_category_totals(transactions),
            totals: total_by_period(transactions),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub transactions: Arc<Vec<Transaction>>,
    pub summarizer: Arc<Summarizer>,
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn ask(
    State(state): State<ApiState>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let question = req.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Question must not be empty".into())),
        );
    }

    info!("Received question: {}", question);

    let monthly = monthly_category_totals(&state.transactions);
    match state.summarizer.summarize(&monthly, question).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "answer": answer }))),
        ),
        Err(e) => {
            error!("Question failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Could not answer question: {}", e))),
            )
        }
    }
}

async fn dashboard(State(state): State<ApiState>) -> Json<ApiResponse> {
    Json(ApiResponse::success(DashboardData::from_transactions(
        &state.transactions,
    )))
}

async fn transactions(State(state): State<ApiState>) -> Json<ApiResponse> {
    Json(ApiResponse::success(state.transactions.as_slice()))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/ask", post(ask))
        .route("/api/dashboard", get(dashboard))
        .route("/api/transactions", get(transactions))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Dashboard listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::gemini::TextGenerator;
    use crate::models::Category;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::DateTime;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> crate::Result<String> {
            if prompt.contains("fail please") {
                return Err(TrackerError::LlmError("boom".to_string()));
            }
            Ok(format!("prompt had {} lines", prompt.lines().count()))
        }
    }

    fn state() -> ApiState {
        let transactions = vec![
            Transaction {
                merchant_name: "Coles".to_string(),
                category: Some(Category::Groceries),
                amount: Decimal::new(-4500, 2),
                date: DateTime::parse_from_rfc3339("2025-03-05T10:00:00+11:00").unwrap(),
                transfer_account: None,
            },
            Transaction {
                merchant_name: "Salary".to_string(),
                category: Some(Category::Friends),
                amount: Decimal::new(250000, 2),
                date: DateTime::parse_from_rfc3339("2025-03-14T10:00:00+11:00").unwrap(),
                transfer_account: None,
            },
        ];
        ApiState {
            transactions: Arc::new(transactions),
            summarizer: Arc::new(Summarizer::new(Arc::new(EchoGenerator))),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ask_request(question: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ask")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "question": question }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let response = create_router(state())
            .oneshot(Request::builder().uri("/api/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["monthly"]["03-2025"]["groceries"], "-45.00");
        assert_eq!(json["data"]["weekly"]["2025-W10"]["groceries"], "-45.00");
        assert_eq!(json["data"]["totals"]["03-2025"]["inflows"], "2500.00");
        assert!(json["data"]["daily"].get("2025-03-14").is_none());
    }

    #[tokio::test]
    async fn test_transactions() {
        let response = create_router(state())
            .oneshot(Request::builder().uri("/api/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        let listed = json["data"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["merchant_name"], "Coles");
        assert_eq!(listed[0]["category"], "groceries");
    }

    #[tokio::test]
    async fn test_ask() {
        let response = create_router(state())
            .oneshot(ask_request("Where did my money go?"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["data"]["answer"].as_str().unwrap().starts_with("prompt had"));
    }

    #[tokio::test]
    async fn test_ask_errors() {
        let empty = create_router(state()).oneshot(ask_request("   ")).await.unwrap();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let failed = create_router(state()).oneshot(ask_request("fail please")).await.unwrap();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(failed).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("boom"));
    }
}
