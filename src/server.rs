use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{LedgerError, Result};
use crate::ledger::{self, Action};
use crate::models::NewTransaction;
use crate::settings::Settings;
use crate::sheet::{ensure_header, open_sheet, SharedSheet};

pub const INVALID_REQUEST: &str = "invalid action or missing date";

/// Envelope for every JSON body: `{"status": "success", ...}` with the
/// payload's fields inlined, or `{"status": "error", "message": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply<T> {
    Success(T),
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Reply<Notice> {
    fn ok(message: &str) -> Self {
        Reply::Success(Notice {
            message: message.to_string(),
        })
    }

    fn error(message: impl Into<String>) -> Self {
        Reply::Error {
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub struct AppState {
    sheet: Mutex<SharedSheet>,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl AppState {
    pub fn new(sheet: SharedSheet) -> Self {
        Self::with_clock(sheet, local_now)
    }

    pub fn with_clock(sheet: SharedSheet, clock: fn() -> NaiveDateTime) -> Self {
        Self {
            sheet: Mutex::new(sheet),
            clock,
        }
    }

    // One request at a time touches the sheet.
    fn sheet(&self) -> Result<MutexGuard<'_, SharedSheet>> {
        self.sheet.lock().map_err(|_| LedgerError::Poisoned)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(query_handler).post(append_handler))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(action) = Action::from_params(
        params.get("action").map(String::as_str),
        params.get("date").map(String::as_str),
    ) else {
        warn!(?params, "rejected query");
        return Reply::error(INVALID_REQUEST).into_response();
    };

    let query = action.clone();
    let result = run_blocking(move || {
        let sheet = state.sheet()?;
        match &query {
            Action::Daily { date } => {
                ledger::daily(&**sheet, date).map(|r| Reply::Success(r).into_response())
            }
            Action::AllTime => {
                ledger::all_time(&**sheet).map(|s| Reply::Success(s).into_response())
            }
        }
    })
    .await;

    match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, ?action, "query failed");
            Reply::error(format!("server error: {e}")).into_response()
        }
    }
}

async fn append_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Reply<Notice> {
    let result = run_blocking(move || {
        let tx = serde_json::from_slice::<NewTransaction>(&body)?;
        let mut sheet = state.sheet()?;
        ledger::append(&mut **sheet, tx, (state.clock)())
    })
    .await;

    match result {
        Ok(_) => Reply::ok("data added"),
        Err(e) => {
            error!(error = %e, "append failed");
            Reply::error(format!("failed to save data: {e}"))
        }
    }
}

/// Sheet access is blocking file or SQLite I/O; keep it off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(LedgerError::Other(format!("worker task failed: {e}"))))
}

async fn health() -> Reply<Notice> {
    Reply::ok("ok")
}

/// Open the configured sheet, check its header, and serve until Ctrl-C.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let data_dir = settings.data_path();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create data dir {}", data_dir.display()))?;
    let mut sheet = open_sheet(&data_dir, settings.backend)?;
    ensure_header(&mut *sheet).context("sheet header check failed")?;

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", settings.listen_addr))?;
    info!(
        addr = %settings.listen_addr,
        backend = %settings.backend,
        data_dir = %data_dir.display(),
        "ledger listening"
    );

    axum::serve(listener, app(AppState::new(sheet)))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use crate::schema::DEFAULT_HEADER;
    use crate::sheet::MemorySheet;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    fn test_app(sheet: MemorySheet) -> Router {
        app(AppState::with_clock(Box::new(sheet), fixed_clock))
    }

    async fn send(app: Router, req: Request<Body>) -> Value {
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get(app: Router, uri: &str) -> Value {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(app: Router, body: &str) -> Value {
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    fn sample_sheet() -> MemorySheet {
        let mut sheet = MemorySheet::with_header(&DEFAULT_HEADER);
        sheet.rows.push(vec![
            Cell::text("2024-01-05 08:00:00"),
            Cell::text("50"),
            Cell::text("Coffee"),
            Cell::text("Cash"),
            Cell::text("Food"),
            Cell::text("Expense"),
        ]);
        sheet.rows.push(vec![
            Cell::text("2024-01-06 10:00:00"),
            Cell::Number(200.0),
            Cell::text("Gaji"),
            Cell::text("Bank"),
            Cell::text("Salary"),
            Cell::text("income"),
        ]);
        sheet
    }

    #[tokio::test]
    async fn test_get_daily() {
        let body = get(test_app(sample_sheet()), "/?action=get_daily&date=2024-01-05").await;
        assert_eq!(
            body,
            json!({
                "status": "success",
                "date": "2024-01-05",
                "expenses": [{
                    "description": "Coffee",
                    "amount": 50,
                    "category": "Food",
                    "payment_method": "Cash",
                    "type": "Expense"
                }],
                "total": 50
            })
        );
    }

    #[tokio::test]
    async fn test_get_all_time() {
        let body = get(test_app(sample_sheet()), "/?action=calculate_expense_minus_income").await;
        assert_eq!(
            body,
            json!({
                "status": "success",
                "calculationPeriod": "all_time",
                "totalExpense": 50,
                "totalIncome": 200,
                "expenseMinusIncome": -150
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_action_or_missing_date() {
        for uri in [
            "/",
            "/?action=get_daily",
            "/?action=get_daily&date=",
            "/?action=nuke&date=2024-01-05",
        ] {
            let body = get(test_app(sample_sheet()), uri).await;
            assert_eq!(body, json!({"status": "error", "message": INVALID_REQUEST}), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_column_is_error_payload() {
        let sheet = MemorySheet::with_header(&["Tanggal", "Amount"]);
        let body = get(test_app(sheet), "/?action=calculate_expense_minus_income").await;
        assert_eq!(body["status"], "error");
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("server error: "));
        assert!(message.contains("'Type'"));
    }

    #[tokio::test]
    async fn test_unparseable_target_date_is_empty_success() {
        let body = get(test_app(sample_sheet()), "/?action=get_daily&date=yesterday").await;
        assert_eq!(
            body,
            json!({"status": "success", "date": "yesterday", "expenses": [], "total": 0})
        );
        let body = get(test_app(sample_sheet()), "/?action=get_daily&date=2024-1-5").await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["expenses"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_amount_column_is_error_payload() {
        let sheet = MemorySheet::with_header(&["Tanggal", "Description", "Type"]);
        for uri in [
            "/?action=get_daily&date=2024-01-05",
            "/?action=calculate_expense_minus_income",
        ] {
            let body = get(test_app(sheet.clone()), uri).await;
            assert_eq!(body["status"], "error", "{uri}");
            let message = body["message"].as_str().unwrap();
            assert!(message.starts_with("server error: "), "{message}");
            assert!(message.contains("'Amount'"), "{message}");
        }
    }

    #[tokio::test]
    async fn test_post_appends_with_server_timestamp() {
        let app = test_app(MemorySheet::with_header(&DEFAULT_HEADER));
        let body = post(
            app.clone(),
            r#"{"amount": "25000", "description": "nasi goreng", "payment_method": "ShopeePay",
                "category": "Makanan", "transaction_type": "expense", "date": "1999-01-01"}"#,
        )
        .await;
        assert_eq!(body, json!({"status": "success", "message": "data added"}));

        let daily = get(app, "/?action=get_daily&date=2024-01-05").await;
        assert_eq!(daily["total"], json!(25000));
        assert_eq!(daily["expenses"][0]["description"], "nasi goreng");
        assert_eq!(daily["expenses"][0]["payment_method"], "ShopeePay");
    }

    #[tokio::test]
    async fn test_post_bad_amount_stored_as_zero() {
        let app = test_app(MemorySheet::with_header(&DEFAULT_HEADER));
        let body = post(app.clone(), r#"{"amount": "banyak", "transaction_type": "expense"}"#).await;
        assert_eq!(body["status"], "success");

        let daily = get(app, "/?action=get_daily&date=2024-01-05").await;
        assert_eq!(daily["expenses"][0]["amount"], json!(0));
        assert_eq!(daily["expenses"][0]["description"], "N/A");
        assert_eq!(daily["total"], json!(0));
    }

    #[tokio::test]
    async fn test_post_malformed_body_is_error_payload() {
        for raw in ["not json", "[1, 2]", ""] {
            let body = post(test_app(MemorySheet::with_header(&DEFAULT_HEADER)), raw).await;
            assert_eq!(body["status"], "error", "{raw:?}");
            assert!(body["message"]
                .as_str()
                .unwrap()
                .starts_with("failed to save data: "));
        }
    }

    #[tokio::test]
    async fn test_health() {
        let body = get(test_app(MemorySheet::default()), "/health").await;
        assert_eq!(body, json!({"status": "success", "message": "ok"}));
    }
}
