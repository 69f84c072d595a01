//! HTTP presentation layer
//!
//! Two routers share the status endpoints: the table server (`/sankalpas`,
//! `/logs`) and the form studio (`/studio`).

use crate::backend::{Backend, RelayError};
use crate::forms::{FormError, Notice, QuestionForm, SankalpaForm};
use crate::render::escape_html;
use crate::render::page::{error_message, layout, live_region, success_message};
use crate::views::{IntentionsView, LiveLogView, ViewSnapshot};
use crate::WebConfig;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

const SANKALPA_TABLE_ID: &str = "sankalpas";
const LOG_TABLE_ID: &str = "qa-logs";
const LOG_FRAGMENT_PATH: &str = "/logs/table";

/// State for the table server
pub struct TablesState {
    pub config: Arc<WebConfig>,
    pub backend: Arc<dyn Backend>,
    pub logs: Arc<LiveLogView>,
}

/// State for the form studio
pub struct StudioState {
    pub config: Arc<WebConfig>,
    pub backend: Arc<dyn Backend>,
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Optional pre-applied filter, `?q=...`
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SankalpaInput {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionInput {
    #[serde(default)]
    pub prompt: String,
}

fn status_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(status))
        .route("/health", get(health_check))
}

/// Create the table server router
pub fn tables_router(state: Arc<TablesState>) -> Router {
    Router::new()
        .route("/sankalpas", get(sankalpas_page))
        .route("/logs", get(logs_page))
        .route(LOG_FRAGMENT_PATH, get(logs_fragment))
        .merge(status_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the form studio router
pub fn studio_router(state: Arc<StudioState>) -> Router {
    Router::new()
        .route("/studio", get(studio_page))
        .route("/studio/sankalpa", post(submit_sankalpa))
        .route("/studio/ask", post(ask_question))
        .merge(status_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Sacred QA Frontend".to_string(),
        status: "running".to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

const TABLES_NAV: &str =
    r#"<nav><a href="/sankalpas">Sankalpas</a><a href="/logs">QA logs</a></nav>"#;

/// Intentions table
async fn sankalpas_page(
    State(state): State<Arc<TablesState>>,
    Query(query): Query<FilterQuery>,
) -> (StatusCode, Html<String>) {
    let view = IntentionsView::new(Arc::clone(&state.backend));

    let (status, body) = match view.load(&query.q).await {
        Ok(table) => (StatusCode::OK, table.to_html(SANKALPA_TABLE_ID)),
        Err(e) => (relay_status(&e), error_message(&e.to_string())),
    };

    (
        status,
        Html(layout("Sankalpas", &format!("{}{}", TABLES_NAV, body))),
    )
}

/// Live QA log table; the page fetches fresh data and then polls the
/// fragment endpoint, which serves whatever the refresh loop last published.
async fn logs_page(
    State(state): State<Arc<TablesState>>,
    Query(query): Query<FilterQuery>,
) -> (StatusCode, Html<String>) {
    let snapshot = state.logs.refresh().await;

    let (status, fragment) = match snapshot {
        ViewSnapshot::Ready(mut table) => {
            table.apply_filter(&query.q);
            (StatusCode::OK, table.to_html(LOG_TABLE_ID))
        }
        ViewSnapshot::Failed(message) => (StatusCode::BAD_GATEWAY, error_message(&message)),
        ViewSnapshot::Loading => (StatusCode::OK, loading_message()),
    };

    let interval_ms = state.config.refresh_interval().as_millis() as u64;
    let body = format!(
        "{}{}",
        TABLES_NAV,
        live_region(LOG_FRAGMENT_PATH, interval_ms, &fragment)
    );
    (status, Html(layout("QA logs", &body)))
}

async fn logs_fragment(State(state): State<Arc<TablesState>>) -> Html<String> {
    Html(snapshot_html(&state.logs.current()))
}

fn snapshot_html(snapshot: &ViewSnapshot) -> String {
    match snapshot {
        ViewSnapshot::Ready(table) => table.to_html(LOG_TABLE_ID),
        ViewSnapshot::Failed(message) => error_message(message),
        ViewSnapshot::Loading => loading_message(),
    }
}

fn loading_message() -> String {
    r#"<p class="count">Loading…</p>"#.to_string()
}

fn relay_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RelayError::Network(_) | RelayError::Upstream { .. } | RelayError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn form_status(err: &FormError) -> StatusCode {
    match err {
        FormError::Busy => StatusCode::CONFLICT,
        FormError::Relay(e) => relay_status(e),
    }
}

async fn studio_page(State(state): State<Arc<StudioState>>) -> Html<String> {
    Html(studio_html(
        &SankalpaForm::new(state.config.context_tag.as_str()),
        &QuestionForm::new(),
    ))
}

async fn submit_sankalpa(
    State(state): State<Arc<StudioState>>,
    Form(input): Form<SankalpaInput>,
) -> (StatusCode, Html<String>) {
    let mut form = SankalpaForm::new(state.config.context_tag.as_str()).with_text(input.text);

    let status = match form.submit(state.backend.as_ref()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            debug!(error = %e, "Sankalpa form rejected");
            form_status(&e)
        }
    };

    (status, Html(studio_html(&form, &QuestionForm::new())))
}

async fn ask_question(
    State(state): State<Arc<StudioState>>,
    Form(input): Form<QuestionInput>,
) -> (StatusCode, Html<String>) {
    let mut form = QuestionForm::new().with_prompt(input.prompt);

    let status = match form.submit(state.backend.as_ref()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            debug!(error = %e, "Question form rejected");
            form_status(&e)
        }
    };

    let sankalpa = SankalpaForm::new(state.config.context_tag.as_str());
    (status, Html(studio_html(&sankalpa, &form)))
}

fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(Notice::Success(message)) => success_message(message),
        Some(Notice::Error(message)) => error_message(message),
        None => String::new(),
    }
}

fn studio_html(sankalpa: &SankalpaForm, question: &QuestionForm) -> String {
    let answer = question
        .response()
        .map(|r| format!(r#"<pre class="json">{}</pre>"#, escape_html(r)))
        .unwrap_or_default();

    let body = format!(
        r#"<section>
<h2>Create Sankalpa</h2>
<form method="post" action="/studio/sankalpa" data-single-submit>
<input type="text" name="text" value="{text}" placeholder="Your sankalpa intention..." required>
<button type="submit">Set Sankalpa</button>
</form>
{sankalpa_notice}
</section>
<section>
<h2>Ask a Question</h2>
<form method="post" action="/studio/ask" data-single-submit>
<input type="text" name="prompt" value="{prompt}" placeholder="Your question..." required>
<button type="submit" class="ask">Ask</button>
</form>
{question_notice}
{answer}
</section>"#,
        text = escape_html(sankalpa.text()),
        sankalpa_notice = notice_html(sankalpa.notice()),
        prompt = escape_html(question.prompt()),
        question_notice = notice_html(question.notice()),
        answer = answer,
    );

    layout("Sacred QA Studio", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Resource;
    use crate::test_support::StubBackend;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn tables(backend: Arc<StubBackend>) -> Router {
        let backend: Arc<dyn Backend> = backend;
        tables_router(Arc::new(TablesState {
            config: Arc::new(WebConfig::default()),
            logs: Arc::new(LiveLogView::new(Arc::clone(&backend))),
            backend,
        }))
    }

    fn studio(backend: Arc<StubBackend>) -> Router {
        studio_router(Arc::new(StudioState {
            config: Arc::new(WebConfig::default()),
            backend,
        }))
    }

    async fn get_page(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post_form(router: Router, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_status_and_health() {
        let (status, body) = get_page(tables(Arc::new(StubBackend::new())), "/").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: StatusResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.message, "Sacred QA Frontend");
        assert_eq!(parsed.status, "running");

        let (_, body) = get_page(studio(Arc::new(StubBackend::new())), "/health").await;
        let parsed: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.status, "healthy");
    }

    #[tokio::test]
    async fn test_sankalpas_page_renders_escaped_rows() {
        let backend = Arc::new(StubBackend::new());
        backend.push_collection(
            Resource::Sankalpa,
            Ok(vec![
                json!({
                    "id": "11111111-aaaa",
                    "text": "peace",
                    "context": "web-form",
                    "status": "active",
                    "created_at": "2024-01-01T00:00:00Z"
                }),
                json!({"id": "22222222-bbbb", "text": "<img src=x onerror=alert(1)>"}),
            ]),
        );

        let (status, body) = get_page(tables(backend), "/sankalpas").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<td>11111111</td><td>peace</td>"));
        assert!(body.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!body.contains("<img"));
        assert_eq!(body.matches("<tr>").count(), 3);
    }

    #[tokio::test]
    async fn test_sankalpas_query_prefilters() {
        let backend = Arc::new(StubBackend::new());
        backend.push_collection(
            Resource::Sankalpa,
            Ok(vec![json!({"id": "1", "text": "peace"}), json!({"id": "2", "text": "joy"})]),
        );

        let (_, body) = get_page(tables(backend), "/sankalpas?q=JOY").await;
        assert_eq!(body.matches("<tr hidden>").count(), 1);
        assert!(body.contains(r#"value="JOY""#));
    }

    #[tokio::test]
    async fn test_sankalpas_failure_shows_message_instead_of_table() {
        let backend = Arc::new(StubBackend::new());
        backend.push_collection(
            Resource::Sankalpa,
            Err(RelayError::Network("connection refused".to_string())),
        );

        let (status, body) = get_page(tables(backend), "/sankalpas").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("connection refused"));
        assert!(!body.contains("<table"));
    }

    #[tokio::test]
    async fn test_logs_page_is_live_region() {
        let backend = Arc::new(StubBackend::new());
        backend.push_collection(
            Resource::QaLogs,
            Ok(vec![json!({
                "agent_id": "mock-inference",
                "request_json": {"prompt": "hi"},
                "response_json": {"ok": true}
            })]),
        );

        let router = tables(backend.clone());
        let (status, body) = get_page(router.clone(), "/logs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"data-refresh-url="/logs/table""#));
        assert!(body.contains(r#"data-refresh-ms="10000""#));
        assert!(body.contains("<details><summary>show</summary>"));
        assert!(body.contains("&quot;ok&quot;: true"));

        // The fragment serves the published snapshot without another fetch
        let (_, fragment) = get_page(router, "/logs/table").await;
        assert!(fragment.starts_with(r#"<div class="table-view">"#));
        assert_eq!(backend.fetch_count(Resource::QaLogs), 1);
    }

    #[tokio::test]
    async fn test_logs_query_prefilters_prompt_column() {
        let backend = Arc::new(StubBackend::new());
        backend.push_collection(
            Resource::QaLogs,
            Ok(vec![
                json!({"agent_id": "a", "request_json": {"prompt": "peace"}}),
                json!({"agent_id": "b", "request_json": {"prompt": "war"}}),
            ]),
        );

        let (status, body) = get_page(tables(backend), "/logs?q=PEACE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("<tr hidden>").count(), 1);
        assert!(body.contains(r#"value="PEACE""#));
        assert!(body.contains("<td>war</td>"));
    }

    #[tokio::test]
    async fn test_logs_fragment_before_first_fetch() {
        let (_, fragment) = get_page(tables(Arc::new(StubBackend::new())), "/logs/table").await;
        assert!(fragment.contains("Loading"));
    }

    #[tokio::test]
    async fn test_submit_sankalpa_clears_input_on_success() {
        let backend = Arc::new(StubBackend::new());
        backend.push_submit(Resource::Sankalpa, Ok(json!({"id": "abc-123"})));

        let router = studio(backend.clone());
        let (status, body) = post_form(router, "/studio/sankalpa", "text=inner+peace").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sankalpa created: abc-123"));
        assert!(body.contains(r#"name="text" value="""#));
        assert_eq!(
            backend.submissions(),
            vec![(Resource::Sankalpa, json!({"text": "inner peace", "context": "web-form"}))]
        );
    }

    #[tokio::test]
    async fn test_submit_sankalpa_failure_retains_input() {
        let backend = Arc::new(StubBackend::new());
        backend.push_submit(
            Resource::Sankalpa,
            Err(RelayError::Upstream {
                status: 500,
                message: "insert failed".to_string(),
            }),
        );

        let router = studio(backend);
        let (status, body) = post_form(router, "/studio/sankalpa", "text=inner+peace").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains(r#"name="text" value="inner peace""#));
        assert!(body.contains("insert failed"));
    }

    #[tokio::test]
    async fn test_blank_sankalpa_is_unprocessable() {
        let backend = Arc::new(StubBackend::new());
        let (status, body) = post_form(studio(backend.clone()), "/studio/sankalpa", "text=").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Sankalpa must not be empty"));
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_ask_shows_pretty_data() {
        let backend = Arc::new(StubBackend::new());
        backend.push_submit(
            Resource::Qa,
            Ok(json!({"agent": "x", "data": {"ok": true, "echo": {"prompt": "hi"}}})),
        );

        let (status, body) = post_form(studio(backend), "/studio/ask", "prompt=hi").await;
        assert_eq!(status, StatusCode::OK);
        let expected = escape_html(
            &serde_json::to_string_pretty(&json!({"ok": true, "echo": {"prompt": "hi"}})).unwrap(),
        );
        assert!(body.contains(&format!(r#"<pre class="json">{}</pre>"#, expected)));
        assert!(body.contains(r#"name="prompt" value="hi""#));
    }
}
