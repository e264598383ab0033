//! HTTP server for the buffet sales assistant UI.
//! Simple HTTP server using tokio and basic HTTP handling.

use buffet_report::catalog::QueryCatalog;
use buffet_report::dashboard::dashboard_iframe;
use buffet_report::llm::{GeminiClient, TextModel};
use buffet_report::router::AnswerRouter;
use buffet_report::session::{ChatSession, ChatTurn};
use buffet_report::warehouse::{BigQueryClient, Warehouse};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};
use uuid::Uuid;

struct AppState {
    router: AnswerRouter,
    warehouse: Arc<dyn Warehouse>,
    sessions: DashMap<Uuid, ChatSession>,
}

#[derive(Deserialize)]
struct ChatRequest {
    session_id: Uuid,
    message: String,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
    history: Vec<ChatTurn>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let project_id = std::env::var("BIGQUERY_PROJECT_ID")
        .map_err(|_| anyhow::anyhow!("BIGQUERY_PROJECT_ID is required"))?;
    let access_token = std::env::var("BIGQUERY_ACCESS_TOKEN")
        .map_err(|_| anyhow::anyhow!("BIGQUERY_ACCESS_TOKEN is required"))?;
    let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

    if gemini_api_key.is_some() {
        info!("Gemini API key found - model-backed answers enabled");
    } else {
        warn!("Gemini API key not found - agents will report as unconfigured");
    }

    let warehouse: Arc<dyn Warehouse> = Arc::new(BigQueryClient::new(project_id, access_token));
    let model: Option<Arc<dyn TextModel>> =
        gemini_api_key.map(|key| Arc::new(GeminiClient::new(key)) as Arc<dyn TextModel>);

    let state = Arc::new(AppState {
        router: AnswerRouter::new(
            QueryCatalog::buffet_defaults(),
            Arc::clone(&warehouse),
            model.clone(),
            model,
        ),
        warehouse,
        sessions: DashMap::new(),
    });

    let listener = TcpListener::bind("0.0.0.0:8080").await?;
    info!("Server listening on http://localhost:8080");

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("New connection from: {}", addr);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            handle_connection(stream, state).await;
        });
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) {
    match read_request(&mut stream).await {
        Ok(request) => {
            let response = handle_request(&request, &state).await;
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                error!("Failed to write response: {}", e);
            }
        }
        Err(e) => {
            error!("Failed to read from stream: {}", e);
        }
    }
}

/// Read the request line, headers and (content-length delimited) body.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = find_header_end(&buffer) {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buffer).to_string())
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn handle_request(request: &str, state: &AppState) -> String {
    let Some(request_line) = request.lines().next() else {
        return create_response(400, "Bad Request", "{}");
    };
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return create_response(400, "Bad Request", "{}");
    }

    let method = parts[0];
    let mut path = parts[1].split('?').next().unwrap_or("/").trim_end_matches('/');
    if path.is_empty() {
        path = "/";
    }
    let body = request
        .split_once("\r\n\r\n")
        .map(|(_, b)| b)
        .unwrap_or("");

    match (method, path) {
        ("GET", "/api/health") => create_response(
            200,
            "OK",
            r#"{"status":"ok","service":"buffet-report-api"}"#,
        ),
        ("POST", "/api/sessions") => create_session(state).await,
        ("POST", "/api/chat") => handle_chat(body, state).await,
        ("GET", "/") => create_html_response(chat_page()),
        ("GET", "/dashboard") => create_html_response(dashboard_page()),
        _ => create_response(404, "Not Found", r#"{"error":"not found"}"#),
    }
}

/// Create a session and show the daily summary banner as its first turn.
async fn create_session(state: &AppState) -> String {
    let session_id = Uuid::new_v4();
    let mut session = ChatSession::new();
    session
        .ensure_daily_summary(
            state.warehouse.as_ref(),
            state.router.model_configured(),
        )
        .await;

    let response = SessionResponse {
        session_id,
        history: session.history().to_vec(),
    };
    state.sessions.insert(session_id, session);

    match serde_json::to_string(&response) {
        Ok(json) => create_response(200, "OK", &json),
        Err(e) => {
            error!("Failed to serialize session: {}", e);
            create_response(500, "Internal Server Error", r#"{"error":"internal"}"#)
        }
    }
}

async fn handle_chat(body: &str, state: &AppState) -> String {
    let request: ChatRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return create_response(
                400,
                "Bad Request",
                &format!(r#"{{"error":"invalid request: {}"}}"#, e),
            );
        }
    };

    // Take the session out of the registry while its turn runs; a session is
    // strictly sequential, one in-flight request at a time.
    let Some((_, mut session)) = state.sessions.remove(&request.session_id) else {
        return create_response(404, "Not Found", r#"{"error":"unknown session"}"#);
    };

    let turn = session
        .handle_message(&state.router, &request.message)
        .await
        .clone();
    state.sessions.insert(request.session_id, session);

    match serde_json::to_string(&turn) {
        Ok(json) => create_response(200, "OK", &json),
        Err(e) => {
            error!("Failed to serialize turn: {}", e);
            create_response(500, "Internal Server Error", r#"{"error":"internal"}"#)
        }
    }
}

fn create_response(status: u16, status_text: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: {}\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    )
}

fn create_html_response(body: String) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

fn chat_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Buffet Sale Performance Report</title></head>
<body>
<h1 style="color: darkorange; text-align: center;">Buffet Sale Performance</h1>
<h2>Chat with Sale Assistance to Get Insight!</h2>
<div id="chat"></div>
<input id="message" placeholder="Type your question here..." size="60">
<button onclick="send()">Send</button>
<p><a href="/dashboard">Dashboard</a></p>
<script>
let sessionId = null;
function append(role, text) {
    const div = document.createElement('div');
    div.textContent = '[' + role + '] ' + text;
    document.getElementById('chat').appendChild(div);
}
fetch('/api/sessions', {method: 'POST'}).then(r => r.json()).then(s => {
    sessionId = s.session_id;
    s.history.forEach(t => append(t.role, t.text));
});
function send() {
    const input = document.getElementById('message');
    const message = input.value;
    input.value = '';
    append('user', message);
    fetch('/api/chat', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify({session_id: sessionId, message: message})
    }).then(r => r.json()).then(t => append(t.role, t.text));
}
</script>
<hr>
<p>Buffet Sale Performance Report | Powered by BigQuery, Gemini API, and Power BI</p>
</body>
</html>"#
        .to_string()
}

fn dashboard_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Buffet Sale Performance Dashboard</title></head>
<body>
<h1 style="color: darkorange; text-align: center;">Buffet Sale Performance Dashboard</h1>
{}
<hr>
<p>Buffet Sale Performance Report | Powered by BigQuery, Gemini API, and Power BI</p>
</body>
</html>"#,
        dashboard_iframe()
    )
}
