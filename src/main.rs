use anyhow::{Context, Result};
use buffet_report::catalog::QueryCatalog;
use buffet_report::llm::{GeminiClient, TextModel};
use buffet_report::router::AnswerRouter;
use buffet_report::session::ChatSession;
use buffet_report::warehouse::{BigQueryClient, Warehouse};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "buffet-report")]
#[command(about = "Sales assistant for the buffet performance warehouse")]
struct Args {
    /// The question in natural language
    question: String,

    /// Gemini API key (or set GEMINI_API_KEY env var)
    #[arg(long)]
    gemini_api_key: Option<String>,

    /// BigQuery project id (or set BIGQUERY_PROJECT_ID env var)
    #[arg(long)]
    project_id: Option<String>,

    /// BigQuery OAuth access token (or set BIGQUERY_ACCESS_TOKEN env var)
    #[arg(long)]
    access_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let project_id = args
        .project_id
        .or_else(|| std::env::var("BIGQUERY_PROJECT_ID").ok())
        .context("BigQuery project id is required (--project-id or BIGQUERY_PROJECT_ID)")?;
    let access_token = args
        .access_token
        .or_else(|| std::env::var("BIGQUERY_ACCESS_TOKEN").ok())
        .context("BigQuery access token is required (--access-token or BIGQUERY_ACCESS_TOKEN)")?;

    let gemini_api_key = args
        .gemini_api_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok());
    if gemini_api_key.is_none() {
        warn!("No Gemini API key provided; model-backed answers are disabled");
    }

    let warehouse: Arc<dyn Warehouse> = Arc::new(BigQueryClient::new(project_id, access_token));
    let model: Option<Arc<dyn TextModel>> =
        gemini_api_key.map(|key| Arc::new(GeminiClient::new(key)) as Arc<dyn TextModel>);

    let router = AnswerRouter::new(
        QueryCatalog::buffet_defaults(),
        Arc::clone(&warehouse),
        model.clone(),
        model,
    );

    info!("Question: {}", args.question);

    let mut session = ChatSession::new();
    session
        .ensure_daily_summary(warehouse.as_ref(), router.model_configured())
        .await;
    session.handle_message(&router, &args.question).await;

    for turn in session.history() {
        println!("[{:?}] {}", turn.role, turn.text);
        println!();
    }

    Ok(())
}
