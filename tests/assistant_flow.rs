//! End-to-end routing behavior against mock warehouse and model backends.

use async_trait::async_trait;
use buffet_report::catalog::QueryCatalog;
use buffet_report::error::{ReportError, Result};
use buffet_report::llm::TextModel;
use buffet_report::prompts::{
    FALLBACK_RESPONSES, GENERAL_AGENT_UNCONFIGURED_MSG, NO_RESULTS_MSG, NO_SUMMARY_MSG,
    QUERY_APOLOGY_MSG, SQL_AGENT_UNCONFIGURED_MSG,
};
use buffet_report::router::{AnswerRouter, HandledBy};
use buffet_report::session::{ChatSession, Role};
use buffet_report::warehouse::{QueryResult, Warehouse};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Warehouse double that records every SQL string it is asked to run.
struct MockWarehouse {
    result: std::result::Result<QueryResult, String>,
    executed: Mutex<Vec<String>>,
}

impl MockWarehouse {
    fn returning(result: QueryResult) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(result),
            executed: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            executed: Mutex::new(Vec::new()),
        })
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        match &self.result {
            Ok(result) => Ok(result.clone()),
            Err(message) => Err(ReportError::Warehouse(message.clone())),
        }
    }
}

/// Model double with a fixed reply, or a fixed failure when `reply` is None.
struct MockModel {
    reply: Option<String>,
}

impl MockModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl TextModel for MockModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(ReportError::Model("model unavailable".to_string())),
        }
    }
}

fn router(
    warehouse: Arc<MockWarehouse>,
    sql_agent: Option<Arc<MockModel>>,
    general_agent: Option<Arc<MockModel>>,
) -> AnswerRouter {
    AnswerRouter::new(
        QueryCatalog::buffet_defaults(),
        warehouse,
        sql_agent.map(|m| m as Arc<dyn TextModel>),
        general_agent.map(|m| m as Arc<dyn TextModel>),
    )
}

fn one_branch_row() -> QueryResult {
    QueryResult::new(
        vec![
            "Branch_ID".to_string(),
            "Branch_Name".to_string(),
            "Sales".to_string(),
        ],
        vec![vec![json!("B01"), json!("Silom"), json!(150000)]],
    )
}

#[tokio::test]
async fn catalog_hit_renders_response_template() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying("unused")),
        None,
    );

    let answer = router
        .answer("Which branch had the highest sales in February? Please tell me")
        .await;

    assert_eq!(answer.handled_by, HandledBy::SqlAgent);
    assert_eq!(
        answer.text,
        "The branch with the highest sales in February is Silom (ID: B01) with total sales of 150000 baht."
    );
    assert_eq!(warehouse.executed().len(), 1);
}

#[tokio::test]
async fn general_questions_never_touch_the_warehouse() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(Arc::clone(&warehouse), None, None);

    let answer = router.answer("hello, what's your opening hours?").await;

    assert_eq!(answer.handled_by, HandledBy::GeneralAgent);
    assert_eq!(answer.text, GENERAL_AGENT_UNCONFIGURED_MSG);
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn data_question_without_model_reports_unconfigured_agent() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(Arc::clone(&warehouse), None, None);

    let answer = router.answer("show me the sales numbers").await;

    assert_eq!(answer.text, SQL_AGENT_UNCONFIGURED_MSG);
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn zero_rows_yield_the_fixed_no_results_text() {
    let warehouse = MockWarehouse::returning(QueryResult::default());

    // Catalog path.
    let catalog_router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying("unused")),
        None,
    );
    let answer = catalog_router
        .answer("Which branch had the highest sales in February?")
        .await;
    assert_eq!(answer.text, NO_RESULTS_MSG);

    // Dynamic path: no catalog entry matches, model writes the SQL.
    let dynamic_router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying("SELECT 1")),
        None,
    );
    let answer = dynamic_router.answer("any growth lately?").await;
    assert_eq!(answer.text, NO_RESULTS_MSG);
}

#[tokio::test]
async fn dynamic_path_executes_model_sql_verbatim() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying(
            "  SELECT Branch_ID FROM `golden-passkey-439311-c8.f2.month_sales_summary`  ",
        )),
        None,
    );

    let answer = router.answer("how did customer numbers trend?").await;

    // Trimmed model output executed as-is, rows rendered generically.
    assert_eq!(
        warehouse.executed(),
        vec!["SELECT Branch_ID FROM `golden-passkey-439311-c8.f2.month_sales_summary`".to_string()]
    );
    assert_eq!(
        answer.text,
        "Branch_ID: B01, Branch_Name: Silom, Sales: 150000"
    );
}

#[tokio::test]
async fn warehouse_failure_becomes_apology_text() {
    let warehouse = MockWarehouse::failing("table not found");
    let router = router(warehouse, Some(MockModel::replying("unused")), None);

    let answer = router
        .answer("Which branch had the highest sales in February?")
        .await;

    assert_eq!(answer.text, QUERY_APOLOGY_MSG);
}

#[tokio::test]
async fn failing_general_model_always_answers_from_fallback_list() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(warehouse, None, Some(MockModel::failing()));

    for _ in 0..20 {
        let answer = router.answer("tell me about the menu").await;
        assert!(
            FALLBACK_RESPONSES.contains(&answer.text.as_str()),
            "unexpected fallback: {}",
            answer.text
        );
    }
}

#[tokio::test]
async fn empty_general_reply_also_falls_back() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(warehouse, None, Some(MockModel::replying("   ")));

    let answer = router.answer("do you have vegetarian options?").await;
    assert!(FALLBACK_RESPONSES.contains(&answer.text.as_str()));
}

#[tokio::test]
async fn daily_summary_appears_at_most_once_per_session() {
    let warehouse = MockWarehouse::returning(QueryResult::new(
        vec![
            "Branch_ID".to_string(),
            "Branch_Name".to_string(),
            "Total_Daily_Sales".to_string(),
        ],
        vec![vec![json!("B01"), json!("Silom"), json!("120000.50")]],
    ));
    let router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying("unused")),
        Some(MockModel::replying("We open at 11am.")),
    );

    let mut session = ChatSession::new();
    session.ensure_daily_summary(warehouse.as_ref(), true).await;
    session.handle_message(&router, "hello there").await;
    session.ensure_daily_summary(warehouse.as_ref(), true).await;
    session.handle_message(&router, "thanks!").await;
    session.ensure_daily_summary(warehouse.as_ref(), true).await;

    let summaries: Vec<_> = session
        .history()
        .iter()
        .filter(|t| t.text.contains("Daily Sales Summary"))
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].role, Role::AgentSql);
    assert!(summaries[0]
        .text
        .contains("Branch B01 Silom total sale is 120000.50 baht"));

    // Banner + 2 user turns + 2 agent replies.
    assert_eq!(session.history().len(), 5);
}

#[tokio::test]
async fn daily_summary_skipped_without_model_credential() {
    let warehouse = MockWarehouse::returning(one_branch_row());

    let mut session = ChatSession::new();
    session.ensure_daily_summary(warehouse.as_ref(), false).await;

    assert!(session.history().is_empty());
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn failed_summary_degrades_to_fixed_message() {
    let warehouse = MockWarehouse::failing("no connection");

    let mut session = ChatSession::new();
    session.ensure_daily_summary(warehouse.as_ref(), true).await;

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].text, NO_SUMMARY_MSG);
}

#[tokio::test]
async fn broken_template_falls_back_to_generic_rendering() {
    let mut catalog = QueryCatalog::new();
    catalog.register(
        "branch sales check",
        "SELECT 1",
        "Missing field here: {Does_Not_Exist}",
    );

    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = AnswerRouter::new(
        catalog,
        Arc::clone(&warehouse) as Arc<dyn Warehouse>,
        Some(MockModel::replying("unused") as Arc<dyn TextModel>),
        None,
    );

    let answer = router.answer("run the branch sales check").await;
    assert_eq!(
        answer.text,
        "Branch_ID: B01, Branch_Name: Silom, Sales: 150000"
    );
}

#[tokio::test]
async fn session_turns_are_tagged_by_handling_agent() {
    let warehouse = MockWarehouse::returning(one_branch_row());
    let router = router(
        Arc::clone(&warehouse),
        Some(MockModel::replying("unused")),
        Some(MockModel::replying("We open daily at 11:00 AM.")),
    );

    let mut session = ChatSession::new();
    session
        .handle_message(&router, "Which branch had the highest sales in February?")
        .await;
    session.handle_message(&router, "when do you open?").await;

    let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::AgentSql, Role::User, Role::AgentGeneral]
    );
    assert_eq!(
        session.history()[3].text,
        "We open daily at 11:00 AM."
    );
}
