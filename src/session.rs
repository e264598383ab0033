//! Chat session state: the append-only turn history and the once-per-session
//! daily summary banner. Sessions are caller-owned; the server keeps one per
//! connection id, the CLI builds one per run.

use crate::prompts::NO_SUMMARY_MSG;
use crate::router::{AnswerRouter, HandledBy};
use crate::warehouse::{render_scalar, Warehouse};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Latest-day sales per branch, shown once at the start of a session.
const DAILY_SUMMARY_SQL: &str = r#"
    SELECT f2.Branch_ID,
           f2.Branch_Name,
           f2.Total_Daily_Sales
    FROM `golden-passkey-439311-c8.f2.daily_sales_summary` as f2
    WHERE DATE(f2.Sales_date) = (
        SELECT MAX(DATE(Sales_date))
        FROM `golden-passkey-439311-c8.f2.daily_sales_summary`
    );
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    AgentSql,
    AgentGeneral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// One user session. History only grows; turns are never edited or removed.
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<ChatTurn>,
    summary_shown: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn push(&mut self, role: Role, text: String) {
        self.history.push(ChatTurn { role, text });
    }

    /// Show the daily sales summary as the first agent turn. Runs at most
    /// once per session, and only when a model credential is configured.
    /// Failures and empty results degrade to a fixed message.
    pub async fn ensure_daily_summary(&mut self, warehouse: &dyn Warehouse, model_configured: bool) {
        if self.summary_shown || !model_configured {
            return;
        }
        self.summary_shown = true;

        let text = match fetch_daily_summary(warehouse).await {
            Some(summary) => format!("### Daily Sales Summary:\n\n{}", summary),
            None => NO_SUMMARY_MSG.to_string(),
        };
        self.push(Role::AgentSql, text);
    }

    /// Append the user turn, route it, and append the agent reply tagged
    /// with the agent that handled it.
    pub async fn handle_message(&mut self, router: &AnswerRouter, user_text: &str) -> &ChatTurn {
        self.push(Role::User, user_text.to_string());

        let answer = router.answer(user_text).await;
        let role = match answer.handled_by {
            HandledBy::SqlAgent => Role::AgentSql,
            HandledBy::GeneralAgent => Role::AgentGeneral,
        };
        self.push(role, answer.text);

        self.history.last().expect("turn just appended")
    }
}

async fn fetch_daily_summary(warehouse: &dyn Warehouse) -> Option<String> {
    let result = match warehouse.execute(DAILY_SUMMARY_SQL).await {
        Ok(result) => result,
        Err(e) => {
            error!("Error fetching sales summary: {}", e);
            return None;
        }
    };
    if result.is_empty() {
        return None;
    }

    let lines: Vec<String> = (0..result.row_count())
        .map(|i| {
            let cell = |col: &str| {
                result
                    .value(i, col)
                    .map(render_scalar)
                    .unwrap_or_default()
            };
            format!(
                "Branch {} {} total sale is {} baht",
                cell("Branch_ID"),
                cell("Branch_Name"),
                cell("Total_Daily_Sales"),
            )
        })
        .collect();
    Some(lines.join("\n"))
}
