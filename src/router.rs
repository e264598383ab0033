//! Answer router: classifies user input as a data question or a general
//! question, and produces the reply text.
//!
//! Data questions try the query catalog first and fall back to model-written
//! SQL. General questions go to the general agent with the business blurb as
//! context. No failure from the warehouse or the model escapes this module;
//! every one is logged with the input that caused it and converted into a
//! fixed user-facing string.

use crate::catalog::{QueryCatalog, QueryCatalogEntry};
use crate::error::{ReportError, Result};
use crate::llm::TextModel;
use crate::prompts;
use crate::schema::{daily_sales_aggregated_schema, month_sales_summary_schema, SchemaDescriptor};
use crate::template::render_template;
use crate::warehouse::Warehouse;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{error, warn};

/// A question containing any of these routes to the SQL path.
pub const ROUTING_KEYWORDS: [&str; 5] = ["sales", "target", "growth", "customer", "branch"];

pub fn is_data_question(user_text: &str) -> bool {
    let lowered = user_text.to_lowercase();
    ROUTING_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Which agent produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledBy {
    SqlAgent,
    GeneralAgent,
}

#[derive(Debug, Clone)]
pub struct RoutedAnswer {
    pub handled_by: HandledBy,
    pub text: String,
}

pub struct AnswerRouter {
    catalog: QueryCatalog,
    warehouse: Arc<dyn Warehouse>,
    sql_agent: Option<Arc<dyn TextModel>>,
    general_agent: Option<Arc<dyn TextModel>>,
    daily_schema: SchemaDescriptor,
    monthly_schema: SchemaDescriptor,
}

impl AnswerRouter {
    pub fn new(
        catalog: QueryCatalog,
        warehouse: Arc<dyn Warehouse>,
        sql_agent: Option<Arc<dyn TextModel>>,
        general_agent: Option<Arc<dyn TextModel>>,
    ) -> Self {
        Self {
            catalog,
            warehouse,
            sql_agent,
            general_agent,
            daily_schema: daily_sales_aggregated_schema(),
            monthly_schema: month_sales_summary_schema(),
        }
    }

    pub fn model_configured(&self) -> bool {
        self.sql_agent.is_some() || self.general_agent.is_some()
    }

    /// Route one user message to a reply. Never fails; external-call errors
    /// are absorbed into fixed strings here.
    pub async fn answer(&self, user_text: &str) -> RoutedAnswer {
        if is_data_question(user_text) {
            RoutedAnswer {
                handled_by: HandledBy::SqlAgent,
                text: self.answer_data_question(user_text).await,
            }
        } else {
            RoutedAnswer {
                handled_by: HandledBy::GeneralAgent,
                text: self.answer_general_question(user_text).await,
            }
        }
    }

    async fn answer_data_question(&self, user_text: &str) -> String {
        let Some(sql_agent) = &self.sql_agent else {
            return prompts::SQL_AGENT_UNCONFIGURED_MSG.to_string();
        };

        let outcome = match self.catalog.lookup(user_text) {
            Some(entry) => self.run_catalog_entry(entry).await,
            None => self.run_dynamic_query(sql_agent.as_ref(), user_text).await,
        };

        match outcome {
            Ok(text) => text,
            Err(e) => {
                error!("Data question failed for input {:?}: {}", user_text, e);
                prompts::QUERY_APOLOGY_MSG.to_string()
            }
        }
    }

    async fn run_catalog_entry(&self, entry: &QueryCatalogEntry) -> Result<String> {
        let result = self.warehouse.execute(entry.sql).await.map_err(|e| {
            error!("Catalog query failed, sql {:?}: {}", entry.sql, e);
            e
        })?;

        let Some(mut values) = result.first_row_values() else {
            return Ok(prompts::NO_RESULTS_MSG.to_string());
        };
        let generic = result.render_rows();
        values.insert("result".to_string(), generic.clone());

        match render_template(entry.response_template, &values) {
            Ok(text) => Ok(text),
            // A template referencing a field the query does not return is a
            // catalog configuration bug; degrade to the generic rendering.
            Err(ReportError::Format(msg)) => {
                error!(
                    "Bad response template for {:?}: {}",
                    entry.canonical_question, msg
                );
                Ok(generic)
            }
            Err(e) => Err(e),
        }
    }

    /// Untrusted-input path: the model writes SQL and we execute it verbatim.
    /// The warehouse credential should be read-only.
    async fn run_dynamic_query(&self, sql_agent: &dyn TextModel, user_text: &str) -> Result<String> {
        let prompt = prompts::dynamic_query_prompt(&self.daily_schema, &self.monthly_schema, user_text);
        let sql = sql_agent
            .generate(&prompt)
            .await
            .map_err(|e| {
                error!("SQL generation failed for input {:?}: {}", user_text, e);
                e
            })?
            .trim()
            .to_string();

        let result = self.warehouse.execute(&sql).await.map_err(|e| {
            error!("Generated query failed, sql {:?}: {}", sql, e);
            e
        })?;

        if result.is_empty() {
            return Ok(prompts::NO_RESULTS_MSG.to_string());
        }
        Ok(result.render_rows())
    }

    async fn answer_general_question(&self, user_text: &str) -> String {
        let Some(general_agent) = &self.general_agent else {
            return prompts::GENERAL_AGENT_UNCONFIGURED_MSG.to_string();
        };

        let prompt = prompts::general_prompt(user_text);
        match general_agent.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                warn!("Empty general answer for input {:?}, using fallback", user_text);
                pick_fallback()
            }
            Err(e) => {
                error!("General answer failed for input {:?}: {}", user_text, e);
                pick_fallback()
            }
        }
    }
}

fn pick_fallback() -> String {
    prompts::FALLBACK_RESPONSES
        .choose(&mut rand::thread_rng())
        .expect("fallback list is non-empty")
        .to_string()
}
