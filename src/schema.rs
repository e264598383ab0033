//! Warehouse table schemas used as prompt context for dynamic SQL generation.
//!
//! The descriptors are never used to validate queries; they are serialized
//! into the model prompt so it can reference real column names.

use serde_json::{json, Value};
use std::fmt;

pub const DAILY_SALES_AGGREGATED_TABLE_ID: &str =
    "golden-passkey-439311-c8.f2.Daily_Sales_Aggregated";
pub const MONTH_SALES_SUMMARY_TABLE_ID: &str = "golden-passkey-439311-c8.f2.month_sales_summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Timestamp,
    Date,
    String,
    Integer,
    /// NUMERIC, optionally with (precision, scale).
    Numeric(Option<(u8, u8)>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Timestamp => write!(f, "TIMESTAMP"),
            FieldType::Date => write!(f, "DATE"),
            FieldType::String => write!(f, "STRING"),
            FieldType::Integer => write!(f, "INTEGER"),
            FieldType::Numeric(None) => write!(f, "NUMERIC"),
            FieldType::Numeric(Some((p, s))) => write!(f, "NUMERIC({}, {})", p, s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub table_id: &'static str,
    pub fields: Vec<SchemaField>,
}

impl SchemaDescriptor {
    /// Serialize to the list-of-objects shape embedded in prompts: a
    /// `table_id` object first, then one object per field.
    pub fn to_prompt_json(&self) -> Value {
        let mut items = vec![json!({ "table_id": self.table_id })];
        for field in &self.fields {
            items.push(json!({
                "field_name": field.name,
                "type": field.field_type.to_string(),
                "description": field.description,
            }));
        }
        Value::Array(items)
    }
}

fn field(name: &'static str, field_type: FieldType, description: &'static str) -> SchemaField {
    SchemaField {
        name,
        field_type,
        description,
    }
}

/// Per-branch daily sales aggregation table.
pub fn daily_sales_aggregated_schema() -> SchemaDescriptor {
    SchemaDescriptor {
        table_id: DAILY_SALES_AGGREGATED_TABLE_ID,
        fields: vec![
            field(
                "ETL_Date",
                FieldType::Timestamp,
                "The date and time when the data was extracted, transformed, and loaded (ETL).",
            ),
            field(
                "Branch_ID",
                FieldType::String,
                "Unique identifier for each branch.",
            ),
            field(
                "Sales_Date",
                FieldType::Date,
                "The date associated with the sales data.",
            ),
            field(
                "Total_Daily_Sales",
                FieldType::Numeric(Some((18, 2))),
                "Total daily sales amount for the branch.",
            ),
            field(
                "Daily_Target",
                FieldType::Numeric(Some((18, 2))),
                "The sales target set for the branch for the respective date.",
            ),
        ],
    }
}

/// Per-branch monthly rollup with targets and customer counts.
pub fn month_sales_summary_schema() -> SchemaDescriptor {
    SchemaDescriptor {
        table_id: MONTH_SALES_SUMMARY_TABLE_ID,
        fields: vec![
            field(
                "ETL_Date",
                FieldType::Timestamp,
                "Date and time of ETL process.",
            ),
            field("Year", FieldType::Integer, "Year of the sales data."),
            field(
                "Year_Month",
                FieldType::String,
                "Year and month in 'YYYY-MM' format.",
            ),
            field(
                "Month_Name",
                FieldType::String,
                "Month name (e.g., January).",
            ),
            field("Branch_ID", FieldType::String, "Branch identifier."),
            field("Branch_Name", FieldType::String, "Branch name."),
            field(
                "Total_Monthly_Sales",
                FieldType::Numeric(None),
                "Total sales for the branch in the month.",
            ),
            field(
                "Monthly_Target",
                FieldType::Numeric(None),
                "Sales target for the branch for the month.",
            ),
            field(
                "Number_Of_Customer",
                FieldType::Integer,
                "Number of customers served in the month.",
            ),
        ],
    }
}
