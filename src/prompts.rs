//! Prompt builders and the fixed user-facing strings.

use crate::schema::SchemaDescriptor;

/// Business description injected into general-question prompts.
pub const GENERAL_INFO: &str = r#"
**About Us**
We are a small buffet restaurant steadily growing alongside the delicious flavors we serve.
We invite you to savor the taste and variety of dishes we have carefully prepared for you to enjoy during our 2-hour all-you-can-eat experience.

**Price**: Affordable and pocket-friendly, just 299 THB per person.
**Products**: In addition to our delightful and diverse shabu buffet, we also offer bubble tea, our signature secret broths, and exclusive sauces.
**Established**: Providing quality shabu dining since 2023.
**Branches**: 5 convenient locations.
**Operating Hours**: Open daily: 11:00 AM - 10:00 PM.
"#;

/// Canned replies used when the general agent has nothing to say.
pub const FALLBACK_RESPONSES: [&str; 5] = [
    "Shabu is love, shabu is life! Let us know how we can make your dining experience better.",
    "Did you know our secret broth recipe has been passed down for generations?",
    "You\u{2019}ll love our exclusive sauces! What else would you like to know?",
    "Bubble tea and shabu \u{2013} a match made in heaven. Come visit us soon!",
    "Our 299 THB buffet is waiting for you! What other questions do you have?",
];

pub const NO_RESULTS_MSG: &str = "No results found for your query.";
pub const QUERY_APOLOGY_MSG: &str = "Sorry, I couldn't process your query. Please try again later.";
pub const SQL_AGENT_UNCONFIGURED_MSG: &str =
    "Agent 01 is not configured. Please provide a valid Gemini API Key.";
pub const GENERAL_AGENT_UNCONFIGURED_MSG: &str =
    "Agent 02 is not configured. Please provide a valid Gemini API Key.";
pub const NO_SUMMARY_MSG: &str = "No sales summary available at the moment.";

/// Prompt asking the model to synthesize a SQL query from the table schemas.
/// The reply is executed verbatim, so the instruction forbids prose.
pub fn dynamic_query_prompt(
    daily: &SchemaDescriptor,
    monthly: &SchemaDescriptor,
    user_input: &str,
) -> String {
    format!(
        r#"Based on the schema and query guide, generate a SQL query to address the user input:

**Schema Definitions:**
DAILY_SALES_AGGREGATED_SCHEMA:
{}

MONTH_SALES_SUMMARY_SCHEMA:
{}

**User Input:**
"{}"

Respond with a valid SQL query without explaining it."#,
        serde_json::to_string_pretty(&daily.to_prompt_json()).unwrap_or_default(),
        serde_json::to_string_pretty(&monthly.to_prompt_json()).unwrap_or_default(),
        user_input
    )
}

/// Prompt for general questions, grounded in the business description.
pub fn general_prompt(user_input: &str) -> String {
    format!(
        r#"You are an assistant for a shabu buffet restaurant. Use the following information to answer the user's question:

{}

User's question:
"{}"

If you don't know the answer, generate a random shabu buffet-related response."#,
        GENERAL_INFO, user_input
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{daily_sales_aggregated_schema, month_sales_summary_schema};

    #[test]
    fn dynamic_prompt_embeds_both_schemas_and_input() {
        let prompt = dynamic_query_prompt(
            &daily_sales_aggregated_schema(),
            &month_sales_summary_schema(),
            "total sales per branch last week",
        );
        assert!(prompt.contains("Daily_Sales_Aggregated"));
        assert!(prompt.contains("month_sales_summary"));
        assert!(prompt.contains("total sales per branch last week"));
        assert!(prompt.contains("without explaining it"));
    }

    #[test]
    fn general_prompt_embeds_business_info() {
        let prompt = general_prompt("do you serve bubble tea?");
        assert!(prompt.contains("299 THB"));
        assert!(prompt.contains("do you serve bubble tea?"));
    }
}
