pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod router;
pub mod schema;
pub mod session;
pub mod template;
pub mod warehouse;
