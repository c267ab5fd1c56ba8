pub mod advisory; // OpenRouter vision-model client
pub mod history;

pub use advisory::{AdvisoryClient, AdvisoryService};
pub use history::HistoryStore;
