// Metapackage for end-to-end tests
// Re-export crates as modules

pub use api_gateway as gateway;
pub use brokerage_client as brokerage;
pub use common;
pub use portfolio_service as portfolio;
pub use trade_assistant as assistant;
