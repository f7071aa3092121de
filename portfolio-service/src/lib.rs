//! Market overview and portfolio valuation on top of the brokerage client

pub mod config;
pub mod service;
pub mod valuation;

pub use config::PortfolioServiceConfig;
pub use service::{PortfolioService, TOP_PRODUCTS};
pub use valuation::{unit_price, value_holdings};
