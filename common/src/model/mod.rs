//! Domain models for the trading desk

pub mod order;
pub mod trade;
pub mod market;
pub mod account;
