//! Pure portfolio valuation

use std::collections::HashMap;

use common::decimal::precision::round_price;
use common::decimal::{Amount, Price};
use common::model::account::{Account, Holding, PortfolioSnapshot};
use common::model::market::is_usd_pegged;
use rust_decimal::Decimal;

/// Unit price used for a symbol: one for dollar-pegged assets, otherwise the
/// fetched price, or zero when no price could be obtained.
pub fn unit_price(symbol: &str, prices: &HashMap<String, Price>) -> Price {
    if is_usd_pegged(symbol) {
        return Decimal::ONE;
    }
    prices.get(symbol).copied().unwrap_or(Decimal::ZERO)
}

/// Value every funded account.
///
/// Accounts with a zero balance are skipped. The total is the sum of the
/// holding values and is never affected by a missing price other than through
/// that holding being valued at zero. A holding whose value would overflow the
/// total is left out of it.
pub fn value_holdings(accounts: &[Account], prices: &HashMap<String, Price>) -> PortfolioSnapshot {
    let holdings: Vec<Holding> = accounts
        .iter()
        .filter(|account| account.has_balance())
        .map(|account| {
            let amount = account.available_balance.value;
            let price = unit_price(&account.currency, prices);
            Holding {
                symbol: account.currency.clone(),
                name: account.name.clone(),
                amount,
                price,
                value: amount
                    .checked_mul(price)
                    .map(round_price)
                    .unwrap_or_else(|| {
                        tracing::warn!("Value of {} {} overflows, counting it as zero", amount, account.currency);
                        Decimal::ZERO
                    }),
            }
        })
        .collect();

    let total_value: Amount = holdings.iter().fold(Decimal::ZERO, |total, holding| {
        total.checked_add(holding.value).unwrap_or_else(|| {
            tracing::warn!("Portfolio total overflows at {}, leaving it out", holding.symbol);
            total
        })
    });

    PortfolioSnapshot {
        holdings,
        total_value,
    }
}
