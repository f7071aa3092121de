//! System prompt built from the live portfolio

use common::decimal::dec;
use common::model::account::{Holding, PortfolioSnapshot};
use rust_decimal::{Decimal, RoundingStrategy};

/// Render the system prompt for one completion call.
///
/// `connected` tells the model whether the figures are live exchange data or
/// the demo portfolio shown when the exchange is unreachable.
pub fn build_system_prompt(portfolio: &PortfolioSnapshot, connected: bool) -> String {
    let holdings = portfolio
        .holdings
        .iter()
        .map(|h| {
            format!(
                "{}: {} units @ ${}",
                h.symbol,
                h.amount.normalize(),
                group_thousands(h.price.round_dp(8).normalize())
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let total = portfolio
        .total_value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    format!(
        "You are an expert AI crypto portfolio manager and trading agent integrated with Coinbase.

LIVE PORTFOLIO:
- Total Value: ${}
- Holdings: {}
- Exchange: Coinbase Advanced Trade
- Connected: {}

CAPABILITIES:
1. ANALYSIS: Technical, fundamental, and sentiment analysis
2. STRATEGY: DCA, momentum, mean-reversion, hedging strategies
3. EXECUTION: Suggest trades - always confirm before executing via [TRADE: type=buy|sell, symbol=XXX, amount=N, price=CURRENT_PRICE]
4. ALERTS: Flag risks, opportunities, and portfolio imbalances

Be professional, data-driven, and concise. Use **bold** for emphasis. Always confirm before executing trades.",
        group_thousands(total),
        holdings,
        if connected { "Yes" } else { "No (showing demo data)" },
    )
}

/// Portfolio used in the prompt when the exchange cannot be reached
pub fn demo_portfolio() -> PortfolioSnapshot {
    let holdings = vec![
        demo_holding("BTC", "Bitcoin", dec!(0.4821), dec!(67240)),
        demo_holding("ETH", "Ethereum", dec!(3.2), dec!(3480)),
        demo_holding("SOL", "Solana", dec!(28), dec!(178)),
    ];
    let total_value = holdings.iter().map(|h| h.value).sum();

    PortfolioSnapshot {
        holdings,
        total_value,
    }
}

fn demo_holding(symbol: &str, name: &str, amount: Decimal, price: Decimal) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        name: name.to_string(),
        amount,
        price,
        value: amount * price,
    }
}

/// `1234567.5` -> `1,234,567.5`
pub(crate) fn group_thousands(value: Decimal) -> String {
    let rendered = value.to_string();
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
