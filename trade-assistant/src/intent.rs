//! Extraction of trade directives from assistant text
//!
//! Directive grammar:
//!
//! ```text
//! [TRADE: type=<buy|sell>, symbol=<ticker>, amount=<decimal>, price=<decimal>]
//! ```
//!
//! Only the first directive in a reply is considered. A directive that fails
//! validation (including one whose notional overflows) yields no intent; the text is model-generated, so there is
//! nobody to report a parse error to.

use std::str::FromStr;

use common::model::order::Side;
use common::model::trade::TradeIntent;
use lazy_regex::regex;
use rust_decimal::Decimal;

/// Result of parsing one assistant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Validated intent from the first directive, if any
    pub intent: Option<TradeIntent>,
    /// Reply text with every directive removed, trimmed
    pub display_text: String,
}

/// Parse the first trade directive in `text`.
pub fn parse_trade_directive(text: &str) -> Option<TradeIntent> {
    let captures = regex!(
        r"\[TRADE:\s*type=(\w+),\s*symbol=(\w+),\s*amount=([\d.]+),\s*price=([\d.]+)\]"
    )
    .captures(text)?;

    let side = Side::from_str(&captures[1]).ok()?;
    let symbol = captures[2].to_ascii_uppercase();
    let amount = positive_decimal(&captures[3])?;
    let reference_price = positive_decimal(&captures[4])?;

    let intent = TradeIntent {
        side,
        symbol,
        amount,
        reference_price,
    };

    // A notional beyond the decimal range cannot be priced or displayed
    intent.estimated_total().map(|_| intent)
}

/// Remove every `[TRADE: ...]` bracket from `text` and trim the result.
pub fn strip_trade_directives(text: &str) -> String {
    regex!(r"\[TRADE:[^\]]+\]").replace_all(text, "").trim().to_string()
}

/// Parse a reply into its intent and display text
pub fn parse_reply(text: &str) -> ParsedReply {
    ParsedReply {
        intent: parse_trade_directive(text),
        display_text: strip_trade_directives(text),
    }
}

fn positive_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok().filter(|value| *value > Decimal::ZERO)
}
