//! Lenient parsing for monetary values from external payloads.

use rust_decimal::Decimal;

/// Parse a monetary amount from an external API payload.
///
/// Shopify sends prices and order totals as decimal strings (`"19.99"`).
/// A missing, empty, or unparseable value coerces to zero rather than
/// failing the record — one malformed amount must never abort a sync run.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use storepulse_core::parse_money;
///
/// assert_eq!(parse_money(Some("19.99")), Decimal::new(1999, 2));
/// assert_eq!(parse_money(Some("not-a-number")), Decimal::ZERO);
/// assert_eq!(parse_money(None), Decimal::ZERO);
/// ```
#[must_use]
pub fn parse_money(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.trim().parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}
