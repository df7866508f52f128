//! Human-readable rendering of amounts, confirmations, and statements.
//! Presentation only; canonical values stay `Decimal` everywhere else.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::broker::AccountStatement;
use crate::models::{TradeConfirmation, TradeSide};

fn pad_fraction_to_cents(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    let mut out = String::with_capacity(int_part.len() + 3);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(2) {
        out.push(ch);
        written += 1;
    }
    while written < 2 {
        out.push('0');
        written += 1;
    }

    out
}

/// Format a currency amount with exactly two decimal places and the
/// configured symbol. The sign precedes the symbol: `-$12.50`.
pub fn money(value: Decimal, symbol: &str) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = pad_fraction_to_cents(&rounded.abs().normalize().to_string());

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&digits);
    out
}

/// The session header printed before command output.
pub fn banner(today: NaiveDate) -> String {
    format!("{} - papertrade", today.format("%m/%d/%Y"))
}

/// One-line summary of a committed trade.
pub fn confirmation_line(confirmation: &TradeConfirmation, symbol: &str) -> String {
    let action = match confirmation.side {
        TradeSide::Buy => "purchased",
        TradeSide::Sell => "sold",
    };
    format!(
        "Successfully {action} {}x {} ({}) on {} for {} each or {} total. Your new balance is {}.",
        confirmation.quantity,
        confirmation.security_name,
        confirmation.ticker,
        confirmation.trade_date,
        money(confirmation.price, symbol),
        money(confirmation.total, symbol),
        money(confirmation.new_balance, symbol),
    )
}

/// Multi-line account statement: balance, then open holdings, then
/// closed positions.
pub fn statement_lines(statement: &AccountStatement, symbol: &str) -> Vec<String> {
    let mut lines = vec![format!(
        "Your balance is currently {}",
        money(statement.balance, symbol)
    )];
    for holding in &statement.holdings {
        lines.push(format!(
            "{}x {} ({}) purchased on {} for {} each or {} total, now worth {} ({})",
            holding.quantity,
            holding.security_name,
            holding.ticker,
            holding.purchase_date,
            money(holding.purchase_price, symbol),
            money(holding.cost, symbol),
            money(holding.current_value, symbol),
            signed_gain(holding.gain, symbol),
        ));
    }
    for sold in &statement.closed {
        lines.push(format!(
            "{}x {} purchased on {} and sold on {} for {} each or {} total ({})",
            sold.quantity,
            sold.ticker,
            sold.purchase_date,
            sold.sold_date,
            money(sold.sold_price, symbol),
            money(sold.proceeds(), symbol),
            signed_gain(sold.gain(), symbol),
        ));
    }
    lines
}

fn signed_gain(gain: Decimal, symbol: &str) -> String {
    if gain >= Decimal::ZERO {
        format!("+{}", money(gain, symbol))
    } else {
        money(gain, symbol)
    }
}
