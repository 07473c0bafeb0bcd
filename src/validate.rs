// ===============================
// src/validate.rs
// ===============================
//
// Parser input user -> nilai domain bertipe. Tanpa I/O, tanpa efek samping;
// prompting ada di session.rs.
//
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{OrderId, OrderType, Side, Symbol};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Symbol cannot be empty and must be alphanumeric")]
    Symbol,
    #[error("Side must be 'BUY' or 'SELL'")]
    Side,
    #[error("Order type must be MARKET, LIMIT or STOP_LIMIT")]
    OrderType,
    #[error("'{0}' is not a valid decimal number")]
    Decimal(String),
    #[error("Value must be positive")]
    NotPositive,
    #[error("Order ID must be a number")]
    OrderId,
    #[error("{0} order requires a limit price")]
    MissingPrice(OrderType),
    #[error("{0} order requires a stop price")]
    MissingStopPrice(OrderType),
}

pub fn symbol(input: &str) -> Result<Symbol, ValidationError> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::Symbol);
    }
    Ok(Symbol::new_unchecked(input.to_ascii_uppercase()))
}

pub fn side(input: &str) -> Result<Side, ValidationError> {
    match input.to_ascii_uppercase().as_str() {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        _ => Err(ValidationError::Side),
    }
}

pub fn order_type(input: &str) -> Result<OrderType, ValidationError> {
    match input.to_ascii_uppercase().as_str() {
        "MARKET" => Ok(OrderType::Market),
        "LIMIT" => Ok(OrderType::Limit),
        "STOP_LIMIT" => Ok(OrderType::StopLimit),
        _ => Err(ValidationError::OrderType),
    }
}

/// Exact parse: digits beyond what `Decimal` can hold are an error, never rounded.
/// Exponent form (`1e-3`) is accepted and normalized, so `1e-3` reads as `0.001`.
pub fn positive_decimal(input: &str) -> Result<Decimal, ValidationError> {
    let val = Decimal::from_str_exact(input)
        .or_else(|e| {
            if input.contains(|c: char| c == 'e' || c == 'E') {
                Decimal::from_scientific(input).map(|d| d.normalize())
            } else {
                Err(e)
            }
        })
        .map_err(|_| ValidationError::Decimal(input.to_string()))?;
    if val <= Decimal::ZERO {
        return Err(ValidationError::NotPositive);
    }
    Ok(val)
}

pub fn order_id(input: &str) -> Result<OrderId, ValidationError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::OrderId);
    }
    Ok(OrderId::new_unchecked(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn symbol_uppercases_alphanumeric() {
        assert_eq!(symbol("btcusdt").unwrap().as_str(), "BTCUSDT");
        assert_eq!(symbol("1000PEPEusdt").unwrap().as_str(), "1000PEPEUSDT");
        assert_eq!(symbol("ETHUSDT").unwrap().as_str(), "ETHUSDT");
    }

    #[test]
    fn symbol_rejects_empty_and_punctuation() {
        for bad in ["", "BTC-USDT", "BTC/USDT", "btc usdt", "BTC_USDT", "ÉTH"] {
            assert_eq!(symbol(bad), Err(ValidationError::Symbol), "input {bad:?}");
        }
    }

    #[test]
    fn side_is_case_insensitive() {
        assert_eq!(side("buy"), Ok(Side::Buy));
        assert_eq!(side("SeLl"), Ok(Side::Sell));
        for bad in ["", "b", "long", "buy ", "sells"] {
            assert_eq!(side(bad), Err(ValidationError::Side), "input {bad:?}");
        }
    }

    #[test]
    fn order_type_accepts_the_three_kinds() {
        assert_eq!(order_type("market"), Ok(OrderType::Market));
        assert_eq!(order_type("Limit"), Ok(OrderType::Limit));
        assert_eq!(order_type("stop_limit"), Ok(OrderType::StopLimit));
        assert_eq!(order_type("STOP"), Err(ValidationError::OrderType));
    }

    #[test]
    fn positive_decimal_keeps_scale() {
        let q = positive_decimal("0.0010").unwrap();
        assert_eq!(q, dec!(0.001));
        assert_eq!(q.to_string(), "0.0010");
        assert_eq!(positive_decimal("65000.5").unwrap().to_string(), "65000.5");
    }

    #[test]
    fn positive_decimal_rejects_zero_negative_and_garbage() {
        assert_eq!(positive_decimal("0"), Err(ValidationError::NotPositive));
        assert_eq!(positive_decimal("0.000"), Err(ValidationError::NotPositive));
        assert_eq!(positive_decimal("-1.5"), Err(ValidationError::NotPositive));
        for bad in ["", "abc", "1.2.3", "NaN", "1,000"] {
            assert!(matches!(positive_decimal(bad), Err(ValidationError::Decimal(_))), "input {bad:?}");
        }
    }

    #[test]
    fn positive_decimal_accepts_exponent_form() {
        let q = positive_decimal("1e-3").unwrap();
        assert_eq!(q, dec!(0.001));
        assert_eq!(q.to_string(), "0.001");
        assert_eq!(positive_decimal("2.5E2").unwrap().to_string(), "250");
        assert_eq!(positive_decimal("-1e-3"), Err(ValidationError::NotPositive));
        for bad in ["1e", "e5", "1e-40"] {
            assert!(matches!(positive_decimal(bad), Err(ValidationError::Decimal(_))), "input {bad:?}");
        }
    }

    proptest! {
        #[test]
        fn any_alphanumeric_symbol_is_uppercased(s in "[A-Za-z0-9]{1,20}") {
            let upper = s.to_ascii_uppercase();
            let sym = symbol(&s).unwrap();
            prop_assert_eq!(sym.as_str(), upper.as_str());
        }

        #[test]
        fn symbol_with_separator_is_rejected(head in "[A-Za-z0-9]{0,8}", sep in "[-/_ .:]", tail in "[A-Za-z0-9]{0,8}") {
            prop_assert_eq!(symbol(&format!("{head}{sep}{tail}")), Err(ValidationError::Symbol));
        }

        #[test]
        fn side_ignores_letter_case(word in prop::sample::select(vec!["buy", "sell"]), mask in any::<u8>()) {
            let mixed: String = word
                .chars()
                .enumerate()
                .map(|(i, c)| if mask & (1 << i) != 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            let expected = if word == "buy" { Side::Buy } else { Side::Sell };
            prop_assert_eq!(side(&mixed), Ok(expected));
        }

        #[test]
        fn other_words_are_not_a_side(s in "[a-zA-Z]{0,6}") {
            let upper = s.to_ascii_uppercase();
            prop_assume!(upper != "BUY" && upper != "SELL");
            prop_assert_eq!(side(&s), Err(ValidationError::Side));
        }

        #[test]
        fn positive_decimal_keeps_value_and_text(m in 1i64..=i64::MAX, scale in 0u32..=18) {
            let d = Decimal::new(m, scale);
            let text = d.to_string();
            let parsed = positive_decimal(&text).unwrap();
            prop_assert_eq!(parsed, d);
            prop_assert_eq!(parsed.to_string(), text);
        }

        #[test]
        fn non_positive_decimal_is_rejected(m in (i64::MIN + 1)..=0i64, scale in 0u32..=18) {
            let text = Decimal::new(m, scale).to_string();
            prop_assert_eq!(positive_decimal(&text), Err(ValidationError::NotPositive));
        }
    }

    #[test]
    fn order_id_digits_only() {
        assert_eq!(order_id("4051234567").unwrap().as_str(), "4051234567");
        assert_eq!(order_id(""), Err(ValidationError::OrderId));
        assert_eq!(order_id("12a"), Err(ValidationError::OrderId));
        assert_eq!(order_id("-5"), Err(ValidationError::OrderId));
    }
}
