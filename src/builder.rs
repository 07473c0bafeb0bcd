// ===============================
// src/builder.rs
// ===============================
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{OrderRequest, OrderType, Side, Symbol, TimeInForce};
use crate::validate::ValidationError;

/// Validated user inputs for one order. Which prices are required depends
/// on `order_type`; extra prices are dropped by [`build_order`].
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
}

/// Non-fatal observation about an order that is still submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderWarning {
    /// Stop sits on the wrong side of the limit price for this side, so the
    /// order may fill immediately once triggered or never fill.
    StopPriceInverted { side: Side, stop_price: Decimal, price: Decimal },
}

impl std::fmt::Display for OrderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderWarning::StopPriceInverted { side, stop_price, price } => write!(
                f,
                "Unusual STOP_LIMIT prices for {side}: stopPrice {stop_price}, limitPrice {price}. \
                 Order might fill immediately or not at all."
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuiltOrder {
    pub request: OrderRequest,
    pub warnings: Vec<OrderWarning>,
}

/// Assemble an [`OrderRequest`] from validated inputs.
///
/// LIMIT needs `price`; STOP_LIMIT needs `price` and `stop_price`. Any order
/// carrying a price is GTC. Warnings never block the request.
pub fn build_order(input: OrderInput) -> Result<BuiltOrder, ValidationError> {
    let OrderInput { symbol, side, order_type, quantity, price, stop_price } = input;
    let mut warnings = Vec::new();

    let (price, stop_price) = match order_type {
        OrderType::Market => (None, None),
        OrderType::Limit => {
            let px = price.ok_or(ValidationError::MissingPrice(order_type))?;
            (Some(px), None)
        }
        OrderType::StopLimit => {
            let px = price.ok_or(ValidationError::MissingPrice(order_type))?;
            let stop = stop_price.ok_or(ValidationError::MissingStopPrice(order_type))?;
            let inverted = match side {
                Side::Buy => stop >= px,
                Side::Sell => stop <= px,
            };
            if inverted {
                let w = OrderWarning::StopPriceInverted { side, stop_price: stop, price: px };
                warn!(symbol = %symbol, "{w}");
                warnings.push(w);
            }
            (Some(px), Some(stop))
        }
    };

    let time_in_force = order_type.needs_price().then_some(TimeInForce::GoodTillCancelled);

    Ok(BuiltOrder {
        request: OrderRequest { symbol, side, order_type, quantity, price, stop_price, time_in_force },
        warnings,
    })
}
