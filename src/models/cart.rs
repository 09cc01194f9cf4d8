// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Merchandise cart totals.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// One line in the cart, as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CartLine {
    #[serde(default)]
    #[validate(length(max = 200, message = "Item name must be at most 200 characters"))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100000.0, message = "Price must be between 0 and 100000"))]
    pub price: f64,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be 1-1000"))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartQuoteRequest {
    #[validate(length(max = 100, message = "Cart must have at most 100 lines"), nested)]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CartQuote {
    /// Number of lines, not units.
    pub item_count: usize,
    pub total_price: f64,
    /// e.g. `$42.50`
    pub formatted_total_price: String,
}

pub fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn quote_cart(items: &[CartLine]) -> CartQuote {
    let total_price: f64 = items
        .iter()
        .map(|line| line.price * f64::from(line.quantity))
        .fold(0.0, |acc, x| acc + x);

    CartQuote {
        item_count: items.len(),
        total_price,
        formatted_total_price: format_price(total_price),
    }
}
