//! Month summary generation.
//!
//! Computes the figures behind the monthly report: stock counts for a period and the
//! money made on what was sold. Formatting is left to the caller.

use crate::{
    context::TrackerContext,
    entities::{ProductStatus, month_record, product},
    errors::Result,
};

/// Aggregated figures for one month record.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// The period being summarized
    pub month_record: month_record::Model,
    /// Number of products booked under the period
    pub total_products: usize,
    /// Products with status sold
    pub sold_products: usize,
    /// Products with status available
    pub available_products: usize,
    /// Cost of every product, sold or not
    pub total_cost: f64,
    /// Selling price of sold products
    pub total_revenue: f64,
    /// Profit of sold products
    pub total_profit: f64,
}

/// Folds a list of products into summary figures.
#[must_use]
pub fn summarize_products(
    month_record: month_record::Model,
    products: &[product::Model],
) -> MonthSummary {
    let sold: Vec<&product::Model> = products
        .iter()
        .filter(|p| p.status == ProductStatus::Sold)
        .collect();

    MonthSummary {
        month_record,
        total_products: products.len(),
        sold_products: sold.len(),
        available_products: products.len() - sold.len(),
        total_cost: products.iter().map(|p| p.cost_price).sum(),
        total_revenue: sold.iter().map(|p| p.selling_price).sum(),
        total_profit: sold.iter().map(|p| p.profit).sum(),
    }
}

/// Generates the summary for a month record.
///
/// # Errors
/// Returns [`crate::errors::Error::MonthRecordNotFound`] if the record does not exist,
/// or a database error.
pub async fn summarize_month_record(
    ctx: &TrackerContext,
    month_record_id: i64,
) -> Result<MonthSummary> {
    let month_record = ctx.month_records.get(month_record_id).await?;
    let items = ctx.products.list_by_month_record(month_record_id).await?;
    Ok(summarize_products(month_record, &items))
}
