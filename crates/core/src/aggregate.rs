//! Cross-store aggregation.
//!
//! A pure fold over fetched bundles. Revenue is summed with exact decimal
//! arithmetic, so the result does not depend on bundle order.

use crate::error::DataFormatError;
use crate::types::{AggregateSummary, StoreDataBundle};

/// Compute total products, orders and revenue across `bundles`.
///
/// Empty input yields an all-zero summary.
///
/// # Errors
///
/// Returns a `DataFormatError` if any order's `total_price` is not a
/// base-10 decimal or the revenue sum overflows. Malformed totals are never
/// counted as zero.
pub fn aggregate<'a, I>(bundles: I) -> Result<AggregateSummary, DataFormatError>
where
    I: IntoIterator<Item = &'a StoreDataBundle>,
{
    bundles
        .into_iter()
        .try_fold(AggregateSummary::default(), |acc, bundle| {
            acc.merge(AggregateSummary::of_bundle(bundle)?)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{Amount, Order, Product, ShopInfo, StoreSummary, StoreUrl, Variant};

    fn product(title: &str, inventory: Option<i64>) -> Product {
        Product {
            id: None,
            title: title.to_string(),
            product_type: None,
            variants: vec![Variant {
                price: Amount::from("9.99"),
                inventory_quantity: inventory,
            }],
        }
    }

    fn order(name: &str, total: &str) -> Order {
        Order {
            id: None,
            name: name.to_string(),
            created_at: Utc::now(),
            total_price: total.to_string(),
            line_items: vec![],
        }
    }

    fn bundle(url: &str, products: Vec<Product>, orders: Vec<Order>) -> StoreDataBundle {
        StoreDataBundle {
            shop: ShopInfo {
                name: url.to_string(),
                domain: url.to_string(),
                email: None,
                currency: None,
            },
            products,
            orders,
            store_url: StoreUrl::parse(url).unwrap(),
        }
    }

    fn two_stores() -> Vec<StoreDataBundle> {
        vec![
            bundle(
                "a.myshopify.com",
                vec![product("A", Some(3)), product("B", None)],
                vec![order("#1001", "10.50"), order("#1002", "5.25")],
            ),
            bundle(
                "c.myshopify.com",
                vec![product("C", Some(7))],
                vec![order("#2001", "1.00")],
            ),
        ]
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&Vec::<StoreDataBundle>::new()).unwrap();
        assert_eq!(summary, AggregateSummary::default());
        assert_eq!(summary.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_two_stores() {
        let summary = aggregate(&two_stores()).unwrap();
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue, Decimal::new(1675, 2));
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let bundles = two_stores();
        let reversed: Vec<StoreDataBundle> = bundles.iter().rev().cloned().collect();
        assert_eq!(aggregate(&bundles).unwrap(), aggregate(&reversed).unwrap());
    }

    #[test]
    fn test_aggregate_exact_decimal_sum() {
        // 0.1 + 0.2 must be exactly 0.3
        let bundles = vec![bundle(
            "a.myshopify.com",
            vec![],
            vec![order("#1", "0.1"), order("#2", "0.2")],
        )];
        assert_eq!(
            aggregate(&bundles).unwrap().total_revenue,
            Decimal::new(3, 1)
        );
    }

    #[test]
    fn test_aggregate_malformed_total_price() {
        let mut bundles = two_stores();
        bundles[1].orders.push(order("#2002", "abc"));
        let err = aggregate(&bundles).unwrap_err();
        assert_eq!(err.field, "total_price");
    }

    #[test]
    fn test_store_summary_counts_inventory() {
        let bundles = two_stores();
        let first = StoreSummary::of(&bundles[0]).unwrap();
        assert_eq!(first.total_inventory, 3);
        assert_eq!(first.totals.total_orders, 2);
        assert_eq!(first.totals.total_revenue, Decimal::new(1575, 2));
    }

    #[test]
    fn test_store_summaries_merge_to_aggregate() {
        let bundles = two_stores();
        let merged = bundles
            .iter()
            .map(|b| StoreSummary::of(b).unwrap().totals)
            .try_fold(AggregateSummary::default(), AggregateSummary::merge)
            .unwrap();
        assert_eq!(merged, aggregate(&bundles).unwrap());
    }

    const MAX_DECIMAL: &str = "79228162514264337593543950335";

    #[test]
    fn test_aggregate_revenue_overflow_within_store() {
        let bundles = vec![bundle(
            "a.myshopify.com",
            vec![],
            vec![order("#1", MAX_DECIMAL), order("#2", MAX_DECIMAL)],
        )];
        let err = aggregate(&bundles).unwrap_err();
        assert_eq!(err, DataFormatError::new("total_price", "revenue overflow"));
    }

    #[test]
    fn test_aggregate_revenue_overflow_across_stores() {
        let bundles = vec![
            bundle("a.myshopify.com", vec![], vec![order("#1", MAX_DECIMAL)]),
            bundle("b.myshopify.com", vec![], vec![order("#2", MAX_DECIMAL)]),
        ];
        let err = aggregate(&bundles).unwrap_err();
        assert_eq!(err.field, "total_price");
    }

    #[test]
    fn test_store_summary_inventory_overflow() {
        let bundles = vec![bundle(
            "a.myshopify.com",
            vec![product("A", Some(i64::MAX)), product("B", Some(1))],
            vec![],
        )];
        let err = StoreSummary::of(&bundles[0]).unwrap_err();
        assert_eq!(err.field, "inventory_quantity");
    }

    #[test]
    fn test_merge_count_overflow() {
        let full = AggregateSummary {
            total_products: u64::MAX,
            ..AggregateSummary::default()
        };
        let one = AggregateSummary {
            total_products: 1,
            ..AggregateSummary::default()
        };
        assert_eq!(full.merge(one).unwrap_err().field, "total_products");
    }
}
