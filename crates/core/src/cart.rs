//! Cart reconciliation.
//!
//! The backend returns a sparse cart of `(productId, qty)` records. The
//! storefront needs display-ready lines, so every cart fetch or mutation is
//! followed by [`reconcile`], which joins the records with the catalog.
//!
//! ## Invariants
//!
//! - Output order follows the input record order.
//! - At most one [`CartItem`] per product ID; a product repeated across
//!   records keeps only its first record.
//! - Records whose product is missing from the catalog are dropped without
//!   error. Catalog drift heals on the next refetch.

use std::collections::{HashMap, HashSet};

use crate::types::{CartItem, Price, Product, ProductId, ServerCartRecord};

/// Join server cart records with the catalog.
///
/// Pure: no side effects, and empty inputs produce an empty cart.
#[must_use]
pub fn reconcile(records: &[ServerCartRecord], catalog: &[Product]) -> Vec<CartItem> {
    if records.is_empty() || catalog.is_empty() {
        return Vec::new();
    }

    let index: HashMap<&ProductId, &Product> = catalog.iter().map(|p| (&p.id, p)).collect();
    let mut seen: HashSet<&ProductId> = HashSet::with_capacity(records.len());

    records
        .iter()
        .filter(|record| seen.insert(&record.product_id))
        .filter_map(|record| {
            index
                .get(&record.product_id)
                .map(|product| CartItem::from_product(product, record.quantity))
        })
        .collect()
}

/// Total value of the cart: the sum of `cost * quantity` over all lines.
#[must_use]
pub fn total_cart_value(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

/// Total number of units across all lines.
#[must_use]
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|i| i.quantity).fold(0, u32::saturating_add)
}

/// Whether `product_id` already has a line in the cart.
#[must_use]
pub fn contains_product(items: &[CartItem], product_id: &ProductId) -> bool {
    items.iter().any(|i| &i.product_id == product_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::Rating;

    fn product(id: &str, cost: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Test".to_string(),
            cost: Price::from_units(cost),
            rating: Rating::new(4).unwrap(),
            image_url: format!("https://img.example/{id}.jpg"),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![product("p1", 100), product("p2", 20), product("p3", 5)]
    }

    #[test]
    fn test_reconcile_empty_inputs() {
        assert!(reconcile(&[], &catalog()).is_empty());
        assert!(reconcile(&[ServerCartRecord::new("p1", 1)], &[]).is_empty());
        assert!(reconcile(&[], &[]).is_empty());
    }

    #[test]
    fn test_reconcile_preserves_record_order() {
        let records = vec![
            ServerCartRecord::new("p3", 2),
            ServerCartRecord::new("p1", 1),
            ServerCartRecord::new("p2", 7),
        ];

        let items = reconcile(&records, &catalog());

        let ids: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
        for (item, record) in items.iter().zip(&records) {
            assert_eq!(item.quantity, record.quantity);
        }
    }

    #[test]
    fn test_reconcile_copies_product_fields() {
        let items = reconcile(&[ServerCartRecord::new("p2", 3)], &catalog());

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name, "Product p2");
        assert_eq!(item.category, "Test");
        assert_eq!(item.cost, Price::from_units(20));
        assert_eq!(item.image_url, "https://img.example/p2.jpg");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_reconcile_drops_orphaned_records() {
        let records = vec![
            ServerCartRecord::new("p1", 1),
            ServerCartRecord::new("gone", 4),
            ServerCartRecord::new("p2", 2),
        ];

        let items = reconcile(&records, &catalog());

        assert_eq!(items.len(), 2);
        assert!(!contains_product(&items, &ProductId::new("gone")));
        assert!(items.len() <= records.len());
    }

    #[test]
    fn test_reconcile_keeps_one_line_per_product() {
        let records = vec![
            ServerCartRecord::new("p1", 1),
            ServerCartRecord::new("p2", 2),
            ServerCartRecord::new("p1", 9),
        ];

        let items = reconcile(&records, &catalog());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id.as_str(), "p1");
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let records = vec![ServerCartRecord::new("p2", 1), ServerCartRecord::new("p1", 2)];
        assert_eq!(reconcile(&records, &catalog()), reconcile(&records, &catalog()));
    }

    #[test]
    fn test_total_cart_value() {
        let records = vec![ServerCartRecord::new("p1", 1), ServerCartRecord::new("p2", 1)];
        let items = reconcile(&records, &catalog());
        assert_eq!(total_cart_value(&items), Price::from_units(120));
        assert_eq!(total_cart_value(&[]), Price::ZERO);
    }

    #[test]
    fn test_total_cart_value_is_additive() {
        let a = reconcile(
            &[ServerCartRecord::new("p1", 2), ServerCartRecord::new("p3", 1)],
            &catalog(),
        );
        let b = reconcile(&[ServerCartRecord::new("p2", 5)], &catalog());
        let combined: Vec<CartItem> = a.iter().chain(&b).cloned().collect();

        assert_eq!(
            total_cart_value(&combined),
            total_cart_value(&a) + total_cart_value(&b)
        );
    }

    #[test]
    fn test_item_count() {
        let items = reconcile(
            &[ServerCartRecord::new("p1", 2), ServerCartRecord::new("p3", 5)],
            &catalog(),
        );
        assert_eq!(item_count(&items), 7);
    }
}
