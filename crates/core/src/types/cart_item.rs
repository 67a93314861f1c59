//! Cart types.
//!
//! The backend only stores `(productId, qty)` pairs. The display-ready
//! [`CartItem`] is derived from those pairs and the catalog by
//! [`crate::cart::reconcile`].

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId, Rating};

/// A server-held cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCartRecord {
    /// Product this line refers to.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Quantity in the cart.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl ServerCartRecord {
    /// Create a cart record.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart record joined with its product's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    /// Unit price.
    pub cost: Price,
    pub rating: Rating,
    pub image_url: String,
    pub quantity: u32,
}

impl CartItem {
    /// Build a cart item from a product and a quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            cost: product.cost,
            rating: product.rating,
            image_url: product.image_url.clone(),
            quantity,
        }
    }

    /// Cost of this line (`cost * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.cost.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_record_wire_names() {
        let record: ServerCartRecord =
            serde_json::from_str(r#"{"productId":"KCRwjF7lN97HnEaY","qty":3}"#).unwrap();
        assert_eq!(record, ServerCartRecord::new("KCRwjF7lN97HnEaY", 3));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["productId"], "KCRwjF7lN97HnEaY");
        assert_eq!(json["qty"], 3);
    }
}
