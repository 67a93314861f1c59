//! Catalog product types.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("rating must be between 0 and {max} (got {got})", max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub got: u8,
}

/// Aggregate product rating, an integer out of five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` if `stars` is above [`Rating::MAX`].
    pub const fn new(stars: u8) -> Result<Self, RatingError> {
        if stars > Self::MAX {
            return Err(RatingError { got: stars });
        }
        Ok(Self(stars))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A product available to buy.
///
/// Products are immutable once fetched; the catalog is replaced wholesale on
/// every refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Name or title of the product.
    pub name: String,
    /// Category the product belongs to.
    pub category: String,
    /// Unit price.
    pub cost: Price,
    /// Aggregate rating.
    pub rating: Rating,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{
            "name": "iPhone XR",
            "category": "Phones",
            "cost": 100,
            "rating": 4,
            "image": "https://i.imgur.com/lulqWzW.jpg",
            "_id": "v4sLtEcMpzabRyfx"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "v4sLtEcMpzabRyfx");
        assert_eq!(product.name, "iPhone XR");
        assert_eq!(product.cost, Price::from_units(100));
        assert_eq!(product.rating.stars(), 4);
        assert_eq!(product.image_url, "https://i.imgur.com/lulqWzW.jpg");
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        assert_eq!(Rating::new(6), Err(RatingError { got: 6 }));
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
    }
}
