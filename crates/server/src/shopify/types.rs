//! Payload types for the Shopify Admin REST API.
//!
//! Only the fields the sync pipeline consumes are modeled; everything else in
//! the payload is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A product as returned by `products.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    /// Shopify-assigned numeric ID.
    pub id: i64,
    /// Product title.
    pub title: String,
    /// Variants; the first variant's price is the product's price.
    #[serde(default)]
    pub variants: Vec<VariantPayload>,
}

impl ProductPayload {
    /// Price string of the first variant, when present.
    #[must_use]
    pub fn first_variant_price(&self) -> Option<&str> {
        self.variants.first().and_then(|v| v.price.as_deref())
    }
}

/// A product variant.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantPayload {
    /// Price as a decimal string (e.g., "19.99").
    pub price: Option<String>,
}

/// A customer as returned by `customers.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPayload {
    /// Shopify-assigned numeric ID.
    pub id: i64,
    /// Email address, if on file.
    pub email: Option<String>,
    /// First name, if on file.
    pub first_name: Option<String>,
    /// Last name, if on file.
    pub last_name: Option<String>,
}

/// An order as returned by `orders.json` and by `orders/create` webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    /// Shopify-assigned numeric ID.
    pub id: i64,
    /// Order total as a decimal string.
    pub total_price: Option<String>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// The customer who placed the order, if Shopify knows one.
    pub customer: Option<OrderCustomerRef>,
    /// When the order was placed.
    pub created_at: Option<DateTime<Utc>>,
}

/// Reference to the ordering customer inside an order payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCustomerRef {
    /// Shopify-assigned numeric customer ID.
    pub id: i64,
}

/// Envelope for `products.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<ProductPayload>,
}

/// Envelope for `customers.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct CustomersEnvelope {
    #[serde(default)]
    pub customers: Vec<CustomerPayload>,
}

/// Envelope for `orders.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrdersEnvelope {
    #[serde(default)]
    pub orders: Vec<OrderPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_product_with_variants() {
        let payload: ProductPayload = serde_json::from_str(
            r#"{"id": 632910392, "title": "IPod Nano", "variants": [{"price": "199.00"}, {"price": "209.00"}]}"#,
        )
        .unwrap();

        assert_eq!(payload.id, 632_910_392);
        assert_eq!(payload.first_variant_price(), Some("199.00"));
    }

    #[test]
    fn product_without_variants_has_no_price() {
        let payload: ProductPayload =
            serde_json::from_str(r#"{"id": 1, "title": "Ghost"}"#).unwrap();
        assert_eq!(payload.first_variant_price(), None);
    }

    #[test]
    fn deserializes_order_with_customer_ref() {
        let payload: OrderPayload = serde_json::from_str(
            r#"{
                "id": 450789469,
                "total_price": "409.94",
                "currency": "USD",
                "customer": {"id": 207119551, "email": "bob@example.com"},
                "created_at": "2024-03-13T16:09:54-04:00"
            }"#,
        )
        .unwrap();

        assert_eq!(payload.customer.as_ref().map(|c| c.id), Some(207_119_551));
        assert_eq!(payload.total_price.as_deref(), Some("409.94"));
        assert!(payload.created_at.is_some());
    }

    #[test]
    fn ignores_unknown_fields() {
        let payload: CustomerPayload = serde_json::from_str(
            r#"{"id": 7, "email": null, "first_name": "Ada", "last_name": null, "tags": "vip", "orders_count": 3}"#,
        )
        .unwrap();

        assert_eq!(payload.first_name.as_deref(), Some("Ada"));
        assert_eq!(payload.email, None);
    }
}
