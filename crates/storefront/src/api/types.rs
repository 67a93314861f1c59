//! Request and response bodies for the QKart backend.

use serde::{Deserialize, Serialize};

use qkart_core::{AddressId, Price, ProductId};

/// Error payload returned with non-2xx responses.
///
/// ```json
/// { "success": false, "message": "Password is incorrect" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: bool,
    pub message: String,
}

/// `POST /cart`
#[derive(Debug, Clone, Serialize)]
pub struct UpsertCartRequest<'a> {
    #[serde(rename = "productId")]
    pub product_id: &'a ProductId,
    #[serde(rename = "qty")]
    pub quantity: u32,
}

/// `POST /cart/checkout`
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest<'a> {
    #[serde(rename = "addressId")]
    pub address_id: &'a AddressId,
}

/// `POST /user/addresses`
#[derive(Debug, Clone, Serialize)]
pub struct NewAddressRequest<'a> {
    pub address: &'a str,
}

/// `POST /auth/login` and `POST /auth/register`
#[derive(Clone, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `POST /auth/login` response.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub balance: Price,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_parses_backend_shape() {
        let json = r#"{"success":true,"token":"testtoken","username":"criodo","balance":5000}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.username, "criodo");
        assert_eq!(response.balance, Price::from_units(5000));
        assert!(!format!("{response:?}").contains("testtoken"));
    }

    #[test]
    fn test_upsert_request_wire_names() {
        let id = ProductId::new("p1");
        let body = serde_json::to_value(UpsertCartRequest {
            product_id: &id,
            quantity: 0,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"productId": "p1", "qty": 0}));
    }

    #[test]
    fn test_error_body_without_success_flag() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"Product doesn't exist"}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.message, "Product doesn't exist");
    }
}
