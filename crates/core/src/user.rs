//! The user entity and its nested value types.
//!
//! These are the wire shapes: `address` and `address.geo` are always nested
//! objects, never partially present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Geographic coordinates of an address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

/// Postal address with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub geo: Geo,
}

/// Every user field a client supplies, validated and normalized.
///
/// Create and update both replace the full set; there is no partial form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: Address,
}

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub details: UserDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn serializes_to_nested_wire_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let user = User {
            id: UserId::new(7),
            details: UserDetails {
                name: "Leanne Graham".to_string(),
                email: "sincere@april.biz".to_string(),
                phone: "1-770-736-8031".to_string(),
                company: "Romaguera-Crona".to_string(),
                address: Address {
                    street: "Kulas Light".to_string(),
                    city: "Gwenborough".to_string(),
                    zip: "92998-3874".to_string(),
                    geo: Geo { lat: -37.3159, lng: 81.1496 },
                },
            },
            created_at: at,
            updated_at: at,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "Leanne Graham",
                "email": "sincere@april.biz",
                "phone": "1-770-736-8031",
                "company": "Romaguera-Crona",
                "address": {
                    "street": "Kulas Light",
                    "city": "Gwenborough",
                    "zip": "92998-3874",
                    "geo": { "lat": -37.3159, "lng": 81.1496 }
                },
                "created_at": "2024-05-01T12:00:00Z",
                "updated_at": "2024-05-01T12:00:00Z"
            })
        );
    }
}
