//! Mapping between the nested user shape and the flat `users` row.
//!
//! `flatten` and `expand` are pure inverses over the user's own fields;
//! `id` and the timestamps come from storage.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use userbase_core::{Address, Geo, User, UserDetails, UserId};

/// Column list in the order `UserRow` expects, for `SELECT`s.
pub const USER_COLUMNS: &str = "id, name, email, phone, company, \
     address_street, address_city, address_zip, geo_lat, geo_lng, \
     created_at, updated_at";

/// A `users` row as read back from storage.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address_street: String,
    pub address_city: String,
    pub address_zip: String,
    pub geo_lat: f64,
    pub geo_lng: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The writable columns of a `users` row, borrowed from a [`UserDetails`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserColumns<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub company: &'a str,
    pub address_street: &'a str,
    pub address_city: &'a str,
    pub address_zip: &'a str,
    pub geo_lat: f64,
    pub geo_lng: f64,
}

/// Nested wire shape → flat columns.
pub fn flatten(details: &UserDetails) -> UserColumns<'_> {
    UserColumns {
        name: &details.name,
        email: &details.email,
        phone: &details.phone,
        company: &details.company,
        address_street: &details.address.street,
        address_city: &details.address.city,
        address_zip: &details.address.zip,
        geo_lat: details.address.geo.lat,
        geo_lng: details.address.geo.lng,
    }
}

/// Flat row → nested wire shape.
pub fn expand(row: UserRow) -> User {
    User {
        id: UserId::new(row.id),
        details: UserDetails {
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            address: Address {
                street: row.address_street,
                city: row.address_city,
                zip: row.address_zip,
                geo: Geo {
                    lat: row.geo_lat,
                    lng: row.geo_lng,
                },
            },
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
