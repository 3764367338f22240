//! Validation of inbound user payloads.
//!
//! A [`UserPayload`] is whatever the client sent, with every field optional and
//! loosely typed. [`UserPayload::validate`] checks all fields at once and either
//! returns the normalized [`UserDetails`] (trimmed text, lowercased email,
//! parsed coordinates) or the complete list of field failures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::ValidateEmail;

use crate::user::{Address, Geo, UserDetails};

/// Raw create/update body.
///
/// Only a JSON object deserializes into a payload; arrays and scalars are
/// rejected by the parser. Nested `address` and `address.geo` stay untyped so a
/// wrongly shaped value is reported per field by [`UserPayload::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UserPayload {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub company: Option<Value>,
    pub address: Option<Value>,
}

impl From<Map<String, Value>> for UserPayload {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            name: body.remove("name"),
            email: body.remove("email"),
            phone: body.remove("phone"),
            company: body.remove("company"),
            address: body.remove("address"),
        }
    }
}

/// One failed field, addressed by its dotted wire path (e.g. `address.geo.lat`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field failure found in a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error, Serialize)]
#[serde(transparent)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError::new(field, message));
    }
}

impl UserPayload {
    /// Validate and normalize the payload.
    ///
    /// Never stops at the first failure: the error lists every bad field.
    pub fn validate(&self) -> Result<UserDetails, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required_text(&mut errors, "name", self.name.as_ref(), "Name is required");
        let email = email(&mut errors, self.email.as_ref());
        let phone = required_text(&mut errors, "phone", self.phone.as_ref(), "Phone is required");
        let company =
            required_text(&mut errors, "company", self.company.as_ref(), "Company is required");

        // A non-object address (or geo) reports each of its fields as missing.
        let address = as_object(self.address.as_ref());
        let street = required_text(
            &mut errors,
            "address.street",
            member(address, "street"),
            "Street is required",
        );
        let city =
            required_text(&mut errors, "address.city", member(address, "city"), "City is required");
        let zip = required_text(
            &mut errors,
            "address.zip",
            member(address, "zip"),
            "Zip code is required",
        );

        let geo = as_object(member(address, "geo"));
        let lat = coordinate(
            &mut errors,
            "address.geo.lat",
            member(geo, "lat"),
            "Latitude must be a valid number",
        );
        let lng = coordinate(
            &mut errors,
            "address.geo.lng",
            member(geo, "lng"),
            "Longitude must be a valid number",
        );

        match (name, email, phone, company, street, city, zip, lat, lng) {
            (
                Some(name),
                Some(email),
                Some(phone),
                Some(company),
                Some(street),
                Some(city),
                Some(zip),
                Some(lat),
                Some(lng),
            ) => Ok(UserDetails {
                name,
                email,
                phone,
                company,
                address: Address {
                    street,
                    city,
                    zip,
                    geo: Geo { lat, lng },
                },
            }),
            _ => Err(errors),
        }
    }
}

fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

fn member<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    object.and_then(|o| o.get(key))
}

/// Trimmed text of a scalar value. Numbers are accepted in their JSON spelling.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
    message: &str,
) -> Option<String> {
    match scalar_text(value) {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.push(field, message);
            None
        }
    }
}

/// Normalized form of an email address: trimmed and lowercased.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn email(errors: &mut ValidationErrors, value: Option<&Value>) -> Option<String> {
    let normalized = match value {
        Some(Value::String(s)) => normalize_email(s),
        _ => String::new(),
    };
    if normalized.validate_email() && has_dotted_domain(&normalized) {
        Some(normalized)
    } else {
        errors.push("email", "Valid email is required");
        None
    }
}

/// Stricter than RFC 5321: the domain needs at least one dot (`a@localhost` fails).
fn has_dotted_domain(email: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') && !domain.ends_with('.'))
}

fn coordinate(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Value>,
    message: &str,
) -> Option<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(field, message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> UserPayload {
        serde_json::from_value(value).unwrap()
    }

    fn valid_body() -> Value {
        json!({
            "name": "  Ervin Howell ",
            "email": " Shanna@Melissa.TV ",
            "phone": "010-692-6593 x09125",
            "company": "Deckow-Crist",
            "address": {
                "street": "Victor Plains",
                "city": "Wisokyburgh",
                "zip": "90566-7771",
                "geo": { "lat": -43.9509, "lng": "-34.4618" }
            }
        })
    }

    #[test]
    fn valid_payload_is_normalized() {
        let details = payload(valid_body()).validate().unwrap();
        assert_eq!(details.name, "Ervin Howell");
        assert_eq!(details.email, "shanna@melissa.tv");
        assert_eq!(details.address.zip, "90566-7771");
        assert_eq!(details.address.geo, Geo { lat: -43.9509, lng: -34.4618 });
    }

    #[test]
    fn empty_payload_reports_every_field() {
        let errors = UserPayload::default().validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "email",
                "phone",
                "company",
                "address.street",
                "address.city",
                "address.zip",
                "address.geo.lat",
                "address.geo.lng",
            ]
        );
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let mut body = valid_body();
        body["name"] = json!("   ");
        body["address"]["city"] = json!("\t");

        let errors = payload(body).validate().unwrap_err();
        assert_eq!(errors.iter().count(), 2);
        assert!(errors.contains_field("name"));
        assert!(errors.contains_field("address.city"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in [json!("not-an-email"), json!("a@"), json!("a@localhost"), json!(42), json!(null), json!("  ")] {
            let mut body = valid_body();
            body["email"] = bad.clone();
            let errors = payload(body).validate().unwrap_err();
            assert!(errors.contains_field("email"), "{bad} should be rejected");
            assert_eq!(errors.iter().count(), 1);
        }
    }

    #[test]
    fn coordinates_must_be_finite_numbers() {
        let mut body = valid_body();
        body["address"]["geo"] = json!({ "lat": "north", "lng": true });

        let errors = payload(body).validate().unwrap_err();
        assert!(errors.contains_field("address.geo.lat"));
        assert!(errors.contains_field("address.geo.lng"));
    }

    #[test]
    fn numeric_zip_is_accepted_as_text() {
        let mut body = valid_body();
        body["address"]["zip"] = json!(12345);

        let details = payload(body).validate().unwrap();
        assert_eq!(details.address.zip, "12345");
    }

    #[test]
    fn errors_serialize_as_a_plain_list() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("name");

        let errors = payload(body).validate().unwrap_err();
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!([{ "field": "name", "message": "Name is required" }])
        );
    }

    #[test]
    fn non_object_address_reports_its_fields() {
        for bad in [json!("x"), json!(5), json!([1, 2]), json!(null)] {
            let mut body = valid_body();
            body["address"] = bad.clone();

            let errors = payload(body).validate().unwrap_err();
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(
                fields,
                vec![
                    "address.street",
                    "address.city",
                    "address.zip",
                    "address.geo.lat",
                    "address.geo.lng",
                ],
                "address {bad} should be reported per field"
            );
        }
    }

    #[test]
    fn non_object_geo_reports_coordinates() {
        let mut body = valid_body();
        body["address"]["geo"] = json!(5);

        let errors = payload(body).validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["address.geo.lat", "address.geo.lng"]);
    }

    #[test]
    fn only_objects_deserialize_into_a_payload() {
        let positional = json!([
            "N",
            "arr@example.com",
            "p",
            "c",
            { "street": "s", "city": "c", "zip": "z", "geo": { "lat": 1, "lng": 2 } }
        ]);
        for body in [positional, json!("text"), json!(7), json!(null)] {
            assert!(serde_json::from_value::<UserPayload>(body).is_err());
        }
    }

    #[test]
    fn normalized_email_keeps_dotted_domain() {
        let mut body = valid_body();
        body["email"] = json!("  Ops@Mail.Example.COM ");
        assert_eq!(payload(body).validate().unwrap().email, "ops@mail.example.com");
    }
}
