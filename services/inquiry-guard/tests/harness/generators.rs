// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client identifiers (10.x.x.x addresses).
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// A plausible contact submission.
pub fn legitimate_contact(i: usize) -> Value {
    json!({
        "type": "contact",
        "name": format!("Jane Smith {}", ["A", "B", "C"][i % 3]),
        "email": format!("jane.{}@company{}.com", i, i % 7),
        "company": "Smith Engineering",
        "subject": "product-inquiry",
        "message": format!("We are evaluating busbar options for project {}. Could you send a datasheet?", i),
    })
}

/// A plausible inquiry submission.
pub fn legitimate_inquiry(i: usize) -> Value {
    json!({
        "type": "inquiry",
        "name": "Carlos Ruiz",
        "email": format!("carlos.{}@industrias.es", i),
        "company": "Industrias Ruiz",
        "phone": "+34 612 345 678",
        "productInterest": "Flexible Busbar",
        "message": "Necesitamos una cotización para 300 unidades.",
        "locale": "es",
    })
}

/// Contact submission carrying three spam keywords (45 points).
pub fn spam_contact(i: usize) -> Value {
    json!({
        "type": "contact",
        "name": "Promo Team",
        "email": format!("offers{}@promo-mail.net", i),
        "message": "Limited time offer for your business, click here to claim free money today.",
    })
}

/// Contact submission from a temporary mail provider that is not on the
/// blocked list (30 points).
pub fn disposable_contact(i: usize) -> Value {
    json!({
        "type": "contact",
        "name": "Alex Brown",
        "email": format!("alex{}@tempinbox{}.com", i, i % 5),
        "message": "Please send me pricing information for your products.",
    })
}

/// Contact submissions missing a required field, rotating which one.
pub fn incomplete_contact(i: usize) -> Value {
    let mut value = legitimate_contact(i);
    if let Some(map) = value.as_object_mut() {
        let field = ["name", "email", "message"][i % 3];
        map.remove(field);
    }
    value
}

/// Email addresses that must fail format validation.
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "plainaddress",
        "@missing-local.com",
        "missing-at.example.com",
        "two@@example.com",
        "spaces in@example.com",
        "trailing@",
        "no-tld@example",
        "dot@.example.com",
    ]
}

/// Non-object bodies and type-confused fields.
pub fn generate_malformed_payloads() -> Vec<Value> {
    vec![
        Value::Null,
        json!([]),
        json!("a string"),
        json!(42),
        json!({"name": 5, "email": "a@b.co", "message": "hello there"}),
        json!({"name": "Ann Lee", "email": ["a@b.co"], "message": "hello there"}),
        json!({"type": "newsletter", "name": "Ann Lee", "email": "a@b.co", "message": "hello there"}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
        assert_eq!(clients[1], "10.0.0.1");
    }

    #[test]
    fn test_incomplete_contact_drops_one_field() {
        for i in 0..3 {
            let value = incomplete_contact(i);
            let map = value.as_object().unwrap();
            assert_eq!(map.len(), legitimate_contact(i).as_object().unwrap().len() - 1);
        }
    }
}
