//! Sample data models and templates for tests.

use serde_json::{Value, json};

/// Data models matching the seed templates and common test templates.
pub struct DataFixture;

impl DataFixture {
    /// Model for the seeded "Welcome Email" template.
    pub fn welcome() -> Value {
        json!({
            "Name": "ada lovelace",
            "Email": "ada@example.com",
            "Company": "Acme"
        })
    }

    /// An order with numbers, dates and a nested customer.
    pub fn order() -> Value {
        json!({
            "OrderId": "A-1001",
            "OrderDate": "2024-03-05T14:30:00",
            "Total": 1234.5,
            "Discount": 0.125,
            "Items": 3,
            "Customer": {
                "Name": "grace hopper",
                "Email": "grace@example.com",
                "Tier": "gold"
            }
        })
    }

    /// Template using the order model.
    pub const ORDER_TEMPLATE: &'static str = concat!(
        "<h1>Order {{OrderId}}</h1>",
        "<p>Hello {{titleCase Customer.Name}},</p>",
        "<p>Placed {{formatDate OrderDate \"yyyy-MM-dd\"}}, total {{currency Total}}, ",
        "discount {{percentage Discount}}.</p>",
        "{{#gt Total 1000}}<p>Free shipping!</p>{{else}}<p>Standard shipping</p>{{/gt}}",
        "{{> footer}}"
    );
}
