//! Starter content for a new store.
//!
//! The seed data is a header, footer and button partial plus a "Welcome Email"
//! template that exercises partials, a block helper and the date helpers.
//! `{{Company}}` is expected from the data model or a configured constant.

use super::{EmailTemplate, Partial};

pub const HEADER_PARTIAL: &str = concat!(
    "<div style=\"background-color: #667eea; color: white; padding: 20px; text-align: center;\">",
    "<h1 style=\"margin: 0;\">{{Company}}</h1>",
    "<p style=\"margin: 5px 0 0 0;\">Professional Email Communications</p>",
    "</div>"
);

pub const FOOTER_PARTIAL: &str = concat!(
    "<div style=\"background-color: #f8f9fa; padding: 20px; text-align: center; border-top: 1px solid #dee2e6;\">",
    "<p style=\"margin: 0; color: #6c757d; font-size: 12px;\">",
    "  {{year}} {{Company}}. All rights reserved.<br>",
    "Generated on {{currentDate \"MMM dd, yyyy\" \"en-US\"}}",
    "</p></div>"
);

pub const BUTTON_PARTIAL: &str = concat!(
    "<div style=\"text-align: center; margin: 20px 0;\">",
    "<a href=\"{{url}}\" style=\"background-color: #667eea; color: white; padding: 12px 24px; ",
    "text-decoration: none; border-radius: 5px; display: inline-block;\">{{text}}</a>",
    "</div>"
);

pub const WELCOME_NAME: &str = "Welcome Email";

pub const WELCOME_SUBJECT: &str = "Welcome to {{Company}}, {{Name}}!";

pub const WELCOME_BODY: &str = concat!(
    "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Welcome</title></head>",
    "<body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">",
    "{{> header}}",
    "<div style=\"padding: 30px;\">",
    "<h2>Welcome {{titleCase Name}}!</h2>",
    "<p>We're excited to have you onboard at {{Company}}. Your account has been successfully created.</p>",
    "{{#ifNotEmpty Email}}<p><strong>Your email:</strong> {{Email}}</p>{{/ifNotEmpty}}",
    "<p>If you need any assistance, our support team is always here to help.</p>",
    "<p>Your Joining date is {{currentDate}}.</p>",
    "</div>",
    "{{> footer}}",
    "</body></html>"
);

/// Seed partials, in id order.
pub fn partials() -> Vec<Partial> {
    [("header", HEADER_PARTIAL), ("footer", FOOTER_PARTIAL), ("button", BUTTON_PARTIAL)]
        .into_iter()
        .zip(1..)
        .map(|((name, html), id)| Partial {
            id,
            name: name.to_string(),
            html_content: html.to_string(),
        })
        .collect()
}

/// Seed templates, in id order.
pub fn templates() -> Vec<EmailTemplate> {
    vec![EmailTemplate {
        id: 1,
        name: WELCOME_NAME.to_string(),
        subject: WELCOME_SUBJECT.to_string(),
        html_body: WELCOME_BODY.to_string(),
    }]
}
