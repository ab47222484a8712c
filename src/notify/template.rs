// Notification templates
//
// Renders one recipient group into an HTML table plus a plain-text alternative.

use crate::Result;
use crate::grouping::RecipientGroup;
use crate::notify::Notification;
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde_json::json;

/// Default subject line of every notification
pub const DEFAULT_SUBJECT_PREFIX: &str = "!! IMPORTANT !! : Certificate Expiration Notification";

/// Default sign-off under the table
pub const DEFAULT_SIGNATURE: &str = "IT Security Team";

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        table { border-collapse: collapse; width: 100%; }
        th, td { padding: 8px; border: 1px solid #999; text-align: left; }
        th { background-color: #f2f2f2; }
        .expiry { color: red; font-weight: bold; }
        .footer { margin-top: 20px; color: #666; font-size: 12px; }
    </style>
</head>
<body>
    <p>Dear Team,</p>
    <p>This is to inform you that the following certificate(s) <strong>{{headline}}</strong>.</p>
    <table>
        <tr>
            <th>Certificate Name</th>
            <th>Type</th>
            <th>Expiry Date</th>
            <th>Owner</th>
            <th>Issued To</th>
            <th>Associated REQ</th>
            <th>Days Left/Passed</th>
        </tr>
        {{#each certificates}}
        <tr>
            <td>{{name}}</td>
            <td>{{cert_type}}</td>
            <td class="expiry">{{expiry_date}}</td>
            <td>{{owner}}</td>
            <td>{{issued_to}}</td>
            <td>{{comment}}</td>
            <td style="color:{{days_color}}; font-weight:bold; background:{{days_background}};">{{days}}</td>
        </tr>
        {{/each}}
    </table>
    <p>Please take immediate action to renew these certificates.</p>
    <p>Best regards,<br><strong>{{signature}}</strong></p>
    <div class="footer">Generated {{generated}}</div>
</body>
</html>"#;

const TEXT_TEMPLATE: &str = r#"Dear Team,

This is to inform you that the following certificate(s) {{headline}}.

{{#each certificates}}
- {{name}} ({{cert_type}})
    Expiry date:    {{expiry_date}} ({{days}} day(s))
    Owner:          {{owner}}
    Issued to:      {{issued_to}}
    Associated REQ: {{comment}}
{{/each}}

Please take immediate action to renew these certificates.

Best regards,
{{signature}}

---
Generated {{generated}}
"#;

/// Renders recipient groups into notifications
pub struct NotificationFormatter {
    html: Handlebars<'static>,
    text: Handlebars<'static>,
    subject_prefix: String,
    signature: String,
}

impl NotificationFormatter {
    /// Create a formatter with the given subject prefix and signature
    pub fn new(subject_prefix: impl Into<String>, signature: impl Into<String>) -> Result<Self> {
        let mut html = Handlebars::new();
        html.set_strict_mode(true);
        html.register_template_string("notification", HTML_TEMPLATE)?;

        // plain text must not carry HTML entities
        let mut text = Handlebars::new();
        text.set_strict_mode(true);
        text.register_escape_fn(handlebars::no_escape);
        text.register_template_string("notification", TEXT_TEMPLATE)?;

        Ok(Self {
            html,
            text,
            subject_prefix: subject_prefix.into(),
            signature: signature.into(),
        })
    }

    /// Formatter with the stock subject and signature
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_SUBJECT_PREFIX, DEFAULT_SIGNATURE)
    }

    /// Subject line for a group
    pub fn subject(&self, group: &RecipientGroup) -> String {
        format!(
            "{} - {} certificate(s) {}",
            self.subject_prefix,
            group.len(),
            group.urgency().headline()
        )
    }

    /// Render a group evaluated at `now`
    pub fn render(&self, group: &RecipientGroup, now: DateTime<Utc>) -> Result<Notification> {
        let certificates: Vec<_> = group
            .records
            .iter()
            .map(|classified| {
                let record = &classified.record;
                // expired rows are inverted: yellow on red
                let (days_color, days_background) = if classified.is_expired() {
                    ("yellow", "red")
                } else {
                    ("red", "yellow")
                };

                json!({
                    "name": record.name,
                    "cert_type": record.cert_type,
                    "expiry_date": record.expiry_date.format("%Y-%m-%d").to_string(),
                    "owner": record.owner,
                    "issued_to": record.issued_to,
                    "comment": record.comment_or_empty(),
                    "days": classified.days_until_expiry,
                    "days_color": days_color,
                    "days_background": days_background,
                })
            })
            .collect();

        let data = json!({
            "headline": group.urgency().headline(),
            "certificates": certificates,
            "signature": self.signature,
            "generated": now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        });

        let html_body = self.html.render("notification", &data)?;
        let text_body = self.text.render("notification", &data)?;

        Ok(Notification {
            recipients: group.recipients().clone(),
            urgency: group.urgency(),
            subject: self.subject(group),
            html_body,
            text_body,
            certificates: group.certificate_names(),
        })
    }
}
