use std::fmt::Write;

use crate::{
    entities::contact::{ContactSubmission, SubmissionMeta},
    settings::AppConfig,
};

/// Neutral content model. Both renderings walk the same blocks, so the HTML and
/// plain-text bodies always carry the same content.
#[derive(Debug, Clone)]
pub struct EmailDocument {
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(String),
    Fields { title: String, fields: Vec<(String, String)> },
    Links { intro: String, links: Vec<(String, String)> },
    Quote { title: String, body: String },
    Signature(Vec<String>),
    Footnote { title: String, fields: Vec<(String, String)> },
}

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

impl EmailDocument {
    pub fn render_html(&self, accent_color: &str) -> String {
        let mut html = String::with_capacity(2048);
        html.push_str(r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">"#);
        let _ = write!(
            html,
            r#"<h2 style="color: #333; border-bottom: 2px solid {}; padding-bottom: 10px;">{}</h2>"#,
            accent_color,
            escape_html(&self.heading)
        );

        for block in &self.blocks {
            match block {
                Block::Paragraph(text) => {
                    let _ = write!(html, "<p>{}</p>", escape_html(text));
                }
                Block::Fields { title, fields } => {
                    html.push_str(r#"<div style="background: #f9f9f9; padding: 20px; border-radius: 8px; margin: 20px 0;">"#);
                    let _ = write!(html, r#"<h3 style="color: #333; margin-top: 0;">{}</h3>"#, escape_html(title));
                    for (label, value) in fields {
                        let _ = write!(html, "<p><strong>{}:</strong> {}</p>", escape_html(label), escape_html(value));
                    }
                    html.push_str("</div>");
                }
                Block::Links { intro, links } => {
                    let _ = write!(html, "<p>{}</p><ul>", escape_html(intro));
                    for (label, url) in links {
                        let _ = write!(
                            html,
                            r#"<li><a href="{}" style="color: {};">{}</a></li>"#,
                            escape_html(url),
                            accent_color,
                            escape_html(label)
                        );
                    }
                    html.push_str("</ul>");
                }
                Block::Quote { title, body } => {
                    html.push_str(r#"<div style="background: #fff; padding: 20px; border: 1px solid #ddd; border-radius: 8px;">"#);
                    let _ = write!(html, r#"<h3 style="color: #333; margin-top: 0;">{}</h3>"#, escape_html(title));
                    let _ = write!(html, r#"<p style="white-space: pre-wrap; line-height: 1.6;">{}</p>"#, escape_html(body));
                    html.push_str("</div>");
                }
                Block::Signature(lines) => {
                    let lines: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
                    let _ = write!(html, "<p>{}</p>", lines.join("<br>"));
                }
                Block::Footnote { title, fields } => {
                    html.push_str(r#"<div style="margin-top: 20px; padding: 15px; background: #f0f0f0; border-radius: 8px; font-size: 12px; color: #666;">"#);
                    let _ = write!(html, "<p><strong>{}:</strong></p>", escape_html(title));
                    for (label, value) in fields {
                        let _ = write!(html, "<p>{}: {}</p>", escape_html(label), escape_html(value));
                    }
                    html.push_str("</div>");
                }
            }
        }

        html.push_str("</div>");
        html
    }

    pub fn render_text(&self) -> String {
        let mut text = String::with_capacity(1024);
        let _ = writeln!(text, "{}", self.heading);

        for block in &self.blocks {
            text.push('\n');
            match block {
                Block::Paragraph(p) => {
                    let _ = writeln!(text, "{}", p);
                }
                Block::Fields { title, fields } => {
                    let _ = writeln!(text, "{}", title);
                    for (label, value) in fields {
                        let _ = writeln!(text, "{}: {}", label, value);
                    }
                }
                Block::Links { intro, links } => {
                    let _ = writeln!(text, "{}", intro);
                    for (label, url) in links {
                        let _ = writeln!(text, "- {}: {}", label, url);
                    }
                }
                Block::Quote { title, body } => {
                    let _ = writeln!(text, "{}", title);
                    let _ = writeln!(text, "{}", body);
                }
                Block::Signature(lines) => {
                    for line in lines {
                        let _ = writeln!(text, "{}", line);
                    }
                }
                Block::Footnote { title, fields } => {
                    let _ = writeln!(text, "---\n{}:", title);
                    for (label, value) in fields {
                        let _ = writeln!(text, "{}: {}", label, value);
                    }
                }
            }
        }

        text
    }

    pub fn render(&self, subject: String, accent_color: &str) -> RenderedEmail {
        RenderedEmail {
            subject,
            html: self.render_html(accent_color),
            text: self.render_text(),
        }
    }
}

/// Operator notification: every submitted field plus request metadata.
pub fn notification_email(
    submission: &ContactSubmission,
    meta: &SubmissionMeta,
    config: &AppConfig,
) -> RenderedEmail {
    let document = EmailDocument {
        heading: "New Contact Form Submission".to_string(),
        blocks: vec![
            Block::Fields {
                title: "Contact Information".to_string(),
                fields: vec![
                    ("Name".to_string(), submission.name.clone()),
                    ("Email".to_string(), submission.email.clone()),
                    ("Company".to_string(), submission.company.clone()),
                    ("Budget".to_string(), submission.budget.label().to_string()),
                ],
            },
            Block::Quote {
                title: "Message".to_string(),
                body: submission.message.clone(),
            },
            Block::Footnote {
                title: "Submission Details".to_string(),
                fields: vec![
                    ("IP Address".to_string(), meta.source_id.clone()),
                    ("User Agent".to_string(), meta.user_agent_or_unknown().to_string()),
                    ("Timestamp".to_string(), meta.received_at.to_rfc3339()),
                ],
            },
        ],
    };

    document.render(
        format!("New Contact Form Submission from {}", submission.name),
        &config.brand.accent_color,
    )
}

/// Auto-reply to the requester confirming receipt and echoing their message.
pub fn auto_reply_email(submission: &ContactSubmission, config: &AppConfig) -> RenderedEmail {
    let signer = config
        .brand
        .name
        .split_whitespace()
        .next()
        .unwrap_or(config.brand.name.as_str())
        .to_string();

    let document = EmailDocument {
        heading: format!("Thanks for reaching out, {}!", submission.name),
        blocks: vec![
            Block::Paragraph(
                "I've received your message and will get back to you within 24 hours.".to_string(),
            ),
            Block::Links {
                intro: "In the meantime, feel free to:".to_string(),
                links: vec![
                    (
                        "Book a free consultation call".to_string(),
                        config.brand.calendly_url.clone(),
                    ),
                    (
                        "Check out my recent work".to_string(),
                        format!("{}/work", config.site_base()),
                    ),
                ],
            },
            Block::Signature(vec!["Best,".to_string(), signer]),
            Block::Quote {
                title: "Your message:".to_string(),
                body: submission.message.clone(),
            },
        ],
    };

    document.render("Thanks for reaching out!".to_string(), &config.brand.accent_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::contact::Budget;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            company: "Smith & Sons".into(),
            budget: Budget::From10kTo25k,
            message: "We need help automating our onboarding pipeline".into(),
        }
    }

    fn meta() -> SubmissionMeta {
        SubmissionMeta::new("203.0.113.7", Some("Mozilla/5.0".into()))
    }

    #[test]
    fn notification_carries_fields_and_metadata() {
        let config = AppConfig::default();
        let email = notification_email(&submission(), &meta(), &config);

        assert_eq!(email.subject, "New Contact Form Submission from Jane Doe");
        for expected in ["Jane Doe", "jane@example.com", "$10k - $25k", "203.0.113.7", "Mozilla/5.0"] {
            assert!(email.text.contains(expected), "text missing {expected}");
            assert!(email.html.contains(expected), "html missing {expected}");
        }
        assert!(email.html.contains("#00ff88"));
    }

    #[test]
    fn html_escapes_values_text_keeps_them() {
        let config = AppConfig::default();
        let email = notification_email(&submission(), &meta(), &config);

        assert!(email.text.contains("Company: Smith & Sons"));
        assert!(email.html.contains("Smith &amp; Sons"));
        assert!(!email.html.contains("Smith & Sons"));
    }

    #[test]
    fn auto_reply_links_and_signature() {
        let mut config = AppConfig::default();
        config.site_url = "https://consulting.example/".into();
        config.brand.calendly_url = "https://calendly.com/jane-consults".into();

        let email = auto_reply_email(&submission(), &config);

        assert_eq!(email.subject, "Thanks for reaching out!");
        for expected in [
            "Thanks for reaching out, Jane Doe!",
            "https://calendly.com/jane-consults",
            "https://consulting.example/work",
            "We need help automating our onboarding pipeline",
            "Rob",
        ] {
            assert!(email.text.contains(expected), "text missing {expected}");
            assert!(email.html.contains(expected), "html missing {expected}");
        }
    }

    #[test]
    fn renderings_share_every_block() {
        let document = EmailDocument {
            heading: "Heading".into(),
            blocks: vec![
                Block::Paragraph("para".into()),
                Block::Fields { title: "fields".into(), fields: vec![("k".into(), "v1".into())] },
                Block::Links { intro: "links".into(), links: vec![("lbl".into(), "https://x.example".into())] },
                Block::Quote { title: "quote".into(), body: "body".into() },
                Block::Signature(vec!["sig".into()]),
                Block::Footnote { title: "foot".into(), fields: vec![("fk".into(), "fv".into())] },
            ],
        };

        let html = document.render_html("#123456");
        let text = document.render_text();
        for piece in ["Heading", "para", "fields", "v1", "links", "lbl", "https://x.example", "quote", "body", "sig", "foot", "fv"] {
            assert!(html.contains(piece), "html missing {piece}");
            assert!(text.contains(piece), "text missing {piece}");
        }
    }
}
