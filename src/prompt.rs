//! Prompt builders for the mail assistant features.
//!
//! The compose prompt lives in a template file and is rendered from a
//! single code path; the summary prompt is a one-liner.

use std::collections::BTreeMap;

use crate::auth::DEFAULT_PERSONA;

const COMPOSE_EMAIL_TEMPLATE: &str = include_str!("templates/compose_email.template");

/// Characters of the message body included in a summary prompt.
pub const SUMMARY_CONTENT_CHARS: usize = 500;

/// Inputs for [`compose_email_prompt`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComposeRequest<'a> {
    pub recipient: &'a str,
    pub subject: &'a str,
    pub brief: &'a str,
    /// Tone description; blank falls back to the default persona.
    pub persona: Option<&'a str>,
}

/// One-sentence summary prompt over the first 500 characters of `content`.
pub fn summarize_email_prompt(subject: &str, content: &str) -> String {
    let excerpt: String = content.chars().take(SUMMARY_CONTENT_CHARS).collect();
    format!("Summarize this email in one concise sentence: Subject: {subject}, Content: {excerpt}")
}

pub fn compose_email_prompt(request: &ComposeRequest<'_>) -> String {
    let persona = request
        .persona
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PERSONA);

    let mut vars = BTreeMap::<&str, &str>::new();
    vars.insert("PERSONA", persona);
    vars.insert("RECIPIENT", request.recipient.trim());
    vars.insert("SUBJECT", request.subject.trim());
    vars.insert("BRIEF", request.brief.trim());

    render_template(COMPOSE_EMAIL_TEMPLATE, &vars).trim().to_string()
}

/// Single pass, so placeholder-looking text inside values is left alone.
fn render_template(template: &str, vars: &BTreeMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
