//! The structured reply the manager's model produces, and the deterministic
//! reply used when the model cannot be reached or answers badly.

use serde::{Deserialize, Serialize};

use crate::errors::{AgentError, AgentResult};

pub const DEFAULT_CLIENT_NAME: &str = "Valued Customer";
pub const DEFAULT_SUBJECT: &str = "Re: Your inquiry about AI Solutions";
/// How much of the expert's answer goes into a fallback body.
const EXPERT_EXCERPT_CHARS: usize = 500;

const SIGN_OFFS: [&str; 6] = [
    "thank you,",
    "thanks,",
    "best regards,",
    "kind regards,",
    "regards,",
    "sincerely,",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerReply {
    pub client_name: String,
    pub response_subject: String,
    pub response_body: String,
}

impl ManagerReply {
    /// JSON schema sent to the model alongside the instructions.
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "client_name": {
                    "type": "string",
                    "description": "The name of the client to contact, e.g. 'Sarah Jones'."
                },
                "response_subject": {
                    "type": "string",
                    "description": "A suitable title for the response email, e.g. 'Re: Inquiry about AI Solutions'."
                },
                "response_body": {
                    "type": "string",
                    "description": "The full text of the response letter. Recognise the client's needs, explain how the products help and suggest scheduling a demo."
                }
            },
            "required": ["client_name", "response_subject", "response_body"]
        })
    }

    /// Parses model output, tolerating a surrounding markdown code fence.
    pub fn parse(raw: &str) -> AgentResult<Self> {
        let reply: Self =
            serde_json::from_str(strip_code_fence(raw)).map_err(|e| AgentError::MalformedLlmOutput {
                reason: format!("manager reply is not valid JSON: {e}"),
            })?;

        for (field, value) in [
            ("client_name", &reply.client_name),
            ("response_subject", &reply.response_subject),
            ("response_body", &reply.response_body),
        ] {
            if value.trim().is_empty() {
                return Err(AgentError::MalformedLlmOutput {
                    reason: format!("manager reply has an empty {field}"),
                });
            }
        }
        Ok(reply)
    }

    /// A reply built only from the inbound email and the expert's answer.
    pub fn fallback(client_email: &str, expert_info: &str) -> Self {
        let excerpt: String = expert_info.chars().take(EXPERT_EXCERPT_CHARS).collect();

        Self {
            client_name: extract_client_name(client_email)
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            response_subject: extract_subject(client_email)
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            response_body: format!(
                "Thank you for your interest in our AI solutions!\n\n\
                 Based on information from our expert:\n\
                 {excerpt}...\n\n\
                 Our Document Analyzer and Vision AI solutions are designed for challenges like yours. \
                 Let's schedule a demo to show you how they can help your business.\n\n\
                 When would be a good time for an online presentation?"
            ),
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// The sender's name: from "My name is ...", else from the line after a sign-off.
pub fn extract_client_name(email: &str) -> Option<String> {
    introduced_name(email).or_else(|| signed_name(email))
}

fn introduced_name(email: &str) -> Option<String> {
    const MARKER: &str = "my name is ";
    let start = email.char_indices().find_map(|(at, _)| {
        let candidate = email.get(at..at + MARKER.len())?;
        candidate.eq_ignore_ascii_case(MARKER).then_some(at + MARKER.len())
    })?;
    let rest = email.get(start..)?;

    let words: Vec<&str> = rest
        .split(|c: char| c == ',' || c == '.' || c == '\n' || c == ';')
        .next()?
        .split_whitespace()
        .take_while(|word| word.chars().next().is_some_and(char::is_uppercase))
        .take(3)
        .collect();

    (!words.is_empty()).then(|| words.join(" "))
}

fn signed_name(email: &str) -> Option<String> {
    let mut lines = email.lines().map(str::trim);
    while let Some(line) = lines.next() {
        if SIGN_OFFS.contains(&line.to_lowercase().as_str()) {
            let name = lines.find(|l| !l.is_empty())?.trim_end_matches(',');
            if name.split_whitespace().count() <= 4 {
                return Some(name.to_string());
            }
            return None;
        }
    }
    None
}

/// `Re: <subject>` from the email's `Subject:` line.
pub fn extract_subject(email: &str) -> Option<String> {
    let subject = email.lines().map(str::trim).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case("subject").then(|| value.trim())
    })?;

    if subject.is_empty() {
        None
    } else if subject.to_lowercase().starts_with("re:") {
        Some(subject.to_string())
    } else {
        Some(format!("Re: {subject}"))
    }
}
