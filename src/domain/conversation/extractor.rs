//! Structured reply extraction and repair.
//!
//! Model output is untrusted free text that usually, but not always,
//! contains a JSON object. Decoding is a two-stage pipeline: textual
//! extraction/repair is a best-effort pre-pass, and the final stage is a
//! schema-checked deserialization into [`ModelReply`] that rejects anything
//! not matching the expected shape.

use thiserror::Error;

use super::reply::ModelReply;

/// Maximum raw response length accepted for decoding (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Errors that can occur while decoding a model reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("reply is missing the required message text")]
    MissingMessage,
}

/// Extracts, repairs, and parses structured replies from raw model text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyExtractor;

impl ReplyExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Full decode pipeline: extract a JSON candidate, parse it, and on
    /// failure retry once after textual repair.
    pub fn decode(&self, raw: &str) -> Result<ModelReply, ExtractionError> {
        if raw.len() > MAX_RESPONSE_LENGTH {
            return Err(ExtractionError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: raw.len(),
            });
        }

        let candidate = self.extract(raw);
        match self.parse(&candidate) {
            Ok(reply) => Ok(reply),
            Err(first_error) => {
                let repaired = self.repair(&candidate);
                self.parse(&repaired).map_err(|_| first_error)
            }
        }
    }

    /// Strips non-JSON wrapping: fenced code block content if present,
    /// otherwise the raw text, then trimmed to the first `{` and its
    /// matching closing `}`.
    pub fn extract(&self, raw: &str) -> String {
        let trimmed = raw.trim();

        let body = self
            .extract_from_code_block(trimmed)
            .unwrap_or_else(|| trimmed.to_string());

        match body.find('{') {
            Some(start) => self
                .extract_balanced_object(&body, start)
                .unwrap_or(body),
            None => body,
        }
    }

    /// Conservative textual fixes for near-valid JSON: trailing commas
    /// before a closing bracket are removed, and bare scalar values in
    /// `key: value` pairs are quoted.
    pub fn repair(&self, candidate: &str) -> String {
        let without_trailing_commas = self.strip_trailing_commas(candidate);
        self.quote_bare_values(&without_trailing_commas)
    }

    /// Schema-checked parse. The payload must at minimum contain a
    /// non-empty `message` string.
    pub fn parse(&self, candidate: &str) -> Result<ModelReply, ExtractionError> {
        let reply: ModelReply = serde_json::from_str(candidate)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        if reply.message.trim().is_empty() {
            return Err(ExtractionError::MissingMessage);
        }

        Ok(reply)
    }

    fn extract_from_code_block(&self, s: &str) -> Option<String> {
        let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

        for pattern in patterns {
            if let Some(start) = s.find(pattern) {
                let body_start = start + pattern.len();
                if let Some(end) = s[body_start..].find("```") {
                    return Some(s[body_start..body_start + end].trim().to_string());
                }
            }
        }
        None
    }

    fn extract_balanced_object(&self, s: &str, start: usize) -> Option<String> {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in s[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn strip_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape_next = false;

        for (i, &c) in chars.iter().enumerate() {
            if escape_next {
                escape_next = false;
                result.push(c);
                continue;
            }

            match c {
                '\\' if in_string => {
                    escape_next = true;
                    result.push(c);
                }
                '"' => {
                    in_string = !in_string;
                    result.push(c);
                }
                ',' if !in_string => {
                    let next_meaningful = chars[i + 1..]
                        .iter()
                        .find(|ch| !ch.is_whitespace())
                        .copied();
                    if !matches!(next_meaningful, Some('}') | Some(']')) {
                        result.push(c);
                    }
                }
                _ => result.push(c),
            }
        }

        result
    }

    fn quote_bare_values(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape_next = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if escape_next {
                escape_next = false;
                result.push(c);
                i += 1;
                continue;
            }

            match c {
                '\\' if in_string => {
                    escape_next = true;
                    result.push(c);
                    i += 1;
                }
                '"' => {
                    in_string = !in_string;
                    result.push(c);
                    i += 1;
                }
                ':' if !in_string => {
                    result.push(c);
                    i += 1;

                    // Copy whitespace after the colon.
                    while i < chars.len() && chars[i].is_whitespace() {
                        result.push(chars[i]);
                        i += 1;
                    }

                    if i >= chars.len() {
                        break;
                    }

                    // Structured values and strings are left alone.
                    if matches!(chars[i], '{' | '[' | '"') {
                        continue;
                    }

                    // Capture the bare token up to a structural delimiter.
                    let token_start = i;
                    while i < chars.len() && !matches!(chars[i], ',' | '}' | ']' | '\n') {
                        i += 1;
                    }
                    let token: String = chars[token_start..i].iter().collect();
                    let trimmed = token.trim_end();
                    let trailing_ws = &token[trimmed.len()..];

                    if trimmed.is_empty()
                        || serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
                    {
                        // Valid JSON scalar (number, true, false, null).
                        result.push_str(&token);
                    } else {
                        result.push('"');
                        result.push_str(&trimmed.replace('\\', "\\\\").replace('"', "\\\""));
                        result.push('"');
                        result.push_str(trailing_ws);
                    }
                }
                _ => {
                    result.push(c);
                    i += 1;
                }
            }
        }

        result
    }
}
