//! Prompt templates for the generation collaborator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{stage, DomainError, DomainResult};

/// System instruction sent with every question
pub const RAG_SYSTEM_INSTRUCTIONS: &str =
    "You are an AI assistant that answers based on retrieved documents.";

/// User turn template; `{input}` receives context and question
pub const RAG_PROMPT_TEMPLATE: &str =
    "Based on the following context, answer the question:\n\n{input}";

/// A text template with `{name}` placeholders.
///
/// `{{` and `}}` render as literal braces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The question-answering template
    pub fn rag() -> Self {
        Self::new(RAG_PROMPT_TEMPLATE)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order of first appearance
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        for segment in parse(&self.template) {
            if let Segment::Var(name) = segment {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Substitute every placeholder. A placeholder without a value is an error.
    pub fn render(&self, values: &HashMap<String, String>) -> DomainResult<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in parse(&self.template) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Brace(c) => out.push(c),
                Segment::Var(name) => {
                    let value = values.get(name).ok_or_else(|| {
                        DomainError::invalid_input(
                            stage::PROMPT,
                            format!("no value for placeholder '{name}'"),
                        )
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// The `input` variable of [`RAG_PROMPT_TEMPLATE`]
pub fn rag_input(context: &str, question: &str) -> String {
    format!("{context}\n\nQuestion: {question}")
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Var(&'a str),
}

fn parse(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(idx) = rest.find(['{', '}']) {
        if idx > 0 {
            segments.push(Segment::Literal(&rest[..idx]));
        }
        let tail = &rest[idx..];
        if tail.starts_with("{{") {
            segments.push(Segment::Brace('{'));
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            segments.push(Segment::Brace('}'));
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail[1..].find('}') {
                Some(end) if is_identifier(&tail[1..=end]) => {
                    segments.push(Segment::Var(&tail[1..=end]));
                    rest = &tail[end + 2..];
                }
                _ => {
                    segments.push(Segment::Brace('{'));
                    rest = &tail[1..];
                }
            }
        } else {
            segments.push(Segment::Brace('}'));
            rest = &tail[1..];
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
