// Output directory templates: "{PATIENT_ID}/{STUDY_DATE}" against record metadata

use crate::core::error::{Result, WaveformError};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

pub fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(WaveformError::TemplateResolution(format!(
                                "unterminated placeholder in {:?}",
                                template
                            )));
                        }
                        Some(c) => name.push(c),
                    }
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(WaveformError::TemplateResolution(format!(
                        "empty placeholder in {:?}",
                        template
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                return Err(WaveformError::TemplateResolution(format!(
                    "unmatched '}}' in {:?}",
                    template
                )));
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

pub fn placeholders(template: &str) -> Result<Vec<String>> {
    Ok(parse_template(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Resolves a template to a relative directory. Empty values become
/// `UNKNOWN_{NAME}`; names missing from `metadata` fail.
pub fn resolve_template(template: &str, metadata: &BTreeMap<String, String>) -> Result<PathBuf> {
    let mut resolved = String::new();
    for segment in parse_template(template)? {
        match segment {
            Segment::Literal(text) => resolved.push_str(&text),
            Segment::Placeholder(name) => {
                let value = metadata.get(&name).ok_or_else(|| {
                    WaveformError::TemplateResolution(format!("unknown placeholder {{{}}}", name))
                })?;
                if value.trim().is_empty() {
                    resolved.push_str(&format!("UNKNOWN_{}", name));
                } else {
                    resolved.push_str(&sanitize_component(value.trim()));
                }
            }
        }
    }

    let mut path = PathBuf::new();
    for component in resolved.split(['/', '\\']) {
        match component {
            "" => continue,
            "." | ".." => {
                return Err(WaveformError::TemplateResolution(format!(
                    "path segment {:?} not allowed in {:?}",
                    component, resolved
                )));
            }
            c => path.push(c),
        }
    }
    Ok(path)
}

/// Replaces characters that cannot appear in a single path segment.
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
