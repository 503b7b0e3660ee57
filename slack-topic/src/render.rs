//! Topic template rendering.
//!
//! Topics may reference stdin-supplied parameters with `{{.key}}`
//! placeholders, dotted for nested access (`{{.release.version}}`). The
//! renderer is a single substitution pass: no conditionals, no loops, no
//! escaping. Substitution is strict — a malformed placeholder or an
//! unresolvable path is a hard error, never silently blanked.

use serde_json::Value;

use crate::error::{Error, Result};

/// JSON object decoded from stdin, immutable after load.
pub type ParameterSet = serde_json::Map<String, Value>;

/// Renders `raw` against optional parameters.
///
/// With no parameters the topic is used verbatim and never interpreted as
/// a template, so `{{` sequences pass through untouched.
pub fn render_topic(raw: &str, params: Option<&ParameterSet>) -> Result<String> {
    match params {
        None => Ok(raw.to_string()),
        Some(params) => substitute(raw, params),
    }
}

fn substitute(template: &str, params: &ParameterSet) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '{' && chars.peek() == Some(&'{') {
            chars.next(); // consume second '{'
            let mut body = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == '}' && chars.peek() == Some(&'}') {
                    chars.next();
                    closed = true;
                    break;
                }
                body.push(c);
            }
            if !closed {
                return Err(Error::TemplateSyntax(format!(
                    "unterminated placeholder: {{{{{body}"
                )));
            }
            result.push_str(&resolve(body.trim(), params)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Looks up a `.a.b.c` path in the parameter object and renders the leaf.
fn resolve(path: &str, params: &ParameterSet) -> Result<String> {
    let Some(rest) = path.strip_prefix('.') else {
        return Err(Error::TemplateSyntax(format!(
            "placeholder must start with '.': {{{{{path}}}}}"
        )));
    };

    let missing = || Error::TemplateMissingKey {
        path: rest.to_string(),
    };

    let mut current: Option<&Value> = None;
    for segment in rest.split('.') {
        if segment.is_empty() {
            return Err(Error::TemplateSyntax(format!(
                "empty path segment in {{{{{path}}}}}"
            )));
        }
        current = Some(match current {
            None => params.get(segment).ok_or_else(missing)?,
            Some(Value::Object(map)) => map.get(segment).ok_or_else(missing)?,
            Some(_) => return Err(missing()),
        });
    }

    Ok(match current {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        // split('.') yields at least one segment for non-empty input
        None => String::new(),
    })
}
