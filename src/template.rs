//! Response template rendering.
//!
//! Templates use `{Placeholder}` fields filled from an explicit name → value
//! map, with `{{` / `}}` as literal-brace escapes. A placeholder with no
//! entry in the map is a catalog configuration error and fails with
//! `ReportError::Format` instead of rendering silently.

use crate::error::{ReportError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

pub fn render_template(template: &str, values: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(template) {
        let m = caps.get(0).unwrap();
        let literal = &template[last..m.start()];
        check_balanced(literal)?;
        out.push_str(literal);

        match m.as_str() {
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            _ => {
                let name = caps.get(1).unwrap().as_str();
                let value = values.get(name).ok_or_else(|| {
                    ReportError::Format(format!(
                        "template references unknown field '{}'",
                        name
                    ))
                })?;
                out.push_str(value);
            }
        }
        last = m.end();
    }

    let tail = &template[last..];
    check_balanced(tail)?;
    out.push_str(tail);
    Ok(out)
}

// A brace left over outside any token is a malformed template.
fn check_balanced(literal: &str) -> Result<()> {
    if let Some(brace) = literal.chars().find(|c| *c == '{' || *c == '}') {
        return Err(ReportError::Format(format!(
            "unmatched '{}' in template",
            brace
        )));
    }
    Ok(())
}
