//! TypeScript emission for one endpoint: constant name, argument list,
//! template literal and JSDoc block.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::GenerateError;
use crate::parser::EndpointRecord;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("placeholder regex is valid"))
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator regex is valid"))
}

/// Map every run of non-alphanumeric characters to a single `_` and trim `_`
/// from both ends.
pub fn sanitize_identifier(raw: &str) -> String {
    separator_regex()
        .replace_all(raw, "_")
        .trim_matches('_')
        .to_string()
}

/// Placeholder names of `relative_path` as identifiers, left to right.
pub fn path_parameters(relative_path: &str) -> Vec<String> {
    placeholder_bindings(relative_path)
        .into_iter()
        .map(|(_, ident)| ident)
        .collect()
}

/// Raw placeholder name -> argument identifier, one entry per distinct raw
/// name. Raw names that sanitize to the same identifier get `_2`, `_3`, ...
fn placeholder_bindings(relative_path: &str) -> Vec<(String, String)> {
    let mut bindings: Vec<(String, String)> = Vec::new();
    for captures in placeholder_regex().captures_iter(relative_path) {
        let raw = &captures[1];
        if bindings.iter().any(|(seen, _)| seen == raw) {
            continue;
        }

        let base = parameter_identifier(raw);
        let mut ident = base.clone();
        let mut suffix = 2;
        while bindings.iter().any(|(_, taken)| *taken == ident) {
            ident = format!("{base}_{suffix}");
            suffix += 1;
        }
        bindings.push((raw.to_string(), ident));
    }
    bindings
}

fn parameter_identifier(raw: &str) -> String {
    let name = sanitize_identifier(raw);
    if name.is_empty() {
        "param".to_string()
    } else {
        name
    }
}

/// `Users/{id}/orders` -> `Users_id_orders`.
pub fn constant_name(relative_path: &str, lowercase: bool) -> String {
    let name = sanitize_identifier(relative_path);
    if lowercase {
        name.to_lowercase()
    } else {
        name
    }
}

/// `Users/{id}` -> `Users/${id}`.
pub fn template_body(relative_path: &str) -> String {
    let bindings = placeholder_bindings(relative_path);
    placeholder_regex()
        .replace_all(relative_path, |captures: &Captures| {
            let raw = &captures[1];
            let ident = bindings
                .iter()
                .find(|(seen, _)| seen == raw)
                .map(|(_, ident)| ident.clone())
                .unwrap_or_else(|| parameter_identifier(raw));
            format!("${{{ident}}}")
        })
        .into_owned()
}

/// Generated source for a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub params: Vec<String>,
    pub source: String,
}

pub fn render_declaration(
    record: &EndpointRecord,
    lowercase: bool,
) -> Result<Declaration, GenerateError> {
    let name = constant_name(&record.relative_path, lowercase);
    if name.is_empty() {
        return Err(GenerateError::EmptyName {
            api_path: record.api_path.clone(),
        });
    }

    let params = path_parameters(&record.relative_path);
    let args = params
        .iter()
        .map(|param| format!("{param}: any"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut source = render_jsdoc(record, &params);
    source.push_str(&format!(
        "export const {name} = ({args}) => `{}`;\n",
        template_body(&record.relative_path)
    ));

    Ok(Declaration {
        name,
        params,
        source,
    })
}

fn render_jsdoc(record: &EndpointRecord, params: &[String]) -> String {
    let mut doc = String::from("/**\n");
    doc.push_str(&format!(" * `{}`\n", record.api_path));

    for method in &record.methods {
        let verb = method.verb.to_uppercase();
        match method.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => {
                doc.push_str(&format!(" * @method {verb} - {}\n", single_line(summary)));
            }
            _ => doc.push_str(&format!(" * @method {verb}\n")),
        }
    }

    for param in params {
        doc.push_str(&format!(" * @param {param}\n"));
    }

    doc.push_str(" */\n");
    doc
}

// Keeps a summary from closing the comment or spilling onto new lines.
fn single_line(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}
