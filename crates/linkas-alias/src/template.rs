//! Target template rendering
//!
//! Placeholders, substituted in this order, every occurrence:
//! - `{{q}}`, `{q}`: all arguments joined by single spaces
//! - `{{argN}}`, `{argN}`, `{{N}}`, `{N}`: argument `N` (0-based)
//!
//! Values are percent-encoded like `encodeURIComponent`. Placeholders that
//! reference a missing argument, and unknown tokens, stay in the output as-is.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Render one template against the parsed arguments.
pub fn render_template(template: &str, args: &[String]) -> String {
    let q = encode_component(&args.join(" "));

    let mut out = template.replace("{{q}}", &q).replace("{q}", &q);

    for (i, arg) in args.iter().enumerate() {
        let value = encode_component(arg);
        out = out
            .replace(&format!("{{{{arg{i}}}}}"), &value)
            .replace(&format!("{{arg{i}}}"), &value)
            .replace(&format!("{{{{{i}}}}}"), &value)
            .replace(&format!("{{{i}}}"), &value);
    }

    out
}

/// Render every target, keeping cardinality and order.
pub fn render_targets(targets: &[String], args: &[String]) -> Vec<String> {
    targets
        .iter()
        .map(|template| render_template(template, args))
        .collect()
}
