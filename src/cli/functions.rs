//! Built-in function reference for the CLI

use crate::functions;

/// Signature of every built-in, alphabetically.
pub fn signatures() -> Vec<String> {
    functions::builtins()
        .iter()
        .map(|builtin| builtin.signature_text())
        .collect()
}

/// Text printed by `jmes functions`.
pub fn function_listing() -> String {
    let mut out = String::from("BUILT-IN FUNCTIONS\n\n");
    for signature in signatures() {
        out.push_str("  ");
        out.push_str(&signature);
        out.push('\n');
    }
    out.push_str("\nPass functions a `&expr` reference where an expression argument is expected.\n");
    out
}
