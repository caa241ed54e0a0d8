//! Formula-injection neutralization for persisted text.
//!
//! The backing store is sheet-style: a cell whose text begins with a formula
//! or command prefix would be interpreted rather than stored. Every string
//! value passes through here before it is written.

/// Characters that trigger formula or DDE interpretation in first position.
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Marker prepended to neutralized values. Signals "treat as literal text".
const LITERAL_MARKER: char = '\'';

/// Neutralizes a value that would otherwise be interpreted as a formula.
///
/// Only the first character matters: an empty string and values with a
/// dangerous character in any later position pass through unchanged.
pub fn sanitize_cell_text(value: &str) -> String {
    match value.chars().next() {
        Some(first) if FORMULA_PREFIXES.contains(&first) => {
            format!("{LITERAL_MARKER}{value}")
        }
        _ => value.to_string(),
    }
}
