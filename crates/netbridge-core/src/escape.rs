//! String escaping for generated source.

/// Escapes a string for embedding inside a single-quoted literal.
///
/// Backslashes are doubled first, then single quotes are prefixed with a
/// backslash. The order matters: quoting first would double the inserted
/// backslashes.
///
/// # Examples
///
/// ```
/// use netbridge_core::escape_single_quoted;
///
/// assert_eq!(escape_single_quoted(r"C:\libs\demo.dll"), r"C:\\libs\\demo.dll");
/// assert_eq!(escape_single_quoted("O'Brien"), r"O\'Brien");
/// assert_eq!(escape_single_quoted(r"\'"), r"\\\'");
/// ```
#[must_use]
pub fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
