//! Placeholder substitution for caller-authored message templates.
//!
//! Two literal replaces, nothing more: `{timestamp}` first, then `{data}`.
//! Any other brace sequence stays verbatim.

pub const DATA_PLACEHOLDER: &str = "{data}";
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Splices `data` and `timestamp` into `template`.
///
/// The timestamp pass runs first so a `{timestamp}` token inside `data` is
/// not substituted.
#[must_use]
pub fn apply_template(template: &str, data: &str, timestamp: &str) -> String {
    template
        .replace(TIMESTAMP_PLACEHOLDER, timestamp)
        .replace(DATA_PLACEHOLDER, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_both_placeholders() {
        let out = apply_template("Report\n{data}\n-- {timestamp}", "row1\nrow2", "01/04/2026 10:00");
        assert_eq!(out, "Report\nrow1\nrow2\n-- 01/04/2026 10:00");
    }

    #[test]
    fn test_unknown_placeholders_left_verbatim() {
        let out = apply_template("{title} {data} {Data}", "x", "t");
        assert_eq!(out, "{title} x {Data}");
    }

    #[test]
    fn test_repeated_placeholder() {
        assert_eq!(apply_template("{data}/{data}", "a", "t"), "a/a");
    }

    #[test]
    fn test_data_is_not_rescanned_for_timestamp() {
        let out = apply_template("{data}", "literal {timestamp}", "t");
        assert_eq!(out, "literal {timestamp}");
    }

    #[test]
    fn test_template_without_placeholders() {
        assert_eq!(apply_template("static", "x", "t"), "static");
    }
}
