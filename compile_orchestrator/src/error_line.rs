//! Source line extraction from compiler messages

/// Prefix the compiler puts before a 1-based source line number
pub const LINE_PREFIX: &str = "At line: ";

/// Returns the 1-based line number a compiler message starts with
///
/// Only a leading `At line: ` followed by decimal digits counts. Line 0
/// and numbers that do not fit in `u32` yield `None`.
pub fn parse_error_line(message: &str) -> Option<u32> {
    let rest = message.strip_prefix(LINE_PREFIX)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let line: u32 = rest[..end].parse().ok()?;
    (line > 0).then_some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_line() {
        assert_eq!(parse_error_line("At line: 4. Unexpected token"), Some(4));
        assert_eq!(parse_error_line("At line: 12"), Some(12));
    }

    #[test]
    fn test_parse_requires_prefix_at_start() {
        assert_eq!(parse_error_line("Error. At line: 4."), None);
        assert_eq!(parse_error_line("at line: 4"), None);
        assert_eq!(parse_error_line("At line:4"), None);
    }

    #[test]
    fn test_parse_requires_digits() {
        assert_eq!(parse_error_line("At line: x"), None);
        assert_eq!(parse_error_line("At line: "), None);
        assert_eq!(parse_error_line(""), None);
    }

    #[test]
    fn test_parse_rejects_zero_and_overflow() {
        assert_eq!(parse_error_line("At line: 0"), None);
        assert_eq!(parse_error_line("At line: 99999999999"), None);
    }
}
