//! Output comparison
//!
//! The canonical rule for deciding Accepted vs WrongAnswer. Both sides are
//! split on `\n`, a single trailing `\r` is trimmed from each line, and a
//! trailing empty line (from a final newline) is dropped. The sequences
//! must then match line-for-line, byte-for-byte. Anything looser (number
//! parsing, whitespace collapsing) is deliberately not done here.

/// Compare expected and received output under the canonical rule
pub fn outputs_equal(expected: &[u8], received: &[u8]) -> bool {
    normalize(expected) == normalize(received)
}

fn normalize(data: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = data
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(&[b'\r']).unwrap_or(line))
        .collect();
    if lines.last() == Some(&&b""[..]) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_outputs() {
        assert!(outputs_equal(b"2\n", b"2\n"));
        assert!(outputs_equal(b"", b""));
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        assert!(outputs_equal(b"2\n", b"2"));
        assert!(outputs_equal(b"a\nb\n", b"a\nb"));
    }

    #[test]
    fn test_carriage_returns_are_trimmed_per_line() {
        assert!(outputs_equal(b"a\r\nb\r\n", b"a\nb\n"));
        // Only a single trailing CR is trimmed
        assert!(!outputs_equal(b"a\r\r\n", b"a\n"));
    }

    #[test]
    fn test_differing_content() {
        assert!(!outputs_equal(b"2\n", b"3\n"));
        assert!(!outputs_equal(b"a\nb\n", b"a\n"));
        // Interior empty lines are significant
        assert!(!outputs_equal(b"a\n\nb\n", b"a\nb\n"));
    }

    #[test]
    fn test_cr_inside_line_is_significant() {
        assert!(!outputs_equal(b"a\rb\n", b"ab\n"));
    }

    #[test]
    fn test_only_one_trailing_empty_line_is_dropped() {
        assert!(!outputs_equal(b"a\n\n", b"a\n"));
    }
}
