//! Repair pass for records written back-to-back without a separator.
//!
//! The upstream service occasionally flushes two objects into the same line
//! (`{...}{...}`). [`ConcatenationSplitter`] walks one candidate and yields
//! each object-sized piece. It tracks nesting depth and JSON string state, so
//! a `}{` sequence inside a string value never counts as a boundary.
//!
//! The walk is a small state machine:
//!
//! - [`SplitState::AwaitingBoundary`]: scanning the first piece of the candidate.
//! - [`SplitState::RepairingConcatenation`]: a top-level value closed and more input followed;
//!   every further piece is carved from the remainder.
//!
//! Because the split falls between the closing marker of one value and the
//! opening marker of the next, every piece keeps both of its own markers.

/// Phase of a [`ConcatenationSplitter`] walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitState {
    /// No concatenation seen yet in this candidate.
    #[default]
    AwaitingBoundary,
    /// At least one missing separator was repaired.
    RepairingConcatenation,
}

/// Iterator over the pieces of a single newline-delimited candidate.
///
/// Pieces are trimmed; whitespace-only input yields nothing.
///
/// # Examples
///
/// ```
/// use recordframe::frame::{ConcatenationSplitter, SplitState};
///
/// let mut splitter = ConcatenationSplitter::new(r#"{"id":1}{"id":2}"#);
/// assert_eq!(splitter.next(), Some(r#"{"id":1}"#));
/// assert_eq!(splitter.next(), Some(r#"{"id":2}"#));
/// assert_eq!(splitter.next(), None);
/// assert_eq!(splitter.state(), SplitState::RepairingConcatenation);
/// ```
#[derive(Clone, Debug)]
pub struct ConcatenationSplitter<'a> {
    input: &'a str,
    pos: usize,
    state: SplitState,
    repairs: usize,
}

impl<'a> ConcatenationSplitter<'a> {
    /// Begin a walk over `candidate`.
    #[must_use]
    pub fn new(candidate: &'a str) -> Self {
        Self {
            input: candidate,
            pos: 0,
            state: SplitState::AwaitingBoundary,
            repairs: 0,
        }
    }

    /// Current phase of the walk.
    #[must_use]
    pub const fn state(&self) -> SplitState { self.state }

    /// Number of missing separators repaired so far.
    #[must_use]
    pub const fn repairs(&self) -> usize { self.repairs }

    /// Byte offset just past the last piece yielded.
    ///
    /// Short of the input length only when that piece was closed off by a
    /// following value.
    #[must_use]
    pub const fn consumed(&self) -> usize { self.pos }

    /// Byte offset where the piece starting at `start` ends.
    fn piece_end(&self, start: usize) -> (usize, bool) {
        let bytes = self.input.as_bytes();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut closed = false;

        for (offset, &byte) in bytes[start..].iter().enumerate() {
            let at = start + offset;
            if in_string {
                match byte {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            if closed && depth == 0 && !byte.is_ascii_whitespace() {
                return (at, true);
            }
            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth = depth.saturating_sub(1);
                    closed = depth == 0;
                }
                _ => {}
            }
        }
        (bytes.len(), false)
    }
}

impl<'a> Iterator for ConcatenationSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        let start = self.pos + skipped;
        if start >= self.input.len() {
            self.pos = self.input.len();
            return None;
        }

        let (end, boundary) = self.piece_end(start);
        if boundary {
            self.state = SplitState::RepairingConcatenation;
            self.repairs += 1;
        }
        self.pos = end;
        Some(self.input[start..end].trim_end())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ConcatenationSplitter, SplitState};

    fn pieces(input: &str) -> Vec<&str> { ConcatenationSplitter::new(input).collect() }

    #[test]
    fn single_object_passes_through() {
        let mut splitter = ConcatenationSplitter::new(r#"{"id":1,"outcomeCode":200}"#);
        assert_eq!(splitter.next(), Some(r#"{"id":1,"outcomeCode":200}"#));
        assert_eq!(splitter.next(), None);
        assert_eq!(splitter.state(), SplitState::AwaitingBoundary);
        assert_eq!(splitter.repairs(), 0);
    }

    #[rstest]
    #[case(r#"{"a":1}{"b":2}"#, &[r#"{"a":1}"#, r#"{"b":2}"#])]
    #[case(r#"{"a":1}{"b":2}{"c":3}"#, &[r#"{"a":1}"#, r#"{"b":2}"#, r#"{"c":3}"#])]
    #[case(r#"{"a":1}  {"b":2}"#, &[r#"{"a":1}"#, r#"{"b":2}"#])]
    #[case(r#"{"a":{"b":[1,{"c":2}]}}{"d":3}"#, &[r#"{"a":{"b":[1,{"c":2}]}}"#, r#"{"d":3}"#])]
    fn concatenated_objects_are_separated(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(pieces(input), expected);
    }

    #[rstest]
    #[case(r#"{"note":"}{"}"#)]
    #[case(r#"{"note":"a \"}{\" b"}"#)]
    #[case(r#"{"path":"C:\\"}"#)]
    fn braces_inside_strings_are_not_boundaries(#[case] input: &str) {
        assert_eq!(pieces(input), [input]);
    }

    #[test]
    fn escaped_backslash_before_quote_closes_string() {
        let input = r#"{"path":"C:\\"}{"id":2}"#;
        assert_eq!(pieces(input), [r#"{"path":"C:\\"}"#, r#"{"id":2}"#]);
    }

    #[test]
    fn trailing_garbage_becomes_its_own_piece() {
        let mut splitter = ConcatenationSplitter::new(r#"{"a":1}oops"#);
        assert_eq!(splitter.next(), Some(r#"{"a":1}"#));
        assert_eq!(splitter.next(), Some("oops"));
        assert_eq!(splitter.next(), None);
        assert_eq!(splitter.repairs(), 1);
    }

    #[test]
    fn unbalanced_object_is_a_single_piece() {
        assert_eq!(pieces(r#"{"a":{"b":1}"#), [r#"{"a":{"b":1}"#]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\r\t")]
    fn blank_input_yields_nothing(#[case] input: &str) {
        assert!(pieces(input).is_empty());
    }

    #[test]
    fn repairs_count_every_missing_separator() {
        let mut splitter = ConcatenationSplitter::new("{}{}{}");
        assert_eq!(splitter.by_ref().count(), 3);
        assert_eq!(splitter.repairs(), 2);
        assert_eq!(splitter.state(), SplitState::RepairingConcatenation);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(
            pieces(r#"{"d":"ü}{"}{"d":"€"}"#),
            [r#"{"d":"ü}{"}"#, r#"{"d":"€"}"#]
        );
    }
}
