//! Incremental line/column tracking for an append-only text buffer.
//!
//! Goals
//! - Each byte of the buffer is scanned for '\n' at most once.
//! - 1-based line numbers; columns count bytes since the last newline.
//! - Coordinates never decrease, since the buffer is never rewritten.

use crate::core::meta::Coord;

#[derive(Debug, Clone)]
pub struct PositionTracker
{
    /// Current 1-based line.
    line: u32,
    /// Byte offset just past the most recent '\n'.
    line_start: usize,
    /// Bytes of the buffer already scanned.
    scanned: usize,
}

impl Default for PositionTracker
{
    fn default() -> Self
    {
        Self { line: 1, line_start: 0, scanned: 0 }
    }
}

impl PositionTracker
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Coordinate of the end of `text`, which must be the same buffer seen by
    /// earlier calls, possibly grown since.
    pub fn position(
        &mut self,
        text: &str,
    ) -> Coord
    {
        let bytes = text.as_bytes();
        debug_assert!(bytes.len() >= self.scanned, "text buffer shrank");

        // Resume where the previous call stopped.
        for nl in memchr::memchr_iter(b'\n', &bytes[self.scanned..])
        {
            self.line += 1;
            self.line_start = self.scanned + nl + 1;
        }
        self.scanned = bytes.len();

        Coord::new(self.line, (bytes.len() - self.line_start) as u32)
    }

    /// Like [`position`](Self::position), but moved back over a trailing
    /// `*`, `[]`, `*` type prefix so links cover `*T`, `[]T` and `[]*T`.
    pub fn adjusted_position(
        &mut self,
        text: &str,
    ) -> Coord
    {
        let end = self.position(text);

        let mut rest = text;
        rest = rest
            .strip_suffix('*')
            .unwrap_or(rest);
        rest = rest
            .strip_suffix("[]")
            .unwrap_or(rest);
        rest = rest
            .strip_suffix('*')
            .unwrap_or(rest);

        let back = (text.len() - rest.len()) as u32;
        Coord::new(end.line, end.column.saturating_sub(back))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counts_lines_and_trailing_bytes()
    {
        let mut t = PositionTracker::new();
        assert_eq!(t.position(""), Coord::new(1, 0));
        assert_eq!(t.position("line1\nline2\nab"), Coord::new(3, 2));
    }

    #[test]
    fn resumes_from_previous_scan()
    {
        let mut buf = String::from("ab\n");
        let mut t = PositionTracker::new();
        assert_eq!(t.position(&buf), Coord::new(2, 0));

        buf.push_str("cde");
        assert_eq!(t.position(&buf), Coord::new(2, 3));

        buf.push_str("\n\nf");
        assert_eq!(t.position(&buf), Coord::new(4, 1));
    }

    #[test]
    fn adjusted_start_covers_type_prefixes()
    {
        let mut t = PositionTracker::new();
        assert_eq!(t.adjusted_position("x []*"), Coord::new(1, 2));

        let mut t = PositionTracker::new();
        assert_eq!(t.adjusted_position("p *[]"), Coord::new(1, 2));

        let mut t = PositionTracker::new();
        assert_eq!(t.adjusted_position("a ** "), Coord::new(1, 5));
    }

    proptest! {
        // Incremental tracking agrees with a full rescan after every append.
        #[test]
        fn matches_full_rescan(chunks in proptest::collection::vec("[a-c\\n]{0,8}", 0..32))
        {
            let mut buf = String::new();
            let mut t = PositionTracker::new();

            for chunk in &chunks
            {
                buf.push_str(chunk);
                let got = t.position(&buf);

                let line = 1 + buf.matches('\n').count() as u32;
                let column = buf.len() - buf.rfind('\n').map_or(0, |i| i + 1);
                prop_assert_eq!(got, Coord::new(line, column as u32));
            }
        }
    }
}
