//! Out-of-band navigation metadata.
//!
//! Records are appended in render order and never rewritten. Each line of
//! the serialized stream is one record:
//!
//! ```text
//! S <value>                          string definition (address = ordinal)
//! A <line:col> <line:col> <addr>     anchor for a name
//! L <line:col> <line:col> <addr> [<addr>]   link to a document [+ symbol]
//! J <line:col> <line:col> <addr> <line>     jump to a source file line
//! ```
//!
//! The stream is terminated by a `D` line, after which the text follows.

use std::fmt;

use crate::core::intern::StringTable;

/// Index of a string definition in the metadata stream.
pub type Address = u32;

/// Output cursor coordinate: 1-based line, byte column within the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord
{
    pub line: u32,
    pub column: u32,
}

impl Coord
{
    pub fn new(
        line: u32,
        column: u32,
    ) -> Self
    {
        Self { line, column }
    }
}

impl fmt::Display for Coord
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind
{
    /// Definition site; target is the anchor name.
    Anchor,
    /// Cross reference; target is a document, secondary the symbol name.
    Link,
    /// Jump to definition; target is a file, secondary the line.
    Source,
}

impl SpanKind
{
    fn tag(self) -> char
    {
        match self
        {
            SpanKind::Anchor => 'A',
            SpanKind::Link => 'L',
            SpanKind::Source => 'J',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRecord
{
    pub kind: SpanKind,
    pub start: Coord,
    pub end: Coord,
    pub target: Address,
    pub secondary: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record
{
    Define(String),
    Span(SpanRecord),
}

impl fmt::Display for Record
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            Record::Define(value) => write!(f, "S {value}"),
            Record::Span(s) =>
            {
                write!(f, "{} {} {} {}", s.kind.tag(), s.start, s.end, s.target)?;
                if let Some(n) = s.secondary
                {
                    write!(f, " {n}")?;
                }
                Ok(())
            }
        }
    }
}

/// The metadata stream of one render together with its string table.
#[derive(Debug, Default)]
pub struct Metadata
{
    records: Vec<Record>,
    strings: StringTable,
}

impl Metadata
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn intern(
        &mut self,
        value: &str,
    ) -> Address
    {
        self.strings
            .intern(value, &mut self.records)
    }

    pub fn anchor(
        &mut self,
        start: Coord,
        end: Coord,
        name: &str,
    )
    {
        let target = self.intern(name);
        self.push(SpanKind::Anchor, start, end, target, None);
    }

    /// Link to `document` (empty for the current package), optionally to a
    /// symbol inside it.
    pub fn link(
        &mut self,
        start: Coord,
        end: Coord,
        document: &str,
        symbol: Option<&str>,
    )
    {
        let target = self.intern(document);
        let symbol = symbol.map(|s| self.intern(s));
        self.push(SpanKind::Link, start, end, target, symbol);
    }

    pub fn source(
        &mut self,
        start: Coord,
        end: Coord,
        file: &str,
        line: u32,
    )
    {
        let target = self.intern(file);
        self.push(SpanKind::Source, start, end, target, Some(line));
    }

    fn push(
        &mut self,
        kind: SpanKind,
        start: Coord,
        end: Coord,
        target: Address,
        secondary: Option<u32>,
    )
    {
        debug_assert!(start <= end, "span runs backwards: {start} > {end}");
        self.records
            .push(Record::Span(SpanRecord { kind, start, end, target, secondary }));
    }

    pub fn records(&self) -> &[Record]
    {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record>
    {
        self.records
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn strings_are_defined_before_the_span_using_them()
    {
        let mut meta = Metadata::new();
        meta.link(Coord::new(1, 4), Coord::new(1, 7), "godoc://io", Some("Reader"));

        let lines: Vec<String> = meta
            .records()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, ["S godoc://io", "S Reader", "L 1:4 1:7 0 1"]);
    }

    #[test]
    fn repeated_targets_reuse_addresses()
    {
        let mut meta = Metadata::new();
        meta.link(Coord::new(1, 0), Coord::new(1, 3), "", Some("T"));
        meta.anchor(Coord::new(2, 5), Coord::new(2, 6), "T");
        meta.source(Coord::new(2, 5), Coord::new(2, 6), "/src/a.go", 12);
        meta.link(Coord::new(3, 0), Coord::new(3, 7), "godoc://fmt", None);

        let lines: Vec<String> = meta
            .records()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            [
                "S ",
                "S T",
                "L 1:0 1:3 0 1",
                "A 2:5 2:6 1",
                "S /src/a.go",
                "J 2:5 2:6 2 12",
                "S godoc://fmt",
                "L 3:0 3:7 3",
            ]
        );
    }
}
