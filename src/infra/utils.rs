//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

// Tree-sitter types for node helpers
use tree_sitter::Node;

use crate::syntax::ast::Pos;

/// Common Tree-sitter node helpers
pub struct TsNodeUtils;

impl TsNodeUtils
{
    /// Source text of `node`, empty if the range is not valid UTF-8
    pub fn text<'a>(
        node: Node,
        src: &'a str,
    ) -> &'a str
    {
        // Slice via checked get so a bad range cannot panic
        src.get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
    }

    /// Start of `node` as a 1-based source position
    pub fn pos(node: Node) -> Pos
    {
        // Tree-sitter rows and columns are 0-based
        let p = node.start_position();
        Pos::new(node.start_byte() as u32, p.row as u32 + 1, p.column as u32 + 1)
    }

    /// Named children, skipping comments
    pub fn named_children(node: Node<'_>) -> Vec<Node<'_>>
    {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect()
    }

    /// All children bound to `field`
    pub fn field_children<'t>(
        node: Node<'t>,
        field: &str,
    ) -> Vec<Node<'t>>
    {
        let mut cursor = node.walk();
        node.children_by_field_name(field, &mut cursor)
            .collect()
    }

    /// Text of a child field if present
    pub fn field_text<'a>(
        node: Node,
        field: &str,
        src: &'a str,
    ) -> Option<&'a str>
    {
        // Locate the child by field name
        let child = node.child_by_field_name(field)?;

        Some(Self::text(child, src))
    }

    /// Whether an anonymous child token `tok` is present
    pub fn has_token(
        node: Node,
        tok: &str,
    ) -> bool
    {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| !c.is_named() && c.kind() == tok)
    }
}

/// Comment-group text extraction (markers stripped, directives dropped)
pub struct CommentText;

impl CommentText
{
    /// Join raw comments into doc text: one trailing newline, no leading
    /// or trailing blank lines, runs of blank lines collapsed.
    pub fn of<'a>(comments: impl IntoIterator<Item = &'a str>) -> String
    {
        let mut lines: Vec<String> = Vec::new();
        for c in comments
        {
            if let Some(rest) = c.strip_prefix("//")
            {
                // A marker followed by a space is prose; otherwise it may be
                // a tool directive such as //go:generate.
                let body = match rest.strip_prefix(' ')
                {
                    Some(body) => body,
                    None if Self::is_directive(rest) => continue,
                    None => rest,
                };
                lines.push(
                    body.trim_end()
                        .to_owned(),
                );
            }
            else if let Some(body) = c
                .strip_prefix("/*")
                .and_then(|b| b.strip_suffix("*/"))
            {
                lines.extend(
                    body.lines()
                        .map(|l| {
                            l.trim_end()
                                .to_owned()
                        }),
                );
            }
        }

        // Collapse blank runs and drop leading blanks
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines
        {
            let blank = line.is_empty();
            if blank && out.last().is_none_or(String::is_empty)
            {
                continue;
            }
            out.push(line);
        }
        while out
            .last()
            .is_some_and(String::is_empty)
        {
            out.pop();
        }

        if out.is_empty()
        {
            return String::new();
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    /// `//line`, `//extern`, `//export` and `//tool:word` comments
    fn is_directive(rest: &str) -> bool
    {
        if rest.starts_with("line ") || rest.starts_with("extern ") || rest.starts_with("export ")
        {
            return true;
        }
        let Some((tool, word)) = rest.split_once(':')
        else
        {
            return false;
        };
        let lower_alnum = |s: &str| {
            s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        };
        !tool.is_empty()
            && lower_alnum(tool)
            && word
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    }
}
