//! Doc comment reflow.
//!
//! Comment text is split into blocks: paragraphs (reflowed to the width),
//! headings (a lone capitalized line between paragraphs, kept as-is) and
//! preformatted runs (indented lines, copied with their relative
//! indentation). Blocks are separated by one blank line.

#[derive(Debug, PartialEq, Eq)]
enum Block<'a>
{
    Para(Vec<&'a str>),
    Heading(&'a str),
    Pre(Vec<&'a str>),
}

/// Append `text` to `out`, indenting paragraphs by `indent` and
/// preformatted lines by `pre_indent`. `width` bounds the paragraph text,
/// not counting the indent.
pub fn to_text(
    out: &mut String,
    text: &str,
    indent: &str,
    pre_indent: &str,
    width: usize,
)
{
    for (i, block) in blocks(text)
        .into_iter()
        .enumerate()
    {
        if i > 0
        {
            out.push('\n');
        }
        match block
        {
            Block::Para(lines) =>
            {
                let words = lines
                    .iter()
                    .flat_map(|l| l.split_whitespace());
                wrap(out, words, indent, width);
            }
            Block::Heading(line) =>
            {
                out.push_str(indent);
                out.push_str(&convert_quotes(line));
                out.push('\n');
            }
            Block::Pre(lines) =>
            {
                for line in lines
                {
                    if !line.trim().is_empty()
                    {
                        out.push_str(pre_indent);
                        out.push_str(line);
                    }
                    out.push('\n');
                }
            }
        }
    }
}

fn wrap<'a>(
    out: &mut String,
    words: impl Iterator<Item = &'a str>,
    indent: &str,
    width: usize,
)
{
    let mut n = 0;
    for word in words
    {
        let word = convert_quotes(word);
        let w = word
            .chars()
            .count();
        if n > 0 && n + 1 + w > width
        {
            out.push('\n');
            n = 0;
        }
        if n == 0
        {
            out.push_str(indent);
        }
        else
        {
            out.push(' ');
            n += 1;
        }
        out.push_str(&word);
        n += w;
    }
    if n > 0
    {
        out.push('\n');
    }
}

/// ``quoted'' becomes “quoted”.
fn convert_quotes(s: &str) -> String
{
    s.replace("``", "\u{201c}")
        .replace("''", "\u{201d}")
}

fn indent_len(line: &str) -> usize
{
    line.len()
        - line
            .trim_start_matches([' ', '\t'])
            .len()
}

fn is_blank(line: &str) -> bool
{
    line.trim()
        .is_empty()
}

fn blocks(text: &str) -> Vec<Block<'_>>
{
    let lines: Vec<&str> = text
        .lines()
        .collect();

    // Indentation shared by every non-blank line is not significant.
    let common = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_len(l))
        .min()
        .unwrap_or(0);
    let lines: Vec<&str> = lines
        .into_iter()
        .map(|l| if is_blank(l) { "" } else { &l[common..] })
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len()
    {
        if is_blank(lines[i])
        {
            i += 1;
            continue;
        }

        let start = i;
        if indent_len(lines[i]) > 0
        {
            // Preformatted run; interior blank lines belong to it.
            let mut end = i;
            while i < lines.len() && (is_blank(lines[i]) || indent_len(lines[i]) > 0)
            {
                if !is_blank(lines[i])
                {
                    end = i + 1;
                }
                i += 1;
            }
            i = end;
            let run = &lines[start..end];
            let pre = run
                .iter()
                .filter(|l| !is_blank(l))
                .map(|l| indent_len(l))
                .min()
                .unwrap_or(0);
            out.push(Block::Pre(
                run.iter()
                    .map(|l| if is_blank(l) { "" } else { &l[pre..] })
                    .collect(),
            ));
            continue;
        }

        while i < lines.len() && !is_blank(lines[i]) && indent_len(lines[i]) == 0
        {
            i += 1;
        }
        out.push(Block::Para(lines[start..i].to_vec()));
    }

    // A one-line paragraph between two paragraphs may be a heading.
    for k in 1..out.len().saturating_sub(1)
    {
        let heading = match (&out[k - 1], &out[k], &out[k + 1])
        {
            (Block::Para(_), Block::Para(lines), Block::Para(_)) if lines.len() == 1 =>
            {
                heading_text(lines[0])
            }
            _ => None,
        };
        if let Some(line) = heading
        {
            out[k] = Block::Heading(line);
        }
    }
    out
}

fn heading_text(line: &str) -> Option<&str>
{
    let line = line.trim();
    let first = line
        .chars()
        .next()?;
    if !first.is_uppercase()
    {
        return None;
    }
    let last = line
        .chars()
        .last()?;
    if !last.is_alphanumeric()
    {
        return None;
    }
    line.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '(' | ')' | '\'' | '-'))
        .then_some(line)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn render(text: &str) -> String
    {
        let mut out = String::new();
        to_text(&mut out, text, "    ", "       ", 20);
        out
    }

    #[test]
    fn paragraphs_reflow_to_width()
    {
        assert_eq!(
            render("Package fmt implements formatted\nI/O with functions."),
            "    Package fmt\n    implements formatted\n    I/O with functions.\n"
        );
    }

    #[test]
    fn preformatted_lines_keep_relative_indent()
    {
        let text = "Example:\n\n\tif x {\n\t\ty()\n\t}\n\nDone.";
        assert_eq!(
            render(text),
            "    Example:\n\n       if x {\n       \ty()\n       }\n\n    Done.\n"
        );
    }

    #[test]
    fn lone_capitalized_line_between_paragraphs_is_a_heading()
    {
        let text = "Intro text.\n\nSecurity Model\n\nMore text here.";
        assert_eq!(
            blocks(text),
            [
                Block::Para(vec!["Intro text."]),
                Block::Heading("Security Model"),
                Block::Para(vec!["More text here."]),
            ]
        );
        assert!(heading_text("Not a heading.").is_none());
        assert!(heading_text("lowercase start").is_none());
    }

    #[test]
    fn double_quotes_are_converted()
    {
        assert_eq!(render("a ``b'' c"), "    a \u{201c}b\u{201d} c\n");
    }

    #[test]
    fn common_indentation_is_not_preformatted()
    {
        assert_eq!(render("  one\n  two"), "    one two\n");
    }
}
