//! One declaration block.
//!
//! The declaration is classified, printed and then retokenized; each
//! identifier token of the printed text is paired with the next queued
//! [`Event`]. If the two sides disagree in length the rest of the text is
//! copied without annotations, which degrades navigation but never the text.

use std::path::Path;

use tracing::debug;

use crate::{
    core::{
        classify::{Classification, Event, Limits, LinkClassifier},
        meta::Coord,
        render::{Sink, source_path},
    },
    syntax::{ast::Decl, printer::DeclPrinter, scanner::Scanner},
};

const BUILTIN_DOC: &str = "godoc://builtin";

/// What a declaration render needs besides the node itself.
#[derive(Clone, Copy)]
pub struct DeclContext<'a>
{
    pub printer: &'a dyn DeclPrinter,
    pub limits: Limits,
    /// Package source directory, for source-jump records.
    pub dir: &'a Path,
}

/// Render `decl` (declared in `file`) into `sink`, followed by a blank line.
pub fn render(
    sink: &mut Sink,
    cx: &DeclContext<'_>,
    decl: &Decl,
    file: &str,
)
{
    // Redaction rewrites literals; the package model stays untouched.
    let mut decl = decl.clone();
    let Classification { mut events, splices } = LinkClassifier::classify(cx.limits, &mut decl);

    let printed = match cx
        .printer
        .print(&decl, &splices)
    {
        Ok(text) => text,
        Err(e) =>
        {
            debug!(decl = decl.name(), error = %e, "declaration not printable");
            sink.write(&e.to_string());
            sink.write("\n\n");
            return;
        }
    };
    let text = printed.trim_end_matches([' ', '\t', '\n']);

    let mut last = 0;
    let mut begin: Option<Coord> = None;
    for tok in Scanner::idents(text)
    {
        let Some(event) = events.pop_front()
        else
        {
            debug!(decl = decl.name(), at = tok.offset, "identifiers outnumber events");
            break;
        };

        sink.write(&text[last..tok.offset]);
        last = tok.offset + tok.text.len();
        let name = tok.text;

        match event
        {
            Event::NoLink => sink.write(name),
            Event::SelfAnchor { scope, pos } =>
            {
                let start = sink.position();
                sink.write(name);
                let end = sink.position();
                let anchor = match scope
                {
                    Some(scope) => format!("{scope}.{name}"),
                    None => name.to_owned(),
                };
                let meta = sink.meta();
                meta.anchor(start, end, &anchor);
                if pos.is_valid()
                {
                    meta.source(start, end, &source_path(cx.dir, file), pos.line);
                }
            }
            Event::DocLink { package } =>
            {
                let document = package
                    .map(|p| format!("godoc://{p}"))
                    .unwrap_or_default();
                symbol_link(sink, name, &document);
            }
            Event::BuiltinLink => symbol_link(sink, name, BUILTIN_DOC),
            Event::PackageLink { path } =>
            {
                sink.linked(name, &format!("godoc://{path}"));
            }
            Event::BeginLink { .. } =>
            {
                begin = Some(sink.adjusted_position());
                sink.write(name);
            }
            Event::EndLink { path } =>
            {
                let start = match begin.take()
                {
                    Some(start) => start,
                    None => sink.position(),
                };
                sink.write(name);
                let end = sink.position();
                sink.meta()
                    .link(start, end, &format!("godoc://{path}"), Some(name));
            }
        }
    }

    if !events.is_empty()
    {
        debug!(decl = decl.name(), left = events.len(), "events outnumber identifiers");
    }

    sink.write(&text[last..]);
    sink.write("\n\n");
}

/// Link to `name` inside `document`, widened over a `*`/`[]` type prefix.
fn symbol_link(
    sink: &mut Sink,
    name: &str,
    document: &str,
)
{
    let start = sink.adjusted_position();
    sink.write(name);
    let end = sink.position();
    sink.meta()
        .link(start, end, document, Some(name));
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{
        core::render::Rendered,
        syntax::{
            ast::{
                Expr, Field, FieldList, GenDecl, GenKind, Ident, Pos, Resolution, Spec, TypeSpec,
                ValueSpec,
            },
            printer::{GoPrinter, PrintError, Splice},
        },
    };

    /// Printer that ignores the node and returns canned text.
    struct Canned(&'static str);

    impl DeclPrinter for Canned
    {
        fn print(
            &self,
            _: &Decl,
            _: &[Splice],
        ) -> Result<String, PrintError>
        {
            Ok(self.0.to_owned())
        }
    }

    fn render_one(
        printer: &dyn DeclPrinter,
        decl: &Decl,
    ) -> Rendered
    {
        let cx = DeclContext { printer, limits: Limits::default(), dir: Path::new("/src/p") };
        let mut sink = Sink::new();
        render(&mut sink, &cx, decl, "a.go");
        sink.finish()
    }

    fn lines(r: &Rendered) -> Vec<String>
    {
        r.records
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn var(
        name: &str,
        ty: Expr,
    ) -> Decl
    {
        Decl::Gen(GenDecl {
            kind: GenKind::Var,
            specs: vec![Spec::Value(ValueSpec {
                names: vec![Ident::new(name)],
                ty: Some(ty),
                values: vec![],
            })],
            grouped: false,
        })
    }

    /// `io.Reader` with the member `gap` bytes after the alias.
    fn io_reader(gap: u32) -> Expr
    {
        let alias = Ident::new("io")
            .with_res(Resolution::Import("io".into()))
            .at(Pos::new(40, 3, 9));
        let member = Ident::new("Reader").at(Pos::new(42 + gap, 3, 11 + gap));
        Expr::selector(Expr::Ident(alias), member)
    }

    #[test]
    fn struct_declaration_snapshot()
    {
        let decl = Decl::Gen(GenDecl {
            kind: GenKind::Type,
            specs: vec![Spec::Type(TypeSpec {
                name: Ident::new("A").at(Pos::new(20, 3, 6)),
                type_params: None,
                assign: false,
                ty: Expr::StructType {
                    fields: FieldList::new(vec![Field::new(
                        vec![Ident::new("X").at(Pos::new(33, 4, 2))],
                        Expr::ident("int"),
                    )]),
                    incomplete: false,
                },
            })],
            grouped: false,
        });

        let r = render_one(&GoPrinter::default(), &decl);
        let mut out = Vec::new();
        r.write_to(&mut out)
            .expect("write");
        let out = String::from_utf8(out).expect("utf8");

        insta::assert_snapshot!(out, @r"
        S A
        A 1:5 1:6 0
        S /src/p/a.go
        J 1:5 1:6 1 3
        S A.X
        A 2:4 2:5 2
        J 2:4 2:5 1 4
        S godoc://builtin
        S int
        L 2:6 2:9 3 4
        D
        type A struct {
            X int
        }
        ");
    }

    #[test]
    fn tight_selector_is_one_link_over_its_type_prefix()
    {
        let decl = var("R", Expr::slice_of(Expr::star(io_reader(1))));
        let r = render_one(&GoPrinter::default(), &decl);

        assert_eq!(r.text, "var R []*io.Reader\n\n");
        assert_eq!(
            lines(&r),
            ["S R", "A 1:4 1:5 0", "S godoc://io", "S Reader", "L 1:6 1:18 1 2"]
        );
    }

    #[test]
    fn spaced_selector_links_package_and_member_separately()
    {
        let decl = var("R", io_reader(2));
        let r = render_one(&Canned("var R io. Reader"), &decl);

        assert_eq!(
            lines(&r),
            [
                "S R",
                "A 1:4 1:5 0",
                "S godoc://io",
                "L 1:6 1:8 1",
                "S Reader",
                "L 1:10 1:16 1 2",
            ]
        );
    }

    #[test]
    fn same_package_links_use_the_empty_document()
    {
        let decl = var("C", Expr::star(Expr::decl_ref("Config")));
        let r = render_one(&GoPrinter::default(), &decl);

        assert_eq!(r.text, "var C *Config\n\n");
        assert_eq!(lines(&r), ["S C", "A 1:4 1:5 0", "S ", "S Config", "L 1:6 1:13 1 2"]);
    }

    #[test]
    fn extra_identifiers_are_copied_unannotated()
    {
        let decl = var("X", Expr::ident("int"));
        let r = render_one(&Canned("var X int, extra, more\n"), &decl);

        assert_eq!(r.text, "var X int, extra, more\n\n");
        assert_eq!(
            r.records
                .iter()
                .filter(|rec| !matches!(rec, crate::core::meta::Record::Define(_)))
                .count(),
            2
        );
    }

    #[test]
    fn leftover_events_are_dropped()
    {
        let decl = var("X", Expr::decl_ref("Config"));
        let r = render_one(&Canned("var X"), &decl);

        assert_eq!(r.text, "var X\n\n");
        assert_eq!(lines(&r), ["S X", "A 1:4 1:5 0"]);
    }

    #[test]
    fn printer_failure_replaces_the_block()
    {
        let decl = var("B", Expr::Bad("map[".into()));
        let r = render_one(&GoPrinter::default(), &decl);

        assert_eq!(r.text, "cannot print malformed source: map[\n\n");
        assert!(r.records.is_empty());
    }
}
