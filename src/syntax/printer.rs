//! Pretty-printing of declarations back into Go source text.
//!
//! [`DeclPrinter`] is the seam the renderer prints through; [`GoPrinter`] is
//! a gofmt-like implementation that indents with spaces and aligns struct
//! fields and grouped value specs in columns.

use itertools::Itertools;

use crate::syntax::ast::{
    BasicLit, Block, ChanDir, Decl, Expr, Field, FieldList, FuncDecl, FuncType, GenDecl, GenKind,
    LitKind, Pos, Spec, Stmt, TypeSpec, ValueSpec,
};

/// A comment the printer must insert at a source position.
///
/// The classifier queues these when it redacts oversized literals; they are
/// ordered the same way the redacted nodes appear in the printed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice
{
    pub pos: Pos,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PrintError
{
    #[error("cannot print malformed source: {0}")]
    Malformed(String),
}

/// Turns a declaration plus splice comments into formatted text.
pub trait DeclPrinter: Send + Sync
{
    fn print(
        &self,
        decl: &Decl,
        splices: &[Splice],
    ) -> Result<String, PrintError>;
}

const FILTERED_FIELDS: &str = "// contains filtered or unexported fields";
const FILTERED_METHODS: &str = "// contains filtered or unexported methods";

/// gofmt-style printer using spaces for indentation.
#[derive(Debug, Clone)]
pub struct GoPrinter
{
    indent: String,
}

impl GoPrinter
{
    pub fn new(tab_width: usize) -> Self
    {
        Self { indent: " ".repeat(tab_width) }
    }
}

impl Default for GoPrinter
{
    fn default() -> Self
    {
        Self::new(4)
    }
}

impl DeclPrinter for GoPrinter
{
    fn print(
        &self,
        decl: &Decl,
        splices: &[Splice],
    ) -> Result<String, PrintError>
    {
        let mut p = Printer {
            out: String::new(),
            depth: 0,
            indent: &self.indent,
            splices,
            next_splice: 0,
        };
        p.decl(decl)?;
        Ok(p.out)
    }
}

type PResult = Result<(), PrintError>;

struct Printer<'a>
{
    out: String,
    depth: usize,
    indent: &'a str,
    splices: &'a [Splice],
    next_splice: usize,
}

impl<'a> Printer<'a>
{
    fn newline_indent(&mut self)
    {
        self.out
            .push('\n');
        self.write_indent();
    }

    fn write_indent(&mut self)
    {
        for _ in 0..self.depth
        {
            self.out
                .push_str(self.indent);
        }
    }

    /// Print into a fresh buffer and hand the text back.
    fn capture(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult,
    ) -> Result<String, PrintError>
    {
        let saved = std::mem::take(&mut self.out);
        let res = f(self);
        let text = std::mem::replace(&mut self.out, saved);
        res.map(|_| text)
    }

    fn take_splice(
        &mut self,
        pos: Pos,
    ) -> Option<&'a str>
    {
        let splice = self
            .splices
            .get(self.next_splice)?;
        if splice.pos != pos
        {
            return None;
        }
        self.next_splice += 1;
        Some(&splice.text)
    }

    fn decl(
        &mut self,
        decl: &Decl,
    ) -> PResult
    {
        match decl
        {
            Decl::Gen(g) => self.gen_decl(g),
            Decl::Func(f) => self.func_decl(f),
        }
    }

    fn gen_decl(
        &mut self,
        g: &GenDecl,
    ) -> PResult
    {
        self.out
            .push_str(g.kind.keyword());
        self.out
            .push(' ');

        if !g.grouped && g.specs.len() == 1
        {
            return match &g.specs[0]
            {
                Spec::Type(t) => self.type_spec(t),
                Spec::Value(v) =>
                {
                    let row = self.value_row(v)?;
                    let line = row
                        .into_iter()
                        .filter(|c| !c.is_empty())
                        .join(" ");
                    self.out
                        .push_str(&line);
                    Ok(())
                }
            };
        }

        if g.specs.is_empty()
        {
            self.out
                .push_str("()");
            return Ok(());
        }

        self.out
            .push('(');
        self.depth += 1;
        match g.kind
        {
            GenKind::Type =>
            {
                for spec in &g.specs
                {
                    if let Spec::Type(t) = spec
                    {
                        self.newline_indent();
                        self.type_spec(t)?;
                    }
                }
            }
            GenKind::Const | GenKind::Var =>
            {
                let mut rows = Vec::with_capacity(g.specs.len());
                for spec in &g.specs
                {
                    if let Spec::Value(v) = spec
                    {
                        rows.push(self.value_row(v)?);
                    }
                }
                self.aligned_rows(rows);
            }
        }
        self.depth -= 1;
        self.newline_indent();
        self.out
            .push(')');
        Ok(())
    }

    // Cells: names, type, `= values`. Absent parts are empty cells.
    fn value_row(
        &mut self,
        v: &ValueSpec,
    ) -> Result<Vec<String>, PrintError>
    {
        let names = v
            .names
            .iter()
            .map(|n| n.name.as_str())
            .join(", ");
        let ty = match &v.ty
        {
            Some(t) => self.capture(|p| p.expr(t))?,
            None => String::new(),
        };
        let values = if v.values.is_empty()
        {
            String::new()
        }
        else
        {
            let list = self.capture(|p| p.expr_list(&v.values))?;
            format!("= {list}")
        };
        Ok(vec![names, ty, values])
    }

    /// Emit one line per row, padding cells into columns. Rows that span
    /// several lines break alignment, like gofmt's tabwriter sections.
    fn aligned_rows(
        &mut self,
        rows: Vec<Vec<String>>,
    )
    {
        let mut section: Vec<Vec<String>> = Vec::new();
        for row in rows
        {
            if row
                .iter()
                .any(|c| c.contains('\n'))
            {
                self.flush_section(std::mem::take(&mut section));
                self.newline_indent();
                let line = row
                    .iter()
                    .filter(|c| !c.is_empty())
                    .join(" ");
                self.out
                    .push_str(&line);
            }
            else
            {
                section.push(row);
            }
        }
        self.flush_section(section);
    }

    fn flush_section(
        &mut self,
        rows: Vec<Vec<String>>,
    )
    {
        let columns = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &rows
        {
            for (j, cell) in row
                .iter()
                .enumerate()
            {
                // Only cells followed by more text need padding.
                if row[j + 1..]
                    .iter()
                    .any(|c| !c.is_empty())
                {
                    widths[j] = widths[j].max(
                        cell.chars()
                            .count(),
                    );
                }
            }
        }
        // Columns that are empty everywhere take no space at all.
        let used: Vec<bool> = (0..columns)
            .map(|j| {
                rows.iter()
                    .any(|r| r.get(j).is_some_and(|c| !c.is_empty()))
            })
            .collect();

        for row in rows
        {
            self.newline_indent();
            let last = row
                .iter()
                .rposition(|c| !c.is_empty())
                .unwrap_or(0);
            for (j, cell) in row
                .iter()
                .enumerate()
                .take(last + 1)
            {
                if !used[j]
                {
                    continue;
                }
                self.out
                    .push_str(cell);
                if j < last
                {
                    let pad = widths[j] - cell.chars().count() + 1;
                    self.out
                        .extend(std::iter::repeat_n(' ', pad));
                }
            }
        }
    }

    fn type_spec(
        &mut self,
        t: &TypeSpec,
    ) -> PResult
    {
        self.out
            .push_str(&t.name.name);
        if let Some(tp) = &t.type_params
        {
            self.type_params(tp)?;
        }
        self.out
            .push_str(if t.assign { " = " } else { " " });
        self.expr(&t.ty)
    }

    fn func_decl(
        &mut self,
        f: &FuncDecl,
    ) -> PResult
    {
        self.out
            .push_str("func ");
        if let Some(recv) = &f.recv
        {
            self.params(recv)?;
            self.out
                .push(' ');
        }
        self.out
            .push_str(&f.name.name);
        if let Some(tp) = &f.ty.type_params
        {
            self.type_params(tp)?;
        }
        self.signature(&f.ty)?;
        if let Some(body) = &f.body
        {
            self.block(body)?;
        }
        Ok(())
    }

    fn block(
        &mut self,
        b: &Block,
    ) -> PResult
    {
        if b.stmts.is_empty()
        {
            self.out
                .push_str(" {}");
            return Ok(());
        }
        self.out
            .push_str(" {");
        self.depth += 1;
        for stmt in &b.stmts
        {
            self.newline_indent();
            match stmt
            {
                Stmt::Return(results) =>
                {
                    self.out
                        .push_str("return");
                    if !results.is_empty()
                    {
                        self.out
                            .push(' ');
                        self.expr_list(results)?;
                    }
                }
                Stmt::Expr(e) => self.expr(e)?,
                Stmt::Verbatim(src) => self.verbatim_stmt(src),
            }
        }
        self.depth -= 1;
        self.newline_indent();
        self.out
            .push('}');
        Ok(())
    }

    /// Kept statement source; leading tabs of continuation lines become
    /// indentation levels below the current depth.
    fn verbatim_stmt(
        &mut self,
        src: &str,
    )
    {
        let mut lines = src.split('\n');
        if let Some(first) = lines.next()
        {
            self.out
                .push_str(first.trim_end());
        }
        for line in lines
        {
            let body = line.trim_start_matches('\t');
            if body
                .trim()
                .is_empty()
            {
                self.out
                    .push('\n');
                continue;
            }
            self.newline_indent();
            for _ in 0..line.len() - body.len()
            {
                self.out
                    .push_str(self.indent);
            }
            self.out
                .push_str(body.trim_end());
        }
    }

    fn type_params(
        &mut self,
        list: &FieldList,
    ) -> PResult
    {
        self.out
            .push('[');
        self.field_entries(list)?;
        self.out
            .push(']');
        Ok(())
    }

    fn params(
        &mut self,
        list: &FieldList,
    ) -> PResult
    {
        self.out
            .push('(');
        self.field_entries(list)?;
        self.out
            .push(')');
        Ok(())
    }

    fn field_entries(
        &mut self,
        list: &FieldList,
    ) -> PResult
    {
        for (i, field) in list
            .list
            .iter()
            .enumerate()
        {
            if i > 0
            {
                self.out
                    .push_str(", ");
            }
            if !field.names.is_empty()
            {
                let names = field
                    .names
                    .iter()
                    .map(|n| n.name.as_str())
                    .join(", ");
                self.out
                    .push_str(&names);
                self.out
                    .push(' ');
            }
            self.expr(&field.ty)?;
        }
        Ok(())
    }

    fn signature(
        &mut self,
        ft: &FuncType,
    ) -> PResult
    {
        self.params(&ft.params)?;
        match &ft.results
        {
            Some(res) if res.list.len() == 1 && res.list[0].names.is_empty() =>
            {
                self.out
                    .push(' ');
                self.expr(&res.list[0].ty)
            }
            Some(res) if !res.is_empty() =>
            {
                self.out
                    .push(' ');
                self.params(res)
            }
            _ => Ok(()),
        }
    }

    fn struct_type(
        &mut self,
        fields: &FieldList,
        incomplete: bool,
    ) -> PResult
    {
        if fields.is_empty() && !incomplete
        {
            self.out
                .push_str("struct{}");
            return Ok(());
        }
        self.out
            .push_str("struct {");
        self.depth += 1;
        let mut rows = Vec::with_capacity(fields.list.len());
        for field in &fields.list
        {
            rows.push(self.field_row(field)?);
        }
        self.aligned_rows(rows);
        if incomplete
        {
            self.newline_indent();
            self.out
                .push_str(FILTERED_FIELDS);
        }
        self.depth -= 1;
        self.newline_indent();
        self.out
            .push('}');
        Ok(())
    }

    // Cells: names (or the embedded type), type, tag.
    fn field_row(
        &mut self,
        field: &Field,
    ) -> Result<Vec<String>, PrintError>
    {
        let ty = self.capture(|p| p.expr(&field.ty))?;
        let tag = field
            .tag
            .as_ref()
            .map(|t| t.value.clone())
            .unwrap_or_default();
        if field.names.is_empty()
        {
            return Ok(vec![ty, tag]);
        }
        let names = field
            .names
            .iter()
            .map(|n| n.name.as_str())
            .join(", ");
        Ok(vec![names, ty, tag])
    }

    fn interface_type(
        &mut self,
        methods: &FieldList,
        incomplete: bool,
    ) -> PResult
    {
        if methods.is_empty() && !incomplete
        {
            self.out
                .push_str("interface{}");
            return Ok(());
        }
        self.out
            .push_str("interface {");
        self.depth += 1;
        for m in &methods.list
        {
            self.newline_indent();
            match (m.names.first(), &m.ty)
            {
                (Some(name), Expr::FuncType(ft)) =>
                {
                    self.out
                        .push_str(&name.name);
                    self.signature(ft)?;
                }
                _ => self.expr(&m.ty)?,
            }
        }
        if incomplete
        {
            self.newline_indent();
            self.out
                .push_str(FILTERED_METHODS);
        }
        self.depth -= 1;
        self.newline_indent();
        self.out
            .push('}');
        Ok(())
    }

    fn expr_list(
        &mut self,
        list: &[Expr],
    ) -> PResult
    {
        for (i, e) in list
            .iter()
            .enumerate()
        {
            if i > 0
            {
                self.out
                    .push_str(", ");
            }
            self.expr(e)?;
        }
        Ok(())
    }

    fn basic_lit(
        &mut self,
        lit: &BasicLit,
    )
    {
        self.out
            .push_str(&lit.value);
        if lit.kind == LitKind::String
            && lit.value == "\"\""
            && let Some(text) = self.take_splice(lit.pos)
        {
            self.out
                .push(' ');
            self.out
                .push_str(text);
        }
    }

    fn composite_lit(
        &mut self,
        ty: Option<&Expr>,
        elts: &[Expr],
        lbrace: Pos,
        rbrace: Pos,
    ) -> PResult
    {
        if let Some(ty) = ty
        {
            self.expr(ty)?;
        }
        self.out
            .push('{');

        if elts.is_empty()
        {
            if let Some(text) = self.take_splice(lbrace)
            {
                self.out
                    .push(' ');
                self.out
                    .push_str(text);
                self.out
                    .push(' ');
            }
            self.out
                .push('}');
            return Ok(());
        }

        let multiline = lbrace.is_valid() && rbrace.line > lbrace.line;
        if !multiline
        {
            self.expr_list(elts)?;
            self.out
                .push('}');
            return Ok(());
        }

        self.depth += 1;
        for e in elts
        {
            self.newline_indent();
            self.expr(e)?;
            self.out
                .push(',');
        }
        self.depth -= 1;
        self.newline_indent();
        self.out
            .push('}');
        Ok(())
    }

    fn expr(
        &mut self,
        e: &Expr,
    ) -> PResult
    {
        match e
        {
            Expr::Ident(id) => self
                .out
                .push_str(&id.name),
            Expr::BasicLit(lit) => self.basic_lit(lit),
            Expr::CompositeLit { ty, elts, lbrace, rbrace } =>
            {
                self.composite_lit(ty.as_deref(), elts, *lbrace, *rbrace)?
            }
            Expr::FuncLit { ty, body } =>
            {
                self.out
                    .push_str("func");
                self.signature(ty)?;
                self.out
                    .push(' ');
                self.out
                    .push_str(body);
            }
            Expr::Paren(x) =>
            {
                self.out
                    .push('(');
                self.expr(x)?;
                self.out
                    .push(')');
            }
            Expr::Selector { x, sel } =>
            {
                self.expr(x)?;
                self.out
                    .push('.');
                self.out
                    .push_str(&sel.name);
            }
            Expr::Index { x, indices } =>
            {
                self.expr(x)?;
                self.out
                    .push('[');
                self.expr_list(indices)?;
                self.out
                    .push(']');
            }
            Expr::Slice { x, low, high, max } =>
            {
                self.expr(x)?;
                self.out
                    .push('[');
                if let Some(low) = low
                {
                    self.expr(low)?;
                }
                self.out
                    .push(':');
                if let Some(high) = high
                {
                    self.expr(high)?;
                }
                if let Some(max) = max
                {
                    self.out
                        .push(':');
                    self.expr(max)?;
                }
                self.out
                    .push(']');
            }
            Expr::TypeAssert { x, ty } =>
            {
                self.expr(x)?;
                self.out
                    .push_str(".(");
                match ty
                {
                    Some(ty) => self.expr(ty)?,
                    None => self
                        .out
                        .push_str("type"),
                }
                self.out
                    .push(')');
            }
            Expr::Call { fun, args, ellipsis } =>
            {
                self.expr(fun)?;
                self.out
                    .push('(');
                self.expr_list(args)?;
                if *ellipsis
                {
                    self.out
                        .push_str("...");
                }
                self.out
                    .push(')');
            }
            Expr::Star(x) =>
            {
                self.out
                    .push('*');
                self.expr(x)?;
            }
            Expr::Unary { op, x } =>
            {
                self.out
                    .push_str(op);
                self.expr(x)?;
            }
            Expr::Binary { x, op, y } =>
            {
                self.expr(x)?;
                self.out
                    .push(' ');
                self.out
                    .push_str(op);
                self.out
                    .push(' ');
                self.expr(y)?;
            }
            Expr::KeyValue { key, value } =>
            {
                self.expr(key)?;
                self.out
                    .push_str(": ");
                self.expr(value)?;
            }
            Expr::ArrayType { len, elt } =>
            {
                self.out
                    .push('[');
                if let Some(len) = len
                {
                    self.expr(len)?;
                }
                self.out
                    .push(']');
                self.expr(elt)?;
            }
            Expr::Ellipsis(elt) =>
            {
                self.out
                    .push_str("...");
                if let Some(elt) = elt
                {
                    self.expr(elt)?;
                }
            }
            Expr::StructType { fields, incomplete } => self.struct_type(fields, *incomplete)?,
            Expr::FuncType(ft) =>
            {
                self.out
                    .push_str("func");
                self.signature(ft)?;
            }
            Expr::InterfaceType { methods, incomplete } =>
            {
                self.interface_type(methods, *incomplete)?
            }
            Expr::MapType { key, value } =>
            {
                self.out
                    .push_str("map[");
                self.expr(key)?;
                self.out
                    .push(']');
                self.expr(value)?;
            }
            Expr::ChanType { dir, value } =>
            {
                self.out
                    .push_str(match dir
                    {
                        ChanDir::Both => "chan ",
                        ChanDir::Send => "chan<- ",
                        ChanDir::Recv => "<-chan ",
                    });
                // `chan (<-chan T)` needs its parentheses to keep meaning.
                if *dir == ChanDir::Both
                    && matches!(**value, Expr::ChanType { dir: ChanDir::Recv, .. })
                {
                    self.out
                        .push('(');
                    self.expr(value)?;
                    self.out
                        .push(')');
                }
                else
                {
                    self.expr(value)?;
                }
            }
            Expr::Verbatim(src) => self
                .out
                .push_str(src),
            Expr::Bad(src) => return Err(PrintError::Malformed(src.clone())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::syntax::ast::{Ident, Resolution};

    fn print(decl: &Decl) -> String
    {
        GoPrinter::default()
            .print(decl, &[])
            .expect("print")
    }

    fn field(
        names: &[&str],
        ty: Expr,
    ) -> Field
    {
        Field::new(
            names
                .iter()
                .map(|n| Ident::new(*n))
                .collect(),
            ty,
        )
    }

    fn type_decl(
        name: &str,
        ty: Expr,
    ) -> Decl
    {
        Decl::Gen(GenDecl {
            kind: GenKind::Type,
            specs: vec![Spec::Type(TypeSpec {
                name: Ident::new(name),
                type_params: None,
                assign: false,
                ty,
            })],
            grouped: false,
        })
    }

    #[test]
    fn struct_fields_align_in_columns()
    {
        let mut tagged = field(&["LongName"], Expr::ident("string"));
        tagged.tag = Some(BasicLit::new(LitKind::String, "`json:\"n\"`"));
        let decl = type_decl(
            "A",
            Expr::StructType {
                fields: FieldList::new(vec![field(&["X"], Expr::ident("int")), tagged]),
                incomplete: false,
            },
        );

        assert_eq!(
            print(&decl),
            "type A struct {\n    X        int\n    LongName string `json:\"n\"`\n}"
        );
    }

    #[test]
    fn filtered_bodies_say_so()
    {
        let decl = type_decl(
            "T",
            Expr::StructType { fields: FieldList::default(), incomplete: true },
        );
        assert_eq!(
            print(&decl),
            "type T struct {\n    // contains filtered or unexported fields\n}"
        );

        let empty = type_decl(
            "E",
            Expr::InterfaceType { methods: FieldList::default(), incomplete: false },
        );
        assert_eq!(print(&empty), "type E interface{}");
    }

    #[test]
    fn grouped_consts_align_values()
    {
        let spec = |name: &str, ty: Option<&str>, value: &str| {
            Spec::Value(ValueSpec {
                names: vec![Ident::new(name)],
                ty: ty.map(Expr::ident),
                values: vec![Expr::int_lit(value)],
            })
        };
        let decl = Decl::Gen(GenDecl {
            kind: GenKind::Const,
            specs: vec![spec("A", None, "1"), spec("Bee", Some("int"), "2")],
            grouped: true,
        });

        assert_eq!(print(&decl), "const (\n    A       = 1\n    Bee int = 2\n)");
    }

    #[test]
    fn methods_print_receiver_and_results()
    {
        let decl = Decl::Func(FuncDecl {
            recv: Some(FieldList::new(vec![field(
                &["r"],
                Expr::star(Expr::decl_ref("Reader")),
            )])),
            name: Ident::new("Read"),
            ty: FuncType {
                type_params: None,
                params: FieldList::new(vec![field(&["p"], Expr::slice_of(Expr::ident("byte")))]),
                results: Some(FieldList::new(vec![
                    field(&["n"], Expr::ident("int")),
                    field(&["err"], Expr::ident("error")),
                ])),
            },
            body: None,
        });

        assert_eq!(print(&decl), "func (r *Reader) Read(p []byte) (n int, err error)");
    }

    #[test]
    fn bodies_print_one_statement_per_line()
    {
        let decl = Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new("Get"),
            ty: FuncType {
                results: Some(FieldList::new(vec![field(&[], Expr::ident("int"))])),
                ..FuncType::default()
            },
            body: Some(Block {
                stmts: vec![Stmt::Return(vec![Expr::selector(
                    Expr::Ident(Ident::new("a").with_res(Resolution::Local)),
                    Ident::new("X"),
                )])],
            }),
        });

        assert_eq!(print(&decl), "func Get() int {\n    return a.X\n}");
    }

    #[test]
    fn splices_follow_redacted_literals()
    {
        let lit_pos = Pos::new(10, 1, 11);
        let brace = Pos::new(30, 1, 31);
        let decl = Decl::Gen(GenDecl {
            kind: GenKind::Var,
            specs: vec![Spec::Value(ValueSpec {
                names: vec![Ident::new("S"), Ident::new("L")],
                ty: None,
                values: vec![
                    Expr::BasicLit(BasicLit { kind: LitKind::String, value: "\"\"".into(), pos: lit_pos }),
                    Expr::CompositeLit {
                        ty: Some(Box::new(Expr::slice_of(Expr::ident("int")))),
                        elts: vec![],
                        lbrace: brace,
                        rbrace: brace,
                    },
                ],
            })],
            grouped: false,
        });
        let splices = [
            Splice { pos: lit_pos, text: "/* 200 byte string literal not displayed */".into() },
            Splice { pos: brace, text: "/* 101 elements not displayed */".into() },
        ];

        let out = GoPrinter::default()
            .print(&decl, &splices)
            .expect("print");
        assert_eq!(
            out,
            "var S, L = \"\" /* 200 byte string literal not displayed */, []int{ /* 101 elements not displayed */ }"
        );
    }

    #[test]
    fn multiline_composites_keep_one_element_per_line()
    {
        let decl = Decl::Gen(GenDecl {
            kind: GenKind::Var,
            specs: vec![Spec::Value(ValueSpec {
                names: vec![Ident::new("Names")],
                ty: None,
                values: vec![Expr::CompositeLit {
                    ty: Some(Box::new(Expr::slice_of(Expr::ident("string")))),
                    elts: vec![Expr::string_lit("\"a\""), Expr::string_lit("\"b\"")],
                    lbrace: Pos::new(20, 1, 21),
                    rbrace: Pos::new(40, 4, 1),
                }],
            })],
            grouped: false,
        });

        assert_eq!(print(&decl), "var Names = []string{\n    \"a\",\n    \"b\",\n}");
    }

    #[test]
    fn kept_statements_nest_under_the_block()
    {
        let decl = Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new("F"),
            ty: FuncType::default(),
            body: Some(Block {
                stmts: vec![Stmt::Verbatim("for {\n\tif done {\n\t\tbreak\n\t}\n\n}".into())],
            }),
        });
        assert_eq!(
            print(&decl),
            "func F() {\n    for {\n        if done {\n            break\n        }\n\n    }\n}"
        );
    }

    #[test]
    fn receive_only_element_of_a_plain_channel_is_parenthesized()
    {
        let inner = Expr::ChanType { dir: ChanDir::Recv, value: Box::new(Expr::ident("int")) };
        let outer = |dir| Expr::ChanType { dir, value: Box::new(inner.clone()) };
        assert_eq!(print(&type_decl("A", outer(ChanDir::Both))), "type A chan (<-chan int)");
        assert_eq!(print(&type_decl("B", outer(ChanDir::Send))), "type B chan<- <-chan int");
    }

    #[test]
    fn malformed_source_is_an_error()
    {
        let decl = type_decl("Broken", Expr::Bad("struct {".into()));
        let err = GoPrinter::default()
            .print(&decl, &[])
            .unwrap_err();
        assert!(err.to_string().contains("struct {"));
    }
}
