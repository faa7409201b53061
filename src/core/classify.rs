//! Identifier classification for one declaration.
//!
//! The walk visits identifiers in the order the printer will emit them and
//! queues one [`Event`] per identifier token. While walking it also redacts
//! oversized literals, queueing a [`Splice`] comment for each so the printer
//! can say what was left out.
//!
//! The queue is consumed later by the declaration renderer, which pairs it
//! with a fresh tokenization of the printed text. Nothing here knows about
//! output coordinates.

use std::collections::VecDeque;

use crate::syntax::{
    ast::{
        Block, Decl, Expr, FieldList, FuncDecl, FuncType, GenDecl, Ident, LitKind, Pos,
        Resolution, Spec, Stmt, TypeSpec, ValueSpec,
    },
    predeclared,
    printer::Splice,
    scanner::Scanner,
};

/// Role of one identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event
{
    /// Binding site or non-navigable name.
    NoLink,

    /// Declaration of a name; `scope` is the enclosing type for members.
    SelfAnchor
    {
        scope: Option<String>,
        pos: Pos,
    },

    /// Reference to a documented symbol; `package` is `None` for the
    /// package being rendered.
    DocLink
    {
        package: Option<String>,
    },

    /// Reference to a predeclared identifier.
    BuiltinLink,

    /// Package alias of a spaced-out qualified reference.
    PackageLink
    {
        path: String,
    },

    /// Package alias of a tight `alias.Member` reference.
    BeginLink
    {
        path: String,
    },

    /// Member that closes a [`Event::BeginLink`].
    EndLink
    {
        path: String,
    },
}

/// Redaction thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits
{
    /// Longest string literal token (quotes included) shown as-is.
    pub max_string_literal: usize,
    /// Most composite literal elements shown as-is.
    pub max_composite_elements: usize,
}

impl Default for Limits
{
    fn default() -> Self
    {
        Self { max_string_literal: 128, max_composite_elements: 100 }
    }
}

/// Result of classifying one declaration.
#[derive(Debug, Default)]
pub struct Classification
{
    pub events: VecDeque<Event>,
    pub splices: Vec<Splice>,
}

/// Tree walk producing the event queue for one declaration.
#[derive(Debug)]
pub struct LinkClassifier
{
    limits: Limits,
    out: Classification,
}

impl LinkClassifier
{
    /// Classify `decl`, redacting oversized literals in place.
    pub fn classify(
        limits: Limits,
        decl: &mut Decl,
    ) -> Classification
    {
        let mut v = Self { limits, out: Classification::default() };
        match decl
        {
            Decl::Gen(g) => v.gen_decl(g),
            Decl::Func(f) => v.func_decl(f),
        }
        v.out
    }

    fn push(
        &mut self,
        event: Event,
    )
    {
        self.out
            .events
            .push_back(event);
    }

    fn anchor(
        &mut self,
        name: &Ident,
        scope: Option<&str>,
    )
    {
        self.push(Event::SelfAnchor { scope: scope.map(str::to_owned), pos: name.pos });
    }

    fn gen_decl(
        &mut self,
        g: &mut GenDecl,
    )
    {
        for spec in &mut g.specs
        {
            match spec
            {
                Spec::Type(t) => self.type_spec(t),
                Spec::Value(v) => self.value_spec(v),
            }
        }
    }

    fn type_spec(
        &mut self,
        t: &mut TypeSpec,
    )
    {
        self.anchor(&t.name, None);
        if let Some(tp) = &mut t.type_params
        {
            self.field_list(tp);
        }

        let scope = t
            .name
            .name
            .clone();
        match &mut t.ty
        {
            Expr::StructType { fields: members, .. } | Expr::InterfaceType { methods: members, .. } =>
            {
                for m in &mut members.list
                {
                    for name in &m.names
                    {
                        self.anchor(name, Some(&scope));
                    }
                    self.expr(&mut m.ty);
                }
            }
            other => self.expr(other),
        }
    }

    fn func_decl(
        &mut self,
        f: &mut FuncDecl,
    )
    {
        if let Some(recv) = &mut f.recv
        {
            self.field_list(recv);
        }
        self.anchor(&f.name, None);
        self.func_type(&mut f.ty);
        if let Some(body) = &mut f.body
        {
            self.block(body);
        }
    }

    fn block(
        &mut self,
        b: &mut Block,
    )
    {
        for stmt in &mut b.stmts
        {
            match stmt
            {
                Stmt::Return(results) =>
                {
                    for e in results
                    {
                        self.expr(e);
                    }
                }
                Stmt::Expr(e) => self.expr(e),
                Stmt::Verbatim(src) => self.verbatim(src),
            }
        }
    }

    fn func_type(
        &mut self,
        ft: &mut FuncType,
    )
    {
        if let Some(tp) = &mut ft.type_params
        {
            self.field_list(tp);
        }
        self.field_list(&mut ft.params);
        if let Some(res) = &mut ft.results
        {
            self.field_list(res);
        }
    }

    /// Names in a field list are binding sites, never links.
    fn field_list(
        &mut self,
        list: &mut FieldList,
    )
    {
        for field in &mut list.list
        {
            for _ in &field.names
            {
                self.push(Event::NoLink);
            }
            self.expr(&mut field.ty);
        }
    }

    fn value_spec(
        &mut self,
        v: &mut ValueSpec,
    )
    {
        for name in &v.names
        {
            self.anchor(name, None);
        }
        if let Some(ty) = &mut v.ty
        {
            self.expr(ty);
        }
        for value in &mut v.values
        {
            self.expr(value);
        }
    }

    fn ident(
        &mut self,
        id: &Ident,
    )
    {
        let bound = id
            .res
            .is_bound();
        let event = if !bound && predeclared::is_predeclared(&id.name)
        {
            Event::BuiltinLink
        }
        else if bound && id.is_exported()
        {
            Event::DocLink { package: None }
        }
        else
        {
            Event::NoLink
        };
        self.push(event);
    }

    fn selector(
        &mut self,
        x: &mut Expr,
        sel: &Ident,
    )
    {
        if let Expr::Ident(alias) = x
            && let Resolution::Import(path) = &alias.res
        {
            if path == "C"
            {
                self.push(Event::NoLink);
                self.push(Event::NoLink);
            }
            else if sel.pos.is_valid() && sel.pos.offset == alias.end_offset() + 1
            {
                self.push(Event::BeginLink { path: path.clone() });
                self.push(Event::EndLink { path: path.clone() });
            }
            else
            {
                self.push(Event::PackageLink { path: path.clone() });
                self.push(Event::DocLink { package: Some(path.clone()) });
            }
            return;
        }

        // Field or method access on a value.
        self.expr(x);
        self.push(Event::NoLink);
    }

    /// Raw source: every identifier in it is a plain name.
    fn verbatim(
        &mut self,
        src: &str,
    )
    {
        for _ in Scanner::idents(src)
        {
            self.push(Event::NoLink);
        }
    }

    fn expr(
        &mut self,
        e: &mut Expr,
    )
    {
        match e
        {
            Expr::Ident(id) => self.ident(id),
            Expr::BasicLit(lit) =>
            {
                let len = lit
                    .value
                    .len();
                if lit.kind == LitKind::String && len > self.limits.max_string_literal
                {
                    self.out
                        .splices
                        .push(Splice {
                            pos: lit.pos,
                            text: format!("/* {len} byte string literal not displayed */"),
                        });
                    lit.value = "\"\"".to_owned();
                }
            }
            Expr::CompositeLit { ty, elts, lbrace, .. } =>
            {
                if let Some(ty) = ty
                {
                    self.expr(ty);
                }
                if elts.len() > self.limits.max_composite_elements
                {
                    self.out
                        .splices
                        .push(Splice {
                            pos: *lbrace,
                            text: format!("/* {} elements not displayed */", elts.len()),
                        });
                    elts.clear();
                }
                else
                {
                    for elt in elts
                    {
                        self.expr(elt);
                    }
                }
            }
            Expr::FuncLit { ty, body } =>
            {
                self.func_type(ty);
                self.verbatim(body);
            }
            Expr::Paren(x) | Expr::Star(x) | Expr::Unary { x, .. } => self.expr(x),
            Expr::Selector { x, sel } => self.selector(x, sel),
            Expr::Index { x, indices } =>
            {
                self.expr(x);
                for i in indices
                {
                    self.expr(i);
                }
            }
            Expr::Slice { x, low, high, max } =>
            {
                self.expr(x);
                for part in [low, high, max]
                    .into_iter()
                    .flatten()
                {
                    self.expr(part);
                }
            }
            Expr::TypeAssert { x, ty } =>
            {
                self.expr(x);
                if let Some(ty) = ty
                {
                    self.expr(ty);
                }
            }
            Expr::Call { fun, args, .. } =>
            {
                self.expr(fun);
                for a in args
                {
                    self.expr(a);
                }
            }
            Expr::Binary { x, y, .. } =>
            {
                self.expr(x);
                self.expr(y);
            }
            Expr::KeyValue { key, value } =>
            {
                self.expr(key);
                self.expr(value);
            }
            Expr::ArrayType { len, elt } =>
            {
                if let Some(len) = len
                {
                    self.expr(len);
                }
                self.expr(elt);
            }
            Expr::Ellipsis(elt) =>
            {
                if let Some(elt) = elt
                {
                    self.expr(elt);
                }
            }
            Expr::StructType { fields, .. } => self.field_list(fields),
            Expr::InterfaceType { methods, .. } => self.field_list(methods),
            Expr::FuncType(ft) => self.func_type(ft),
            Expr::MapType { key, value } =>
            {
                self.expr(key);
                self.expr(value);
            }
            Expr::ChanType { value, .. } => self.expr(value),
            Expr::Verbatim(src) => self.verbatim(src),
            Expr::Bad(_) =>
            {}
        }
    }
}
