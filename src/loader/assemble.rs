//! From parsed files to the package documentation model.
//!
//! Steps, in order:
//! 1. file lists, imports and the package doc comment
//! 2. package-level name resolution across all files
//! 3. type groups split into one declaration per type
//! 4. export filtering (skipped for `builtin`)
//! 5. association of values, constructors and methods with their types

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::PathBuf,
};

use tracing::debug;

use crate::{
    loader::{
        DeclDoc, Package, SourceFiles, TypeDoc,
        convert::{ParsedDecl, ParsedFile},
    },
    syntax::{
        ast::{
            Decl, Expr, FieldList, FuncType, GenDecl, GenKind, Ident, Resolution, Spec, Stmt,
            is_exported,
        },
        predeclared,
    },
};

/// Share of a value group's specs that must name one type for the group to
/// be listed under that type.
const DOMINANT_TYPE_THRESHOLD: f64 = 0.75;

pub struct Input
{
    pub import_path: String,
    pub dir: PathBuf,
    pub package: String,
    /// Non-test files, in file name order.
    pub parsed: Vec<ParsedFile>,
    pub test: Vec<String>,
    pub xtest: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mode
{
    /// Keep unexported declarations and members.
    pub all_decls: bool,
    pub preserve_bodies: bool,
}

pub fn assemble(
    input: Input,
    mode: Mode,
) -> Package
{
    let Input { import_path, dir, package, parsed, test, xtest } = input;

    let mut files = SourceFiles { test, xtest, ..SourceFiles::default() };
    let mut imports = BTreeSet::new();
    let mut doc = String::new();
    for f in &parsed
    {
        if f.is_cgo()
        {
            files
                .cgo
                .push(f.name.clone());
        }
        else
        {
            files
                .go
                .push(f.name.clone());
        }
        imports.extend(
            f.imports
                .iter()
                .filter(|i| i.path != "C")
                .map(|i| i.path.clone()),
        );
        if !f.package_doc.is_empty()
        {
            if !doc.is_empty()
            {
                doc.push('\n');
            }
            doc.push_str(&f.package_doc);
        }
    }

    let names: HashSet<String> = parsed
        .iter()
        .flat_map(|f| &f.decls)
        .flat_map(|d| top_level_names(&d.decl))
        .collect();
    let scope = PackageScope { names: &names };

    let mut entries = Vec::new();
    for f in parsed
    {
        for ParsedDecl { doc, spec_docs, mut decl } in f.decls
        {
            scope.decl(&mut decl);
            if !mode.preserve_bodies
                && let Decl::Func(func) = &mut decl
            {
                func.body = None;
            }
            split_type_group(&f.name, doc, spec_docs, decl, &mut entries);
        }
    }

    let mut pkg = Package {
        name: package,
        import_path,
        doc,
        dir,
        files,
        imports: imports
            .into_iter()
            .collect(),
        ..Package::default()
    };
    Associator::new(mode.all_decls).run(entries, &mut pkg);
    pkg
}

/// Names a declaration introduces at package scope. Methods introduce none.
fn top_level_names(decl: &Decl) -> Vec<String>
{
    match decl
    {
        Decl::Func(f) if f.recv.is_some() => Vec::new(),
        Decl::Func(f) => vec![f.name.name.clone()],
        Decl::Gen(g) => g
            .specs
            .iter()
            .flat_map(|s| match s
            {
                Spec::Type(t) => vec![t.name.name.clone()],
                Spec::Value(v) => v
                    .names
                    .iter()
                    .map(|n| n.name.clone())
                    .collect(),
            })
            .filter(|n| n != "_")
            .collect(),
    }
}

/// A multi-type group becomes one declaration per type, documented by the
/// spec's own comment.
fn split_type_group(
    file: &str,
    doc: String,
    spec_docs: Vec<String>,
    decl: Decl,
    out: &mut Vec<DeclDoc>,
)
{
    match decl
    {
        Decl::Gen(g) if g.kind == GenKind::Type && g.specs.len() > 1 =>
        {
            let docs = spec_docs
                .into_iter()
                .chain(std::iter::repeat(String::new()));
            for (spec, doc) in g
                .specs
                .into_iter()
                .zip(docs)
            {
                out.push(DeclDoc {
                    doc,
                    file: file.to_owned(),
                    decl: Decl::Gen(GenDecl { kind: GenKind::Type, specs: vec![spec], grouped: false }),
                });
            }
        }
        decl => out.push(DeclDoc { doc, file: file.to_owned(), decl }),
    }
}

/// Binds still-unresolved uses of package-level names.
struct PackageScope<'a>
{
    names: &'a HashSet<String>,
}

impl PackageScope<'_>
{
    fn decl(
        &self,
        decl: &mut Decl,
    )
    {
        match decl
        {
            Decl::Func(f) =>
            {
                if let Some(recv) = &mut f.recv
                {
                    self.fields(recv);
                }
                self.func_type(&mut f.ty);
                for stmt in f
                    .body
                    .iter_mut()
                    .flat_map(|b| &mut b.stmts)
                {
                    match stmt
                    {
                        Stmt::Return(results) => results
                            .iter_mut()
                            .for_each(|e| self.expr(e)),
                        Stmt::Expr(e) => self.expr(e),
                        Stmt::Verbatim(_) =>
                        {}
                    }
                }
            }
            Decl::Gen(g) =>
            {
                for spec in &mut g.specs
                {
                    match spec
                    {
                        Spec::Type(t) =>
                        {
                            if let Some(tp) = &mut t.type_params
                            {
                                self.fields(tp);
                            }
                            self.expr(&mut t.ty);
                        }
                        Spec::Value(v) =>
                        {
                            if let Some(ty) = &mut v.ty
                            {
                                self.expr(ty);
                            }
                            v.values
                                .iter_mut()
                                .for_each(|e| self.expr(e));
                        }
                    }
                }
            }
        }
    }

    fn func_type(
        &self,
        ty: &mut FuncType,
    )
    {
        if let Some(tp) = &mut ty.type_params
        {
            self.fields(tp);
        }
        self.fields(&mut ty.params);
        if let Some(results) = &mut ty.results
        {
            self.fields(results);
        }
    }

    /// Field types only; field names are bindings.
    fn fields(
        &self,
        list: &mut FieldList,
    )
    {
        for f in &mut list.list
        {
            self.expr(&mut f.ty);
        }
    }

    fn ident(
        &self,
        id: &mut Ident,
    )
    {
        if id.res == Resolution::Unresolved && self.names.contains(&id.name)
        {
            id.res = Resolution::Package;
        }
    }

    fn opt(
        &self,
        e: &mut Option<Box<Expr>>,
    )
    {
        if let Some(e) = e
        {
            self.expr(e);
        }
    }

    fn expr(
        &self,
        e: &mut Expr,
    )
    {
        match e
        {
            Expr::Ident(id) => self.ident(id),
            Expr::CompositeLit { ty, elts, .. } =>
            {
                self.opt(ty);
                elts.iter_mut()
                    .for_each(|e| self.expr(e));
            }
            Expr::FuncLit { ty, .. } | Expr::FuncType(ty) => self.func_type(ty),
            Expr::Selector { x, .. } => self.expr(x),
            Expr::Index { x, indices } =>
            {
                self.expr(x);
                indices
                    .iter_mut()
                    .for_each(|e| self.expr(e));
            }
            Expr::Slice { x, low, high, max } =>
            {
                self.expr(x);
                self.opt(low);
                self.opt(high);
                self.opt(max);
            }
            Expr::TypeAssert { x, ty } =>
            {
                self.expr(x);
                self.opt(ty);
            }
            Expr::Call { fun, args, .. } =>
            {
                self.expr(fun);
                args.iter_mut()
                    .for_each(|e| self.expr(e));
            }
            Expr::Paren(x) | Expr::Star(x) | Expr::Unary { x, .. } => self.expr(x),
            Expr::Binary { x, y, .. } =>
            {
                self.expr(x);
                self.expr(y);
            }
            Expr::KeyValue { key, value } =>
            {
                // A bare key names a struct field.
                if !matches!(**key, Expr::Ident(_))
                {
                    self.expr(key);
                }
                self.expr(value);
            }
            Expr::ArrayType { len, elt } =>
            {
                self.opt(len);
                self.expr(elt);
            }
            Expr::Ellipsis(x) => self.opt(x),
            Expr::StructType { fields, .. } => self.fields(fields),
            Expr::InterfaceType { methods, .. } => self.fields(methods),
            Expr::MapType { key, value } =>
            {
                self.expr(key);
                self.expr(value);
            }
            Expr::ChanType { value, .. } => self.expr(value),
            Expr::BasicLit(_) | Expr::Verbatim(_) | Expr::Bad(_) =>
            {}
        }
    }
}

/// Where a non-type declaration ends up.
enum Slot
{
    Hidden,
    Method(usize),
    /// Constructor of a type, or a plain function.
    Func(Option<usize>),
    Value
    {
        owner: Option<usize>,
        is_const: bool,
    },
}

/// Sorts entries into package- and type-level lists.
struct Associator
{
    all_decls: bool,
}

impl Associator
{
    fn new(all_decls: bool) -> Self
    {
        Self { all_decls }
    }

    fn visible(
        &self,
        name: &str,
    ) -> bool
    {
        self.all_decls || is_exported(name)
    }

    fn run(
        &self,
        entries: Vec<DeclDoc>,
        pkg: &mut Package,
    )
    {
        // Types first, so that anything declared before its type still finds it.
        let (types, rest): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|d| matches!(&d.decl, Decl::Gen(g) if g.kind == GenKind::Type));

        let mut index = HashMap::new();
        for mut d in types
        {
            if let Decl::Gen(g) = &mut d.decl
                && !self.all_decls
            {
                g.specs
                    .retain(|s| matches!(s, Spec::Type(t) if is_exported(&t.name.name)));
                if g.specs
                    .is_empty()
                {
                    continue;
                }
                for spec in &mut g.specs
                {
                    if let Spec::Type(t) = spec
                    {
                        filter_members(&mut t.ty);
                    }
                }
            }
            index.insert(
                d.name()
                    .to_owned(),
                pkg.types
                    .len(),
            );
            pkg.types
                .push(TypeDoc::new(d));
        }

        for mut d in rest
        {
            let slot = match &mut d.decl
            {
                Decl::Func(f) if f.recv.is_some() =>
                {
                    match f
                        .receiver_type()
                        .and_then(|t| index.get(t))
                    {
                        Some(&i) if self.visible(&f.name.name) => Slot::Method(i),
                        Some(_) => Slot::Hidden,
                        None =>
                        {
                            debug!(method = %f.name.name, "receiver type not documented");
                            Slot::Hidden
                        }
                    }
                }
                Decl::Func(f) if self.visible(&f.name.name) =>
                {
                    Slot::Func(self.constructed_type(&f.ty, &index))
                }
                Decl::Func(_) => Slot::Hidden,
                Decl::Gen(g) =>
                {
                    if !self.all_decls && !filter_values(g)
                    {
                        Slot::Hidden
                    }
                    else
                    {
                        Slot::Value {
                            owner: self.dominant_type(g, &index),
                            is_const: g.kind == GenKind::Const,
                        }
                    }
                }
            };

            match slot
            {
                Slot::Hidden =>
                {}
                Slot::Method(i) => pkg.types[i]
                    .methods
                    .push(d),
                Slot::Func(Some(i)) => pkg.types[i]
                    .funcs
                    .push(d),
                Slot::Func(None) => pkg
                    .funcs
                    .push(d),
                Slot::Value { owner: Some(i), is_const: true } => pkg.types[i]
                    .consts
                    .push(d),
                Slot::Value { owner: Some(i), is_const: false } => pkg.types[i]
                    .vars
                    .push(d),
                Slot::Value { owner: None, is_const: true } => pkg
                    .consts
                    .push(d),
                Slot::Value { owner: None, is_const: false } => pkg
                    .vars
                    .push(d),
            }
        }
    }

    /// The one package type (`T`, `*T`, `[]T`) among a function's results.
    fn constructed_type(
        &self,
        ty: &FuncType,
        index: &HashMap<String, usize>,
    ) -> Option<usize>
    {
        let type_params: HashSet<&str> = ty
            .type_params
            .iter()
            .flat_map(|tp| &tp.list)
            .flat_map(|f| &f.names)
            .map(|n| n.name.as_str())
            .collect();

        let mut found = None;
        let mut count = 0;
        for res in ty
            .results
            .iter()
            .flat_map(|r| &r.list)
        {
            let factory = match &res.ty
            {
                Expr::ArrayType { elt, .. } => &**elt,
                other => other,
            };
            let Some(name) = factory.base_type_name()
            else
            {
                continue;
            };
            if !self.visible(name)
                || predeclared::is_predeclared(name)
                || type_params.contains(name)
            {
                continue;
            }
            if let Some(&i) = index.get(name)
            {
                found = Some(i);
                count += 1;
                if count > 1
                {
                    break;
                }
            }
        }
        (count == 1)
            .then_some(found)
            .flatten()
    }

    /// The type most specs of a value group are declared with, if it
    /// dominates the group.
    fn dominant_type(
        &self,
        g: &GenDecl,
        index: &HashMap<String, usize>,
    ) -> Option<usize>
    {
        let mut dom: Option<&str> = None;
        let mut freq = 0;
        let mut prev: Option<&str> = None;
        for spec in &g.specs
        {
            let Spec::Value(v) = spec
            else
            {
                continue;
            };
            let name = match &v.ty
            {
                Some(ty) => ty.base_type_name(),
                // Implicit repetition of the previous const spec.
                None if g.kind == GenKind::Const && v.values.is_empty() => prev,
                None => None,
            };
            if let Some(name) = name
            {
                if dom.is_some_and(|d| d != name)
                {
                    dom = None;
                    break;
                }
                dom = Some(name);
                freq += 1;
            }
            prev = name;
        }

        let dom = dom?;
        let needed = (g.specs.len() as f64 * DOMINANT_TYPE_THRESHOLD) as usize;
        if !self.visible(dom) || freq < needed
        {
            return None;
        }
        index
            .get(dom)
            .copied()
    }
}

/// Drop unexported names from a value group. Returns false when nothing
/// exported is left.
///
/// Specs with values (or implicit const repetitions) keep their arity, so
/// unexported names become `_` rather than disappearing.
fn filter_values(g: &mut GenDecl) -> bool
{
    g.specs
        .retain_mut(|spec| {
            let Spec::Value(v) = spec
            else
            {
                return false;
            };
            let any_exported = v
                .names
                .iter()
                .any(Ident::is_exported);
            if !v
                .values
                .is_empty()
                || v.ty
                    .is_none()
            {
                for n in &mut v.names
                {
                    if !n.is_exported()
                    {
                        n.name = "_".into();
                    }
                }
            }
            else
            {
                v.names
                    .retain(Ident::is_exported);
            }
            any_exported
        });
    !g.specs
        .is_empty()
}

/// Hide unexported struct fields and interface methods, marking the
/// enclosing type incomplete.
fn filter_members(ty: &mut Expr)
{
    match ty
    {
        Expr::StructType { fields, incomplete } =>
        {
            *incomplete |= filter_fields(fields, false);
        }
        Expr::InterfaceType { methods, incomplete } =>
        {
            *incomplete |= filter_fields(methods, true);
        }
        Expr::Star(x) | Expr::Paren(x) => filter_members(x),
        Expr::ArrayType { elt, .. } => filter_members(elt),
        Expr::MapType { key, value } =>
        {
            filter_members(key);
            filter_members(value);
        }
        Expr::ChanType { value, .. } => filter_members(value),
        _ =>
        {}
    }
}

fn filter_fields(
    list: &mut FieldList,
    interface: bool,
) -> bool
{
    let before = list.num_fields();
    list.list
        .retain_mut(|f| {
            if f.names
                .is_empty()
            {
                return match embedded_name(&f.ty)
                {
                    Some(name) =>
                    {
                        is_exported(name) || (interface && predeclared::is_predeclared(name))
                    }
                    // Union and approximation elements.
                    None => true,
                };
            }
            f.names
                .retain(Ident::is_exported);
            if f.names
                .is_empty()
            {
                return false;
            }
            filter_members(&mut f.ty);
            true
        });
    list.num_fields() != before
}

/// Name an embedded field is known by: `T`, `*T`, `pkg.T`, `T[int]`.
fn embedded_name(ty: &Expr) -> Option<&str>
{
    match ty
    {
        Expr::Ident(id) => Some(&id.name),
        Expr::Selector { sel, .. } => Some(&sel.name),
        Expr::Star(x) | Expr::Paren(x) => embedded_name(x),
        Expr::Index { x, .. } => embedded_name(x),
        _ => None,
    }
}
