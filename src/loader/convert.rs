//! tree-sitter-go parse trees to declaration syntax.
//!
//! Local names (type parameters, receivers, parameters, results) and
//! imported package names are resolved here, per file. Package-level
//! resolution needs every file of the package and happens in
//! [`assemble`](crate::loader::assemble).

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser};

use crate::{
    infra::utils::{CommentText, TsNodeUtils},
    loader::{LoadError, context::SourceText, context::guess_name_from_path},
    syntax::ast::{
        BasicLit, Block, ChanDir, Decl, Expr, Field, FieldList, FuncDecl, FuncType, GenDecl,
        GenKind, Ident, LitKind, Pos, Resolution, Spec, Stmt, TypeSpec, ValueSpec,
    },
};

/// One import of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import
{
    /// Explicit local name (`.`, `_` or an alias), if any.
    pub name: Option<String>,
    pub path: String,
}

impl Import
{
    /// Name the package is referred to by in the importing file.
    pub fn local_name(&self) -> String
    {
        self.name
            .clone()
            .unwrap_or_else(|| guess_name_from_path(&self.path))
    }
}

/// A top-level declaration with its doc comments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDecl
{
    pub doc: String,
    /// Own doc comment of each spec, for splitting type groups.
    pub spec_docs: Vec<String>,
    pub decl: Decl,
}

/// Declarations and metadata of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile
{
    pub name: String,
    pub package_doc: String,
    pub imports: Vec<Import>,
    pub decls: Vec<ParsedDecl>,
}

impl ParsedFile
{
    pub fn is_cgo(&self) -> bool
    {
        self.imports
            .iter()
            .any(|i| i.path == "C")
    }
}

pub fn parse_file(src: &SourceText) -> Result<ParsedFile, LoadError>
{
    let parse_err = |message: String| LoadError::Parse { path: src.path.clone(), message };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| parse_err(e.to_string()))?;
    let tree = parser
        .parse(&src.text, None)
        .ok_or_else(|| parse_err("parser returned no tree".into()))?;
    let root = tree.root_node();
    let text = src.text.as_str();

    let mut imports = Vec::new();
    for node in TsNodeUtils::named_children(root)
    {
        if node.kind() == "import_declaration"
        {
            collect_imports(node, text, &mut imports);
        }
    }

    let mut cv = Converter::new(text, &imports);
    let mut file = ParsedFile {
        name: src
            .name
            .clone(),
        package_doc: String::new(),
        imports: Vec::new(),
        decls: Vec::new(),
    };

    for node in TsNodeUtils::named_children(root)
    {
        match node.kind()
        {
            "package_clause" => file.package_doc = doc_comment(node, text),
            "function_declaration" | "method_declaration" =>
            {
                file.decls
                    .push(ParsedDecl {
                        doc: doc_comment(node, text),
                        spec_docs: Vec::new(),
                        decl: Decl::Func(cv.func_decl(node)),
                    });
            }
            "const_declaration" | "var_declaration" | "type_declaration" =>
            {
                let (decl, spec_docs) = cv.gen_decl(node);
                file.decls
                    .push(ParsedDecl { doc: doc_comment(node, text), spec_docs, decl: Decl::Gen(decl) });
            }
            _ =>
            {}
        }
    }
    file.imports = imports;
    Ok(file)
}

fn collect_imports(
    decl: Node,
    src: &str,
    out: &mut Vec<Import>,
)
{
    for child in TsNodeUtils::named_children(decl)
    {
        match child.kind()
        {
            "import_spec" =>
            {
                let Some(path) = TsNodeUtils::field_text(child, "path", src)
                else
                {
                    continue;
                };
                let name = TsNodeUtils::field_text(child, "name", src).map(str::to_owned);
                out.push(Import { name, path: unquote(path).to_owned() });
            }
            "import_spec_list" => collect_imports(child, src, out),
            _ =>
            {}
        }
    }
}

fn unquote(lit: &str) -> &str
{
    lit.trim_matches(|c| c == '"' || c == '`')
}

/// The comment group directly above `node`, with no blank line between and
/// not trailing some earlier code on its first line.
fn doc_comment(
    node: Node,
    src: &str,
) -> String
{
    let mut comments = Vec::new();
    let mut next_row = node
        .start_position()
        .row;
    let mut cur = node.prev_named_sibling();
    while let Some(c) = cur
        && c.kind() == "comment"
        && c.end_position().row + 1 == next_row
    {
        let trailing = c
            .prev_named_sibling()
            .is_some_and(|p| {
                p.kind() != "comment" && p.end_position().row == c.start_position().row
            });
        if trailing
        {
            break;
        }
        comments.push(TsNodeUtils::text(c, src));
        next_row = c
            .start_position()
            .row;
        cur = c.prev_named_sibling();
    }
    comments.reverse();
    CommentText::of(comments)
}

struct Converter<'a>
{
    src: &'a str,
    /// Local package name to import path.
    imports: HashMap<String, String>,
    scopes: Vec<HashSet<String>>,
}

impl<'a> Converter<'a>
{
    fn new(
        src: &'a str,
        imports: &[Import],
    ) -> Self
    {
        let imports = imports
            .iter()
            .filter_map(|i| {
                let name = i.local_name();
                (name != "_" && name != ".").then(|| (name, i.path.clone()))
            })
            .collect();
        Self { src, imports, scopes: Vec::new() }
    }

    fn text(
        &self,
        node: Node,
    ) -> &'a str
    {
        TsNodeUtils::text(node, self.src)
    }

    fn declare(
        &mut self,
        name: &str,
    )
    {
        if name == "_"
        {
            return;
        }
        if let Some(scope) = self
            .scopes
            .last_mut()
        {
            scope.insert(name.to_owned());
        }
    }

    fn resolve(
        &self,
        name: &str,
    ) -> Resolution
    {
        if name == "_"
        {
            return Resolution::Unresolved;
        }
        if self
            .scopes
            .iter()
            .any(|s| s.contains(name))
        {
            return Resolution::Local;
        }
        match self
            .imports
            .get(name)
        {
            Some(path) => Resolution::Import(path.clone()),
            None => Resolution::Unresolved,
        }
    }

    /// A use of a name.
    fn ident(
        &self,
        node: Node,
    ) -> Ident
    {
        let name = self.text(node);
        Ident::new(name)
            .at(TsNodeUtils::pos(node))
            .with_res(self.resolve(name))
    }

    /// A binding site or member name; never resolved.
    fn name(
        &self,
        node: Node,
    ) -> Ident
    {
        Ident::new(self.text(node)).at(TsNodeUtils::pos(node))
    }

    // ---- declarations ----

    fn func_decl(
        &mut self,
        node: Node,
    ) -> FuncDecl
    {
        self.scopes
            .push(HashSet::new());

        let recv_node = node.child_by_field_name("receiver");
        if let Some(recv) = recv_node
        {
            self.declare_params(recv);
            self.declare_receiver_type_params(recv);
        }
        for field in ["type_parameters", "parameters", "result"]
        {
            if let Some(list) = node.child_by_field_name(field)
            {
                self.declare_params(list);
            }
        }

        let recv = recv_node.map(|r| self.field_list(r));
        let name = node
            .child_by_field_name("name")
            .map_or_else(|| Ident::new(""), |n| self.name(n));
        let ty = self.signature(node);
        let body = node
            .child_by_field_name("body")
            .map(|b| self.block(b));

        self.scopes
            .pop();
        FuncDecl { recv, name, ty, body }
    }

    fn declare_params(
        &mut self,
        list: Node,
    )
    {
        if list.kind() != "parameter_list" && list.kind() != "type_parameter_list"
        {
            return;
        }
        for p in TsNodeUtils::named_children(list)
        {
            for n in TsNodeUtils::field_children(p, "name")
            {
                let name = self.text(n);
                self.declare(name);
            }
        }
    }

    /// `T` in `func (l *List[T]) Len()`.
    fn declare_receiver_type_params(
        &mut self,
        recv: Node,
    )
    {
        for p in TsNodeUtils::named_children(recv)
        {
            let Some(mut ty) = p.child_by_field_name("type")
            else
            {
                continue;
            };
            if ty.kind() == "pointer_type"
                && let Some(inner) = TsNodeUtils::named_children(ty).first()
            {
                ty = *inner;
            }
            let Some(args) = ty.child_by_field_name("type_arguments")
            else
            {
                continue;
            };
            for a in TsNodeUtils::named_children(args)
            {
                let name = self
                    .text(a)
                    .trim();
                if name
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_')
                {
                    self.declare(name);
                }
            }
        }
    }

    fn gen_decl(
        &mut self,
        node: Node,
    ) -> (GenDecl, Vec<String>)
    {
        let kind = match node.kind()
        {
            "const_declaration" => GenKind::Const,
            "var_declaration" => GenKind::Var,
            _ => GenKind::Type,
        };

        let mut spec_nodes = Vec::new();
        let mut grouped = TsNodeUtils::has_token(node, "(");
        for child in TsNodeUtils::named_children(node)
        {
            match child.kind()
            {
                "const_spec" | "var_spec" | "type_spec" | "type_alias" => spec_nodes.push(child),
                "var_spec_list" | "type_spec_list" =>
                {
                    grouped = true;
                    spec_nodes.extend(
                        TsNodeUtils::named_children(child)
                            .into_iter()
                            .filter(|c| matches!(c.kind(), "var_spec" | "type_spec" | "type_alias")),
                    );
                }
                _ =>
                {}
            }
        }

        let mut specs = Vec::with_capacity(spec_nodes.len());
        let mut docs = Vec::with_capacity(spec_nodes.len());
        for s in spec_nodes
        {
            docs.push(if grouped { doc_comment(s, self.src) } else { String::new() });
            specs.push(match kind
            {
                GenKind::Type => Spec::Type(self.type_spec(s)),
                GenKind::Const | GenKind::Var => Spec::Value(self.value_spec(s)),
            });
        }
        (GenDecl { kind, specs, grouped }, docs)
    }

    fn value_spec(
        &mut self,
        node: Node,
    ) -> ValueSpec
    {
        let names = TsNodeUtils::field_children(node, "name")
            .into_iter()
            .map(|n| self.name(n))
            .collect();
        let ty = node
            .child_by_field_name("type")
            .map(|t| self.type_expr(t));
        let values = node
            .child_by_field_name("value")
            .map(|list| {
                TsNodeUtils::named_children(list)
                    .into_iter()
                    .map(|e| self.expr(e))
                    .collect()
            })
            .unwrap_or_default();
        ValueSpec { names, ty, values }
    }

    fn type_spec(
        &mut self,
        node: Node,
    ) -> TypeSpec
    {
        self.scopes
            .push(HashSet::new());
        let tp_node = node.child_by_field_name("type_parameters");
        if let Some(tp) = tp_node
        {
            self.declare_params(tp);
        }

        let name = node
            .child_by_field_name("name")
            .map_or_else(|| Ident::new(""), |n| self.name(n));
        let type_params = tp_node.map(|tp| self.field_list(tp));
        let ty = match node.child_by_field_name("type")
        {
            Some(t) => self.type_expr(t),
            None => Expr::Bad(
                self.text(node)
                    .to_owned(),
            ),
        };

        self.scopes
            .pop();
        TypeSpec { name, type_params, assign: node.kind() == "type_alias", ty }
    }

    fn block(
        &mut self,
        node: Node,
    ) -> Block
    {
        let mut stmts = Vec::new();
        self.statements(node, &mut stmts);
        Block { stmts }
    }

    fn statements(
        &mut self,
        node: Node,
        out: &mut Vec<Stmt>,
    )
    {
        for s in TsNodeUtils::named_children(node)
        {
            match s.kind()
            {
                "statement_list" => self.statements(s, out),
                "return_statement" =>
                {
                    let results = TsNodeUtils::named_children(s)
                        .into_iter()
                        .flat_map(|list| {
                            if list.kind() == "expression_list"
                            {
                                TsNodeUtils::named_children(list)
                            }
                            else
                            {
                                vec![list]
                            }
                        })
                        .map(|e| self.expr(e))
                        .collect();
                    out.push(Stmt::Return(results));
                }
                "expression_statement" => match TsNodeUtils::named_children(s).first()
                {
                    Some(e) => out.push(Stmt::Expr(self.expr(*e))),
                    None => out.push(Stmt::Verbatim(
                        self.text(s)
                            .to_owned(),
                    )),
                },
                _ => out.push(Stmt::Verbatim(self.stmt_source(s))),
            }
        }
    }

    /// Statement source with continuation lines made relative to the
    /// indentation of the line the statement starts on.
    fn stmt_source(
        &self,
        node: Node,
    ) -> String
    {
        let before = self
            .src
            .get(..node.start_byte())
            .unwrap_or_default();
        let line = &before[before
            .rfind('\n')
            .map_or(0, |i| i + 1)..];
        let base = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];

        let mut lines = self
            .text(node)
            .split('\n');
        let mut out = lines
            .next()
            .unwrap_or_default()
            .to_owned();
        for l in lines
        {
            out.push('\n');
            out.push_str(l.strip_prefix(base).unwrap_or(l));
        }
        out
    }

    // ---- field lists and signatures ----

    /// Parameter, result, receiver or type parameter list.
    fn field_list(
        &mut self,
        node: Node,
    ) -> FieldList
    {
        let mut list = Vec::new();
        for p in TsNodeUtils::named_children(node)
        {
            let names: Vec<Ident> = TsNodeUtils::field_children(p, "name")
                .into_iter()
                .map(|n| self.name(n))
                .collect();
            let ty = match p.child_by_field_name("type")
            {
                Some(t) => self.type_expr(t),
                None => Expr::Bad(
                    self.text(p)
                        .to_owned(),
                ),
            };
            let ty = if p.kind() == "variadic_parameter_declaration"
            {
                Expr::Ellipsis(Some(Box::new(ty)))
            }
            else
            {
                ty
            };
            list.push(Field::new(names, ty));
        }
        FieldList::new(list)
    }

    fn signature(
        &mut self,
        node: Node,
    ) -> FuncType
    {
        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|tp| self.field_list(tp));
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.field_list(p))
            .unwrap_or_default();
        let results = node
            .child_by_field_name("result")
            .map(|r| {
                if r.kind() == "parameter_list"
                {
                    self.field_list(r)
                }
                else
                {
                    FieldList::new(vec![Field::new(vec![], self.type_expr(r))])
                }
            });
        FuncType { type_params, params, results }
    }

    fn struct_fields(
        &mut self,
        node: Node,
    ) -> FieldList
    {
        let Some(body) = TsNodeUtils::named_children(node)
            .into_iter()
            .find(|c| c.kind() == "field_declaration_list")
        else
        {
            return FieldList::default();
        };

        let mut list = Vec::new();
        for f in TsNodeUtils::named_children(body)
        {
            if f.kind() != "field_declaration"
            {
                continue;
            }
            let names: Vec<Ident> = TsNodeUtils::field_children(f, "name")
                .into_iter()
                .map(|n| self.name(n))
                .collect();
            let mut ty = match f.child_by_field_name("type")
            {
                Some(t) => self.type_expr(t),
                None => Expr::Bad(
                    self.text(f)
                        .to_owned(),
                ),
            };
            // Embedded `*T` keeps its star outside the type field.
            if names.is_empty() && TsNodeUtils::has_token(f, "*")
            {
                ty = Expr::star(ty);
            }
            let tag = f
                .child_by_field_name("tag")
                .map(|t| BasicLit {
                    kind: LitKind::String,
                    value: self
                        .text(t)
                        .to_owned(),
                    pos: TsNodeUtils::pos(t),
                });
            list.push(Field { names, ty, tag });
        }
        FieldList::new(list)
    }

    fn interface_elems(
        &mut self,
        node: Node,
    ) -> FieldList
    {
        let mut list = Vec::new();
        for e in TsNodeUtils::named_children(node)
        {
            match e.kind()
            {
                "method_elem" | "method_spec" =>
                {
                    let name = e
                        .child_by_field_name("name")
                        .map_or_else(|| Ident::new(""), |n| self.name(n));
                    let sig = self.signature(e);
                    list.push(Field::new(vec![name], Expr::FuncType(sig)));
                }
                "method_spec_list" =>
                {
                    let nested = self.interface_elems(e);
                    list.extend(nested.list);
                }
                _ =>
                {
                    let ty = self.type_expr(e);
                    list.push(Field::new(vec![], ty));
                }
            }
        }
        FieldList::new(list)
    }

    // ---- types ----

    fn first_named<'t>(
        &self,
        node: Node<'t>,
    ) -> Option<Node<'t>>
    {
        TsNodeUtils::named_children(node)
            .first()
            .copied()
    }

    fn type_expr(
        &mut self,
        node: Node,
    ) -> Expr
    {
        let boxed = |e: Expr| Box::new(e);
        match node.kind()
        {
            "type_identifier" | "identifier" => Expr::Ident(self.ident(node)),
            "qualified_type" =>
            {
                let (Some(pkg), Some(name)) =
                    (node.child_by_field_name("package"), node.child_by_field_name("name"))
                else
                {
                    return self.bad(node);
                };
                Expr::selector(Expr::Ident(self.ident(pkg)), self.name(name))
            }
            "generic_type" =>
            {
                let Some(base) = node.child_by_field_name("type")
                else
                {
                    return self.bad(node);
                };
                let x = boxed(self.type_expr(base));
                let indices = node
                    .child_by_field_name("type_arguments")
                    .map(|args| {
                        TsNodeUtils::named_children(args)
                            .into_iter()
                            .map(|a| self.type_expr(a))
                            .collect()
                    })
                    .unwrap_or_default();
                Expr::Index { x, indices }
            }
            "pointer_type" => match self.first_named(node)
            {
                Some(inner) => Expr::star(self.type_expr(inner)),
                None => self.bad(node),
            },
            "array_type" =>
            {
                let len = node
                    .child_by_field_name("length")
                    .map(|l| boxed(self.expr(l)));
                let elt = self.element(node);
                Expr::ArrayType { len, elt }
            }
            "implicit_length_array_type" =>
            {
                let elt = self.element(node);
                Expr::ArrayType { len: Some(boxed(Expr::Ellipsis(None))), elt }
            }
            "slice_type" => Expr::ArrayType { len: None, elt: self.element(node) },
            "map_type" =>
            {
                let (Some(k), Some(v)) =
                    (node.child_by_field_name("key"), node.child_by_field_name("value"))
                else
                {
                    return self.bad(node);
                };
                Expr::MapType { key: boxed(self.type_expr(k)), value: boxed(self.type_expr(v)) }
            }
            "channel_type" =>
            {
                let dir = if self
                    .text(node)
                    .starts_with("<-")
                {
                    ChanDir::Recv
                }
                else if TsNodeUtils::has_token(node, "<-")
                {
                    ChanDir::Send
                }
                else
                {
                    ChanDir::Both
                };
                let Some(v) = node.child_by_field_name("value")
                else
                {
                    return self.bad(node);
                };
                match (dir, self.type_expr(v))
                {
                    // `chan<- chan T` parses as `chan (<-chan T)`; the arrow
                    // belongs to the leftmost `chan`.
                    (ChanDir::Both, Expr::ChanType { dir: ChanDir::Recv, value })
                        if self
                            .text(v)
                            .starts_with("<-") =>
                    {
                        Expr::ChanType {
                            dir: ChanDir::Send,
                            value: boxed(Expr::ChanType { dir: ChanDir::Both, value }),
                        }
                    }
                    (dir, value) => Expr::ChanType { dir, value: boxed(value) },
                }
            }
            "function_type" => Expr::FuncType(self.signature(node)),
            "struct_type" => Expr::StructType { fields: self.struct_fields(node), incomplete: false },
            "interface_type" =>
            {
                Expr::InterfaceType { methods: self.interface_elems(node), incomplete: false }
            }
            "parenthesized_type" => match self.first_named(node)
            {
                Some(inner) => Expr::Paren(boxed(self.type_expr(inner))),
                None => self.bad(node),
            },
            "negated_type" => match self.first_named(node)
            {
                Some(inner) => Expr::Unary { op: "~".into(), x: boxed(self.type_expr(inner)) },
                None => self.bad(node),
            },
            "type_elem" | "type_constraint" | "constraint_elem" | "constraint_term" =>
            {
                // `A | B | C` unions fold left.
                let mut terms = TsNodeUtils::named_children(node).into_iter();
                let Some(first) = terms.next()
                else
                {
                    return self.bad(node);
                };
                let mut acc = self.type_expr(first);
                for t in terms
                {
                    acc = Expr::Binary { x: boxed(acc), op: "|".into(), y: boxed(self.type_expr(t)) };
                }
                acc
            }
            "interface_type_name" | "struct_elem" => match self.first_named(node)
            {
                Some(inner) => self.type_expr(inner),
                None => self.bad(node),
            },
            _ => self.expr(node),
        }
    }

    fn element(
        &mut self,
        node: Node,
    ) -> Box<Expr>
    {
        Box::new(match node.child_by_field_name("element")
        {
            Some(e) => self.type_expr(e),
            None => self.bad(node),
        })
    }

    fn bad(
        &self,
        node: Node,
    ) -> Expr
    {
        Expr::Bad(
            self.text(node)
                .to_owned(),
        )
    }

    fn is_type_kind(kind: &str) -> bool
    {
        matches!(
            kind,
            "qualified_type"
                | "generic_type"
                | "pointer_type"
                | "array_type"
                | "implicit_length_array_type"
                | "slice_type"
                | "map_type"
                | "channel_type"
                | "function_type"
                | "struct_type"
                | "interface_type"
                | "parenthesized_type"
                | "negated_type"
                | "type_elem"
                | "type_constraint"
                | "type_identifier"
        )
    }

    // ---- expressions ----

    fn expr(
        &mut self,
        node: Node,
    ) -> Expr
    {
        let boxed = |e: Expr| Box::new(e);
        let field = |name: &str| node.child_by_field_name(name);
        match node.kind()
        {
            "identifier" | "nil" | "true" | "false" | "iota" => Expr::Ident(self.ident(node)),
            "int_literal" => self.lit(node, LitKind::Int),
            "float_literal" => self.lit(node, LitKind::Float),
            "imaginary_literal" => self.lit(node, LitKind::Imag),
            "rune_literal" => self.lit(node, LitKind::Char),
            "interpreted_string_literal" | "raw_string_literal" => self.lit(node, LitKind::String),
            "composite_literal" =>
            {
                let ty = field("type").map(|t| boxed(self.type_expr(t)));
                match field("body")
                {
                    Some(body) => self.literal_value(ty, body),
                    None => self.bad(node),
                }
            }
            "literal_value" => self.literal_value(None, node),
            "func_literal" =>
            {
                self.scopes
                    .push(HashSet::new());
                for f in ["parameters", "result"]
                {
                    if let Some(list) = field(f)
                    {
                        self.declare_params(list);
                    }
                }
                let ty = self.signature(node);
                self.scopes
                    .pop();
                let body = field("body").map_or("{}", |b| self.text(b));
                Expr::FuncLit { ty, body: body.to_owned() }
            }
            "parenthesized_expression" => match self.first_named(node)
            {
                Some(inner) => Expr::Paren(boxed(self.expr(inner))),
                None => self.bad(node),
            },
            "selector_expression" =>
            {
                let (Some(x), Some(sel)) = (field("operand"), field("field"))
                else
                {
                    return self.bad(node);
                };
                Expr::selector(self.expr(x), self.name(sel))
            }
            "index_expression" =>
            {
                let (Some(x), Some(i)) = (field("operand"), field("index"))
                else
                {
                    return self.bad(node);
                };
                Expr::Index { x: boxed(self.expr(x)), indices: vec![self.expr(i)] }
            }
            "type_instantiation_expression" =>
            {
                let Some(base) = field("type")
                else
                {
                    return self.bad(node);
                };
                let x = boxed(self.type_expr(base));
                let indices = TsNodeUtils::named_children(node)
                    .into_iter()
                    .filter(|c| c.id() != base.id())
                    .map(|c| self.type_expr(c))
                    .collect();
                Expr::Index { x, indices }
            }
            "slice_expression" =>
            {
                let Some(x) = field("operand")
                else
                {
                    return self.bad(node);
                };
                Expr::Slice {
                    x: boxed(self.expr(x)),
                    low: field("start").map(|n| boxed(self.expr(n))),
                    high: field("end").map(|n| boxed(self.expr(n))),
                    max: field("capacity").map(|n| boxed(self.expr(n))),
                }
            }
            "type_assertion_expression" =>
            {
                let Some(x) = field("operand")
                else
                {
                    return self.bad(node);
                };
                Expr::TypeAssert {
                    x: boxed(self.expr(x)),
                    ty: field("type").map(|t| boxed(self.type_expr(t))),
                }
            }
            "type_conversion_expression" =>
            {
                let (Some(t), Some(x)) = (field("type"), field("operand"))
                else
                {
                    return self.bad(node);
                };
                Expr::Call { fun: boxed(self.type_expr(t)), args: vec![self.expr(x)], ellipsis: false }
            }
            "call_expression" =>
            {
                let Some(fun) = field("function")
                else
                {
                    return self.bad(node);
                };
                let mut fun = self.expr(fun);
                if let Some(targs) = field("type_arguments")
                {
                    let indices = TsNodeUtils::named_children(targs)
                        .into_iter()
                        .map(|a| self.type_expr(a))
                        .collect();
                    fun = Expr::Index { x: boxed(fun), indices };
                }
                let mut args = Vec::new();
                let mut ellipsis = false;
                if let Some(list) = field("arguments")
                {
                    for a in TsNodeUtils::named_children(list)
                    {
                        if a.kind() == "variadic_argument"
                        {
                            ellipsis = true;
                            if let Some(inner) = self.first_named(a)
                            {
                                args.push(self.expr(inner));
                            }
                        }
                        else
                        {
                            args.push(self.expr(a));
                        }
                    }
                    ellipsis |= TsNodeUtils::has_token(list, "...");
                }
                Expr::Call { fun: boxed(fun), args, ellipsis }
            }
            "unary_expression" =>
            {
                let (Some(op), Some(x)) = (field("operator"), field("operand"))
                else
                {
                    return self.bad(node);
                };
                let op = self.text(op);
                let x = self.expr(x);
                if op == "*"
                {
                    Expr::star(x)
                }
                else
                {
                    Expr::Unary { op: op.to_owned(), x: boxed(x) }
                }
            }
            "binary_expression" =>
            {
                let (Some(x), Some(op), Some(y)) = (field("left"), field("operator"), field("right"))
                else
                {
                    return self.bad(node);
                };
                Expr::Binary {
                    x: boxed(self.expr(x)),
                    op: self
                        .text(op)
                        .to_owned(),
                    y: boxed(self.expr(y)),
                }
            }
            "ERROR" => self.bad(node),
            kind if Self::is_type_kind(kind) => self.type_expr(node),
            _ => Expr::Verbatim(
                self.text(node)
                    .to_owned(),
            ),
        }
    }

    fn lit(
        &self,
        node: Node,
        kind: LitKind,
    ) -> Expr
    {
        Expr::BasicLit(BasicLit {
            kind,
            value: self
                .text(node)
                .to_owned(),
            pos: TsNodeUtils::pos(node),
        })
    }

    fn literal_value(
        &mut self,
        ty: Option<Box<Expr>>,
        body: Node,
    ) -> Expr
    {
        let mut elts = Vec::new();
        for e in TsNodeUtils::named_children(body)
        {
            if e.kind() == "keyed_element"
            {
                let parts = TsNodeUtils::named_children(e);
                let (Some(k), Some(v)) = (parts.first(), parts.get(1))
                else
                {
                    elts.push(self.bad(e));
                    continue;
                };
                let key = self.key(*k);
                let value = self.element_value(*v);
                elts.push(Expr::KeyValue { key: Box::new(key), value: Box::new(value) });
            }
            else
            {
                let value = self.element_value(e);
                elts.push(value);
            }
        }

        let close = body
            .child(
                body.child_count()
                    .saturating_sub(1),
            )
            .map_or(Pos::NONE, TsNodeUtils::pos);
        Expr::CompositeLit { ty, elts, lbrace: TsNodeUtils::pos(body), rbrace: close }
    }

    fn element_value(
        &mut self,
        node: Node,
    ) -> Expr
    {
        if node.kind() == "literal_element"
        {
            return match self.first_named(node)
            {
                Some(inner) => self.element_value(inner),
                None => self.bad(node),
            };
        }
        self.expr(node)
    }

    /// Bare identifier keys name struct fields and stay unresolved.
    fn key(
        &mut self,
        node: Node,
    ) -> Expr
    {
        let inner = if node.kind() == "literal_element"
        {
            self.first_named(node)
                .unwrap_or(node)
        }
        else
        {
            node
        };
        match inner.kind()
        {
            "identifier" | "field_identifier" => Expr::Ident(self.name(inner)),
            _ => self.element_value(inner),
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::path::PathBuf;

    use super::*;

    fn parse(text: &str) -> ParsedFile
    {
        parse_file(&SourceText {
            name: "a.go".into(),
            path: PathBuf::from("/src/p/a.go"),
            text: text.into(),
        })
        .expect("parse")
    }

    fn only_func(f: &ParsedFile) -> &FuncDecl
    {
        match &f.decls[0].decl
        {
            Decl::Func(func) => func,
            other => panic!("expected a function, got {other:?}"),
        }
    }

    #[test]
    fn docs_attach_to_the_following_declaration()
    {
        let f = parse(
            "// Copyright header.\n\n// Package p is small.\npackage p\n\n// Answer is 42.\n\
             const Answer = 42\n\nvar x = 1 // trailing\nvar Y = 2\n",
        );
        assert_eq!(f.package_doc, "Package p is small.\n");
        assert_eq!(f.decls[0].doc, "Answer is 42.\n");
        assert_eq!(f.decls[1].doc, "");
        assert_eq!(f.decls[2].doc, "");
    }

    #[test]
    fn parameters_are_local_and_imports_resolve()
    {
        let f = parse(
            "package p\n\nimport (\n\tstdio \"io\"\n\t\"net/http\"\n)\n\n\
             func Copy(dst stdio.Writer, h http.Handler) (n int) { return n }\n",
        );
        let func = only_func(&f);
        assert_eq!(func.name.name, "Copy");
        assert_eq!(func.name.pos.line, 8);

        let dst = &func.ty.params.list[0];
        assert_eq!(dst.names[0].name, "dst");
        let Expr::Selector { x, sel } = &dst.ty
        else
        {
            panic!("expected selector, got {:?}", dst.ty);
        };
        assert!(matches!(&**x, Expr::Ident(id) if id.res == Resolution::Import("io".into())));
        assert_eq!(sel.name, "Writer");

        let Expr::Selector { x, .. } = &func.ty.params.list[1].ty
        else
        {
            panic!("expected selector");
        };
        assert!(matches!(&**x, Expr::Ident(id) if id.res == Resolution::Import("net/http".into())));

        let body = func
            .body
            .as_ref()
            .expect("body");
        assert!(matches!(&body.stmts[..], [Stmt::Return(r)]
            if matches!(&r[..], [Expr::Ident(id)] if id.res == Resolution::Local)));
    }

    #[test]
    fn methods_keep_receivers_and_type_parameters()
    {
        let f = parse("package p\n\nfunc (l *List[T]) Push(v T) {}\n");
        let func = only_func(&f);
        let recv = func
            .recv
            .as_ref()
            .expect("receiver");
        assert_eq!(func.receiver_type(), Some("List"));
        assert_eq!(recv.list[0].names[0].name, "l");

        let v = &func.ty.params.list[0];
        assert!(matches!(&v.ty, Expr::Ident(id) if id.name == "T" && id.res == Resolution::Local));
    }

    #[test]
    fn grouped_types_keep_spec_docs()
    {
        let f = parse(
            "package p\n\n// Group doc.\ntype (\n\t// A doc.\n\tA int\n\tB = string\n)\n",
        );
        let d = &f.decls[0];
        assert_eq!(d.doc, "Group doc.\n");
        assert_eq!(d.spec_docs, ["A doc.\n", ""]);
        let Decl::Gen(g) = &d.decl
        else
        {
            panic!("expected a type group");
        };
        assert!(g.grouped);
        assert!(matches!(&g.specs[1], Spec::Type(t) if t.assign && t.name.name == "B"));
    }

    #[test]
    fn struct_fields_keep_tags_and_embedded_pointers()
    {
        let f = parse(
            "package p\n\ntype S struct {\n\t*Base\n\tName string `json:\"name\"`\n\tx, y int\n}\n",
        );
        let Decl::Gen(g) = &f.decls[0].decl
        else
        {
            panic!("expected a type");
        };
        let Spec::Type(t) = &g.specs[0]
        else
        {
            panic!("expected a type spec");
        };
        let Expr::StructType { fields, .. } = &t.ty
        else
        {
            panic!("expected a struct");
        };
        assert!(matches!(&fields.list[0].ty, Expr::Star(x) if matches!(&**x, Expr::Ident(id) if id.name == "Base")));
        assert_eq!(
            fields.list[1]
                .tag
                .as_ref()
                .map(|t| t.value.as_str()),
            Some("`json:\"name\"`")
        );
        assert_eq!(fields.list[2].names.len(), 2);
    }

    #[test]
    fn composite_literal_keys_stay_unresolved()
    {
        let f = parse("package p\n\nimport \"io\"\n\nvar V = T{io: 1, K: io.EOF}\n");
        let Decl::Gen(g) = &f.decls[0].decl
        else
        {
            panic!("expected a var");
        };
        let Spec::Value(v) = &g.specs[0]
        else
        {
            panic!("expected a value spec");
        };
        let Expr::CompositeLit { elts, .. } = &v.values[0]
        else
        {
            panic!("expected a composite literal, got {:?}", v.values[0]);
        };
        let Expr::KeyValue { key, .. } = &elts[0]
        else
        {
            panic!("expected a keyed element");
        };
        assert!(matches!(&**key, Expr::Ident(id) if id.name == "io" && id.res == Resolution::Unresolved));
    }

    fn print_first(f: &ParsedFile) -> String
    {
        use crate::syntax::printer::{DeclPrinter, GoPrinter};

        GoPrinter::default()
            .print(&f.decls[0].decl, &[])
            .expect("print")
    }

    #[test]
    fn send_arrow_binds_to_the_outer_channel()
    {
        let f = parse("package p\n\nvar Ch chan<- chan int\n");
        assert_eq!(print_first(&f), "var Ch chan<- chan int");

        let f = parse("package p\n\nvar R <-chan chan<- int\n");
        assert_eq!(print_first(&f), "var R <-chan chan<- int");

        let f = parse("package p\n\nvar B chan (<-chan int)\n");
        assert_eq!(print_first(&f), "var B chan (<-chan int)");
    }

    #[test]
    fn kept_statements_are_reindented()
    {
        let f = parse("package p\n\nfunc F(r *int) {\n\tif r == nil {\n\t\treturn\n\t}\n}\n");
        let body = only_func(&f)
            .body
            .as_ref()
            .expect("body");
        assert_eq!(body.stmts, [Stmt::Verbatim("if r == nil {\n\treturn\n}".into())]);
        assert_eq!(print_first(&f), "func F(r *int) {\n    if r == nil {\n        return\n    }\n}");
    }

    #[test]
    fn cgo_files_are_detected()
    {
        let f = parse("package p\n\n// #include <stdio.h>\nimport \"C\"\n");
        assert!(f.is_cgo());
        assert_eq!(f.imports[0].local_name(), "C");
    }
}
