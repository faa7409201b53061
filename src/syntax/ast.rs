//! Declaration-level Go syntax tree.
//!
//! The loader builds these nodes from tree-sitter output; the classifier
//! walks (and redacts) them and the printer turns them back into text.
//! Only what documentation needs is modeled: function bodies and other
//! constructs the loader does not care about are kept as raw source in
//! [`Expr::Verbatim`] / [`Stmt::Verbatim`].

/// Source position of a node: byte offset plus 1-based line and column.
///
/// Synthetic nodes use [`Pos::NONE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pos
{
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Pos
{
    pub const NONE: Pos = Pos { offset: 0, line: 0, column: 0 };

    pub fn new(
        offset: u32,
        line: u32,
        column: u32,
    ) -> Self
    {
        Self { offset, line, column }
    }

    /// True for positions that came from a real source file.
    pub fn is_valid(&self) -> bool
    {
        self.line > 0
    }
}

/// What an identifier occurrence refers to, as far as the loader could tell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolution
{
    /// Not declared in any enclosing scope (predeclared or unknown).
    #[default]
    Unresolved,

    /// Parameter, result, receiver or type parameter.
    Local,

    /// Declared at package level.
    Package,

    /// Name of an imported package; carries the import path.
    Import(String),
}

impl Resolution
{
    pub fn is_bound(&self) -> bool
    {
        !matches!(self, Resolution::Unresolved)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident
{
    pub name: String,
    pub pos: Pos,
    pub res: Resolution,
}

impl Ident
{
    /// Unresolved identifier without a source position.
    pub fn new(name: impl Into<String>) -> Self
    {
        Self { name: name.into(), pos: Pos::NONE, res: Resolution::Unresolved }
    }

    pub fn with_res(
        mut self,
        res: Resolution,
    ) -> Self
    {
        self.res = res;
        self
    }

    pub fn at(
        mut self,
        pos: Pos,
    ) -> Self
    {
        self.pos = pos;
        self
    }

    /// Byte offset one past the identifier in its source file.
    pub fn end_offset(&self) -> u32
    {
        self.pos.offset + self.name.len() as u32
    }

    pub fn is_exported(&self) -> bool
    {
        is_exported(&self.name)
    }
}

/// Go export rule: the first character is an upper-case letter.
pub fn is_exported(name: &str) -> bool
{
    name.chars()
        .next()
        .is_some_and(char::is_uppercase)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind
{
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// A literal token; `value` is the source spelling including quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit
{
    pub kind: LitKind,
    pub value: String,
    pub pos: Pos,
}

impl BasicLit
{
    pub fn new(
        kind: LitKind,
        value: impl Into<String>,
    ) -> Self
    {
        Self { kind, value: value.into(), pos: Pos::NONE }
    }
}

/// One entry of a parameter list, struct body or interface body.
///
/// Embedded fields and unnamed parameters have no names. Interface methods
/// are a single name with a [`Expr::FuncType`] type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field
{
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

impl Field
{
    pub fn new(
        names: Vec<Ident>,
        ty: Expr,
    ) -> Self
    {
        Self { names, ty, tag: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList
{
    pub list: Vec<Field>,
}

impl FieldList
{
    pub fn new(list: Vec<Field>) -> Self
    {
        Self { list }
    }

    pub fn is_empty(&self) -> bool
    {
        self.list
            .is_empty()
    }

    /// Number of declared entries, counting each name separately.
    pub fn num_fields(&self) -> usize
    {
        self.list
            .iter()
            .map(|f| f.names.len().max(1))
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncType
{
    pub type_params: Option<FieldList>,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir
{
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr
{
    Ident(Ident),
    BasicLit(BasicLit),
    /// `rbrace` lets the printer keep multi-line literals multi-line.
    CompositeLit
    {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
        lbrace: Pos,
        rbrace: Pos,
    },
    /// Function literal; the body block is kept as raw source.
    FuncLit
    {
        ty: FuncType,
        body: String,
    },
    Paren(Box<Expr>),
    Selector
    {
        x: Box<Expr>,
        sel: Ident,
    },
    Index
    {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice
    {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is `None` for `x.(type)`.
    TypeAssert
    {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call
    {
        fun: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    Star(Box<Expr>),
    Unary
    {
        op: String,
        x: Box<Expr>,
    },
    Binary
    {
        x: Box<Expr>,
        op: String,
        y: Box<Expr>,
    },
    KeyValue
    {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    /// `[N]T`, `[...]T` (len is `Ellipsis(None)`) or `[]T` (no len).
    ArrayType
    {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    /// `...T` in a variadic parameter, or a bare `...` array length.
    Ellipsis(Option<Box<Expr>>),
    StructType
    {
        fields: FieldList,
        incomplete: bool,
    },
    FuncType(FuncType),
    InterfaceType
    {
        methods: FieldList,
        incomplete: bool,
    },
    MapType
    {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType
    {
        dir: ChanDir,
        value: Box<Expr>,
    },
    /// Raw source the loader kept as-is.
    Verbatim(String),
    /// Source that failed to parse; printing it is an error.
    Bad(String),
}

impl Expr
{
    pub fn ident(name: impl Into<String>) -> Self
    {
        Expr::Ident(Ident::new(name))
    }

    /// Identifier bound to a package-level declaration.
    pub fn decl_ref(name: impl Into<String>) -> Self
    {
        Expr::Ident(Ident::new(name).with_res(Resolution::Package))
    }

    pub fn selector(
        x: Expr,
        sel: Ident,
    ) -> Self
    {
        Expr::Selector { x: Box::new(x), sel }
    }

    pub fn star(x: Expr) -> Self
    {
        Expr::Star(Box::new(x))
    }

    pub fn string_lit(value: impl Into<String>) -> Self
    {
        Expr::BasicLit(BasicLit::new(LitKind::String, value))
    }

    pub fn int_lit(value: impl Into<String>) -> Self
    {
        Expr::BasicLit(BasicLit::new(LitKind::Int, value))
    }

    pub fn slice_of(elt: Expr) -> Self
    {
        Expr::ArrayType { len: None, elt: Box::new(elt) }
    }

    /// Name of the type this expression denotes after stripping pointers,
    /// parentheses and type arguments; `None` for anything else.
    pub fn base_type_name(&self) -> Option<&str>
    {
        match self
        {
            Expr::Ident(id) => Some(&id.name),
            Expr::Star(x) | Expr::Paren(x) => x.base_type_name(),
            Expr::Index { x, .. } => x.base_type_name(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec
{
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec
{
    pub name: Ident,
    pub type_params: Option<FieldList>,
    /// `type A = B` alias form.
    pub assign: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec
{
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind
{
    Const,
    Var,
    Type,
}

impl GenKind
{
    pub fn keyword(self) -> &'static str
    {
        match self
        {
            GenKind::Const => "const",
            GenKind::Var => "var",
            GenKind::Type => "type",
        }
    }
}

/// `const`, `var` or `type` declaration; `grouped` is the parenthesized form.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl
{
    pub kind: GenKind,
    pub specs: Vec<Spec>,
    pub grouped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt
{
    Return(Vec<Expr>),
    Expr(Expr),
    Verbatim(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block
{
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl
{
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    pub body: Option<Block>,
}

impl FuncDecl
{
    /// Base type name of the receiver, for methods.
    pub fn receiver_type(&self) -> Option<&str>
    {
        self.recv
            .as_ref()?
            .list
            .first()?
            .ty
            .base_type_name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl
{
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl
{
    /// Declared name used for sorting; the first name of the first spec for
    /// generic declarations.
    pub fn name(&self) -> &str
    {
        match self
        {
            Decl::Func(f) => &f.name.name,
            Decl::Gen(g) => match g.specs.first()
            {
                Some(Spec::Type(t)) => &t.name.name,
                Some(Spec::Value(v)) => v
                    .names
                    .first()
                    .map_or("", |n| n.name.as_str()),
                None => "",
            },
        }
    }
}
