//! Go package loading.
//!
//! A [`PackageLoader`] turns an import path into a read-only [`Package`]:
//! the documentation model the renderer walks. [`GoLoader`] is the default
//! implementation, built on tree-sitter-go.

use std::path::PathBuf;

use crate::syntax::ast::Decl;

pub mod assemble;
pub mod context;
pub mod convert;

pub use context::{BuildContext, FileSet};

/// A declaration together with its documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclDoc
{
    /// Doc comment text with comment markers stripped.
    pub doc: String,
    /// Name of the source file, relative to the package directory.
    pub file: String,
    pub decl: Decl,
}

impl DeclDoc
{
    pub fn name(&self) -> &str
    {
        self.decl
            .name()
    }
}

/// A type declaration plus everything associated with it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDoc
{
    pub decl: DeclDoc,
    pub consts: Vec<DeclDoc>,
    pub vars: Vec<DeclDoc>,
    /// Constructors: functions returning exactly one package type, this one.
    pub funcs: Vec<DeclDoc>,
    pub methods: Vec<DeclDoc>,
}

impl TypeDoc
{
    pub fn new(decl: DeclDoc) -> Self
    {
        Self { decl, consts: Vec::new(), vars: Vec::new(), funcs: Vec::new(), methods: Vec::new() }
    }

    pub fn name(&self) -> &str
    {
        self.decl
            .name()
    }
}

/// File names of a package grouped by role, each group sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFiles
{
    pub go: Vec<String>,
    /// Files importing "C".
    pub cgo: Vec<String>,
    /// `_test.go` files in the package itself.
    pub test: Vec<String>,
    /// `_test.go` files in the external `<name>_test` package.
    pub xtest: Vec<String>,
}

/// Documentation model of one package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package
{
    pub name: String,
    pub import_path: String,
    pub doc: String,
    pub dir: PathBuf,
    pub files: SourceFiles,
    /// Sorted, de-duplicated imports of the non-test files.
    pub imports: Vec<String>,
    pub consts: Vec<DeclDoc>,
    pub vars: Vec<DeclDoc>,
    pub funcs: Vec<DeclDoc>,
    pub types: Vec<TypeDoc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError
{
    #[error("cannot find package \"{0}\"")]
    NotFound(String),

    #[error("no buildable Go source files in {}", .0.display())]
    NoGoFiles(PathBuf),

    #[error("found packages {first} and {second} in {}", dir.display())]
    MultiplePackages
    {
        first: String,
        second: String,
        dir: PathBuf,
    },

    #[error("cannot read {}", path.display())]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {message}", path.display())]
    Parse
    {
        path: PathBuf,
        message: String,
    },
}

/// Resolves and loads packages by import path.
pub trait PackageLoader: Send + Sync
{
    fn load(
        &self,
        import_path: &str,
    ) -> Result<Package, LoadError>;
}

/// Loader options that change the shape of the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions
{
    /// Keep function bodies instead of dropping them.
    pub preserve_bodies: bool,
}

/// Default loader: file-system lookup plus tree-sitter-go parsing.
#[derive(Debug, Clone)]
pub struct GoLoader
{
    ctx: BuildContext,
    options: LoadOptions,
}

impl GoLoader
{
    pub fn new(
        ctx: BuildContext,
        options: LoadOptions,
    ) -> Self
    {
        Self { ctx, options }
    }
}

impl PackageLoader for GoLoader
{
    #[tracing::instrument(level = "debug", skip(self))]
    fn load(
        &self,
        import_path: &str,
    ) -> Result<Package, LoadError>
    {
        let (import_path, dir) = self
            .ctx
            .find(import_path)?;
        let set = self
            .ctx
            .scan(&dir)?;

        let parsed = set
            .sources
            .iter()
            .map(convert::parse_file)
            .collect::<Result<Vec<_>, _>>()?;

        let all_decls = import_path == "builtin";
        Ok(assemble::assemble(
            assemble::Input {
                import_path,
                dir,
                package: set.package,
                parsed,
                test: set.test,
                xtest: set.xtest,
            },
            assemble::Mode { all_decls, preserve_bodies: self.options.preserve_bodies },
        ))
    }
}
