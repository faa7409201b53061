//! Package rendering: text plus out-of-band navigation metadata.
//!
//! A render owns its [`Sink`] (text buffer, metadata stream, position
//! tracker and string table), so independent packages can be rendered in
//! parallel. Nothing reaches the caller until [`PackageRenderer::render`]
//! returns a complete [`Rendered`].

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use tracing::{debug, info, instrument};

use crate::{
    core::{
        classify::Limits,
        meta::{Coord, Metadata, Record},
        position::PositionTracker,
    },
    loader::{DeclDoc, Package},
    syntax::printer::DeclPrinter,
};

pub mod decl;
pub mod text;

pub use decl::DeclContext;

/// Layout knobs for a package render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions
{
    pub limits: Limits,
    /// Columns of indentation for doc text and listings.
    pub indent: usize,
    /// Wrap width of doc paragraphs and the file listing.
    pub text_width: usize,
    pub show_files: bool,
    pub show_subdirectories: bool,
}

impl Default for RenderOptions
{
    fn default() -> Self
    {
        Self {
            limits: Limits::default(),
            indent: 4,
            text_width: 76,
            show_files: true,
            show_subdirectories: true,
        }
    }
}

/// Append-only output of one render.
#[derive(Debug, Default)]
pub struct Sink
{
    text: String,
    meta: Metadata,
    tracker: PositionTracker,
}

impl Sink
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn write(
        &mut self,
        s: &str,
    )
    {
        self.text
            .push_str(s);
    }

    pub fn position(&mut self) -> Coord
    {
        self.tracker
            .position(&self.text)
    }

    pub fn adjusted_position(&mut self) -> Coord
    {
        self.tracker
            .adjusted_position(&self.text)
    }

    pub fn meta(&mut self) -> &mut Metadata
    {
        &mut self.meta
    }

    /// Write `s` as a link to `document`.
    pub fn linked(
        &mut self,
        s: &str,
        document: &str,
    )
    {
        let start = self.position();
        self.write(s);
        let end = self.position();
        self.meta
            .link(start, end, document, None);
    }

    pub fn finish(self) -> Rendered
    {
        Rendered { records: self.meta.into_records(), text: self.text }
    }
}

/// A finished render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered
{
    pub records: Vec<Record>,
    pub text: String,
}

impl Rendered
{
    /// Metadata lines, the `D` separator, then the text.
    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
    ) -> io::Result<()>
    {
        for r in &self.records
        {
            writeln!(w, "{r}")?;
        }
        writeln!(w, "D")?;
        w.write_all(
            self.text
                .as_bytes(),
        )
    }
}

/// Functions and methods of every type hoisted into the function list,
/// sorted by name. Used for the `builtin` pseudo-package, whose intrinsic
/// operations are otherwise orphaned under their types.
pub fn flatten_builtin(pkg: &Package) -> Vec<&DeclDoc>
{
    let mut funcs: Vec<&DeclDoc> = pkg
        .funcs
        .iter()
        .chain(
            pkg.types
                .iter()
                .flat_map(|t| {
                    t.funcs
                        .iter()
                        .chain(&t.methods)
                }),
        )
        .collect();
    funcs.sort_by(|a, b| {
        a.name()
            .cmp(b.name())
    });
    funcs
}

pub struct PackageRenderer<'a>
{
    pkg: &'a Package,
    cx: DeclContext<'a>,
    opts: &'a RenderOptions,
    indent: String,
    sink: Sink,
}

impl<'a> PackageRenderer<'a>
{
    #[instrument(skip_all, fields(path = %pkg.import_path))]
    pub fn render(
        pkg: &'a Package,
        printer: &'a dyn DeclPrinter,
        opts: &'a RenderOptions,
    ) -> Rendered
    {
        let mut r = Self {
            pkg,
            cx: DeclContext { printer, limits: opts.limits, dir: &pkg.dir },
            opts,
            indent: " ".repeat(opts.indent),
            sink: Sink::new(),
        };
        r.package();

        let rendered = r
            .sink
            .finish();
        info!(records = rendered.records.len(), bytes = rendered.text.len(), "rendered package");
        rendered
    }

    fn package(&mut self)
    {
        let pkg = self.pkg;
        self.sink
            .write(&format!("package {}\n\n", pkg.name));
        self.sink
            .write(&format!("{}import \"{}\"\n\n", self.indent, pkg.import_path));
        self.doc(&pkg.doc);

        if self
            .opts
            .show_files
        {
            self.files();
        }

        let builtin = pkg.import_path == "builtin";
        let funcs: Vec<&DeclDoc> = if builtin
        {
            flatten_builtin(pkg)
        }
        else
        {
            pkg.funcs
                .iter()
                .collect()
        };

        self.section("CONSTANTS", &pkg.consts);
        self.section("VARIABLES", &pkg.vars);
        self.section("FUNCTIONS", funcs);

        self.head("TYPES", pkg.types.len());
        for t in &pkg.types
        {
            self.decl(&t.decl);
            self.decls(&t.consts);
            self.decls(&t.vars);
            if !builtin
            {
                self.decls(&t.funcs);
                self.decls(&t.methods);
            }
        }

        self.imports();
        if self
            .opts
            .show_subdirectories
        {
            self.subdirectories();
        }
    }

    fn head(
        &mut self,
        title: &str,
        n: usize,
    )
    {
        if n > 0
        {
            self.sink
                .write(&format!("{title}\n\n"));
        }
    }

    fn section<'d>(
        &mut self,
        title: &str,
        list: impl IntoIterator<Item = &'d DeclDoc>,
    )
    {
        let list: Vec<&DeclDoc> = list
            .into_iter()
            .collect();
        self.head(title, list.len());
        self.decls(list);
    }

    fn decls<'d>(
        &mut self,
        list: impl IntoIterator<Item = &'d DeclDoc>,
    )
    {
        for d in list
        {
            self.decl(d);
        }
    }

    fn decl(
        &mut self,
        d: &DeclDoc,
    )
    {
        decl::render(&mut self.sink, &self.cx, &d.decl, &d.file);
        self.doc(&d.doc);
    }

    fn doc(
        &mut self,
        s: &str,
    )
    {
        let s = s.trim_end_matches([' ', '\t', '\n']);
        if s.is_empty()
        {
            return;
        }
        let pre_indent = format!("{}   ", self.indent);
        let mut out = String::new();
        text::to_text(&mut out, s, &self.indent, &pre_indent, self.opts.text_width);
        if !out.ends_with('\n')
        {
            out.push('\n');
        }
        out.push('\n');
        self.sink
            .write(&out);
    }

    fn files(&mut self)
    {
        let files = &self
            .pkg
            .files;
        if files.go.is_empty()
            && files.cgo.is_empty()
            && files.test.is_empty()
            && files.xtest.is_empty()
        {
            return;
        }
        self.sink
            .write("FILES\n");
        self.file_group([&files.go, &files.cgo]);
        self.file_group([&files.test, &files.xtest]);
        self.sink
            .write("\n");
    }

    /// One flowed line group of file names, each linked to its path.
    fn file_group(
        &mut self,
        sets: [&Vec<String>; 2],
    )
    {
        let mut names: Vec<&str> = sets
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if names.is_empty()
        {
            return;
        }
        names.sort_unstable();

        let width = self
            .opts
            .text_width;
        let mut col = 0;
        self.sink
            .write("\n");
        self.sink
            .write(&self.indent);
        for name in names
        {
            let n = name
                .chars()
                .count();
            if col != 0
            {
                if col + n + 3 > width
                {
                    col = 0;
                    self.sink
                        .write("\n");
                    self.sink
                        .write(&self.indent);
                }
                else
                {
                    col += 1;
                    self.sink
                        .write(" ");
                }
            }
            let path = source_path(&self.pkg.dir, name);
            self.sink
                .linked(name, &path);
            col += n + 2;
        }
        self.sink
            .write("\n");
    }

    fn imports(&mut self)
    {
        let imports = &self
            .pkg
            .imports;
        if imports.is_empty()
        {
            return;
        }
        self.sink
            .write("IMPORTS\n\n");
        for imp in imports
        {
            self.sink
                .write(&self.indent);
            self.sink
                .linked(imp, &format!("godoc://{imp}"));
            self.sink
                .write("\n");
        }
        self.sink
            .write("\n");
    }

    fn subdirectories(&mut self)
    {
        let names = match list_subdirectories(&self.pkg.dir)
        {
            Ok(names) => names,
            Err(e) =>
            {
                debug!(dir = %self.pkg.dir.display(), error = %e, "cannot list subdirectories");
                return;
            }
        };
        if names.is_empty()
        {
            return;
        }
        self.sink
            .write("SUBDIRECTORIES\n\n");
        for name in names
        {
            let target = format!("godoc://{}/{name}", self.pkg.import_path);
            self.sink
                .write(&self.indent);
            self.sink
                .linked(&name, &target);
            self.sink
                .write("\n");
        }
        self.sink
            .write("\n");
    }
}

/// `dir/file` as written into source-jump records.
pub fn source_path(
    dir: &Path,
    file: &str,
) -> String
{
    dir.join(file)
        .display()
        .to_string()
}

fn list_subdirectories(dir: &Path) -> io::Result<Vec<String>>
{
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)?
    {
        let entry = entry?;
        if !entry
            .file_type()?
            .is_dir()
        {
            continue;
        }
        let name = entry
            .file_name()
            .to_string_lossy()
            .into_owned();
        if !name.starts_with('.')
        {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{
        loader::{SourceFiles, TypeDoc},
        syntax::{
            ast::{
                Decl, Expr, FieldList, FuncDecl, FuncType, GenDecl, GenKind, Ident, Spec, TypeSpec,
            },
            printer::GoPrinter,
        },
    };

    fn func(
        name: &str,
        recv: Option<&str>,
    ) -> DeclDoc
    {
        DeclDoc {
            doc: String::new(),
            file: "builtin.go".into(),
            decl: Decl::Func(FuncDecl {
                recv: recv.map(|r| {
                    FieldList::new(vec![crate::syntax::ast::Field::new(
                        vec![],
                        Expr::decl_ref(r),
                    )])
                }),
                name: Ident::new(name),
                ty: FuncType::default(),
                body: None,
            }),
        }
    }

    fn type_doc(name: &str) -> TypeDoc
    {
        TypeDoc::new(DeclDoc {
            doc: String::new(),
            file: "builtin.go".into(),
            decl: Decl::Gen(GenDecl {
                kind: GenKind::Type,
                specs: vec![Spec::Type(TypeSpec {
                    name: Ident::new(name),
                    type_params: None,
                    assign: false,
                    ty: Expr::ident("int"),
                })],
                grouped: false,
            }),
        })
    }

    fn builtin_package() -> Package
    {
        let mut t = type_doc("T");
        t.methods
            .push(func("M", Some("T")));
        let mut u = type_doc("U");
        u.funcs
            .push(func("F", None));
        Package {
            name: "builtin".into(),
            import_path: "builtin".into(),
            types: vec![t, u],
            ..Package::default()
        }
    }

    #[test]
    fn builtin_functions_are_flattened_and_sorted()
    {
        let pkg = builtin_package();
        let names: Vec<&str> = flatten_builtin(&pkg)
            .into_iter()
            .map(DeclDoc::name)
            .collect();
        assert_eq!(names, ["F", "M"]);
    }

    #[test]
    fn builtin_types_render_without_nested_functions()
    {
        let pkg = builtin_package();
        let opts = RenderOptions { show_subdirectories: false, ..RenderOptions::default() };
        let out = PackageRenderer::render(&pkg, &GoPrinter::default(), &opts);

        assert_eq!(
            out.text,
            "package builtin\n\n    import \"builtin\"\n\nFUNCTIONS\n\nfunc F()\n\nfunc (T) M()\n\n\
             TYPES\n\ntype T int\n\ntype U int\n\n"
        );
    }

    #[test]
    fn sections_are_omitted_when_empty()
    {
        let pkg = Package {
            name: "empty".into(),
            import_path: "example.com/empty".into(),
            doc: "Package empty has nothing.\n".into(),
            ..Package::default()
        };
        let opts = RenderOptions { show_subdirectories: false, ..RenderOptions::default() };
        let out = PackageRenderer::render(&pkg, &GoPrinter::default(), &opts);

        assert_eq!(
            out.text,
            "package empty\n\n    import \"example.com/empty\"\n\n    Package empty has nothing.\n\n"
        );
        assert!(out.records.is_empty());
    }

    #[test]
    fn files_and_imports_are_linked()
    {
        let pkg = Package {
            name: "p".into(),
            import_path: "example.com/p".into(),
            dir: "/src/p".into(),
            files: SourceFiles {
                go: vec!["b.go".into(), "a.go".into()],
                test: vec!["a_test.go".into()],
                ..SourceFiles::default()
            },
            imports: vec!["io".into()],
            ..Package::default()
        };
        let opts = RenderOptions { show_subdirectories: false, ..RenderOptions::default() };
        let out = PackageRenderer::render(&pkg, &GoPrinter::default(), &opts);

        assert!(
            out.text
                .contains("FILES\n\n    a.go b.go\n\n    a_test.go\n\nIMPORTS\n\n    io\n\n")
        );
        let lines: Vec<String> = out
            .records
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            [
                "S /src/p/a.go",
                "L 7:4 7:8 0",
                "S /src/p/b.go",
                "L 7:9 7:13 1",
                "S /src/p/a_test.go",
                "L 9:4 9:13 2",
                "S godoc://io",
                "L 13:4 13:6 3",
            ]
        );
    }

    #[test]
    fn subdirectories_skip_hidden_entries()
    {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["zeta", "alpha", ".git"]
        {
            fs::create_dir(
                dir.path()
                    .join(name),
            )
            .expect("mkdir");
        }
        fs::write(
            dir.path()
                .join("x.go"),
            "package x\n",
        )
        .expect("write");

        let pkg = Package {
            name: "x".into(),
            import_path: "example.com/x".into(),
            dir: dir
                .path()
                .to_path_buf(),
            ..Package::default()
        };
        let out = PackageRenderer::render(&pkg, &GoPrinter::default(), &RenderOptions::default());

        assert!(
            out.text
                .ends_with("SUBDIRECTORIES\n\n    alpha\n    zeta\n\n")
        );
        assert!(
            out.records
                .contains(&Record::Define("godoc://example.com/x/alpha".into()))
        );
    }

    #[test]
    fn write_to_frames_metadata_before_text()
    {
        let rendered = Rendered {
            records: vec![Record::Define("godoc://io".into())],
            text: "package p\n".into(),
        };
        let mut buf = Vec::new();
        rendered
            .write_to(&mut buf)
            .expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "S godoc://io\nD\npackage p\n");
    }
}
