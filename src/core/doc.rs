//! The `doc` command: load, render and emit packages.
//!
//! Every package is loaded before anything is written, so a failing import
//! path produces no partial output. Loads and renders run on the rayon pool;
//! output keeps argument order.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

use crate::{
    cli::{AppContext, DocArgs},
    core::render::{PackageRenderer, RenderOptions, Rendered},
    infra::config::load_config,
    loader::{GoLoader, LoadOptions, PackageLoader},
    syntax::printer::{DeclPrinter, GoPrinter},
};

/// URI scheme viewers use for package documents.
const SCHEME: &str = "godoc://";

pub fn run(
    args: DocArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config = load_config(&ctx.cwd)?;

    let mut opts = config.render_options();
    opts.show_files &= !args.no_files;
    opts.show_subdirectories &= !args.no_subdirs;

    let build = config.build_context(
        ctx.cwd
            .clone(),
    )?;
    let loader = GoLoader::new(
        build,
        LoadOptions {
            preserve_bodies: config
                .workspace
                .preserve_bodies,
        },
    );
    let printer = GoPrinter::new(
        config
            .render
            .tab_width,
    );

    let rendered = render_all(&loader, &printer, &opts, &args.paths)?;

    match &args.output
    {
        Some(path) =>
        {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            emit(&rendered, &mut out)?;
            out.flush()
                .context("Failed to flush output")?;
            if !ctx.quiet
            {
                eprintln!("Wrote {} package(s) to {}", rendered.len(), path.display());
            }
        }
        None =>
        {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            emit(&rendered, &mut out)?;
            out.flush()
                .context("Failed to flush output")?;
        }
    }
    Ok(())
}

/// Load every path, then render each package. Results follow `paths` order.
pub fn render_all(
    loader: &dyn PackageLoader,
    printer: &dyn DeclPrinter,
    opts: &RenderOptions,
    paths: &[String],
) -> Result<Vec<Rendered>>
{
    let packages = paths
        .par_iter()
        .map(|arg| {
            let path = strip_scheme(arg);
            loader
                .load(path)
                .with_context(|| format!("Failed to load package {path}"))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(count = packages.len(), "packages loaded");

    Ok(packages
        .par_iter()
        .map(|pkg| PackageRenderer::render(pkg, printer, opts))
        .collect())
}

fn emit<W: Write>(
    rendered: &[Rendered],
    out: &mut W,
) -> Result<()>
{
    for r in rendered
    {
        r.write_to(out)
            .context("Failed to write output")?;
    }
    Ok(())
}

/// `godoc://net/http` → `net/http`
pub fn strip_scheme(arg: &str) -> &str
{
    arg.strip_prefix(SCHEME)
        .unwrap_or(arg)
}

#[cfg(test)]
mod tests
{
    use std::{collections::HashMap, path::PathBuf};

    use super::*;
    use crate::{
        loader::{LoadError, Package},
        syntax::ast::{Decl, FuncDecl, FuncType, Ident},
    };

    /// In-memory packages keyed by import path.
    struct Fixed(HashMap<&'static str, Package>);

    impl PackageLoader for Fixed
    {
        fn load(
            &self,
            import_path: &str,
        ) -> Result<Package, LoadError>
        {
            self.0
                .get(import_path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound(import_path.to_owned()))
        }
    }

    fn package(
        path: &str,
        func: &str,
    ) -> Package
    {
        Package {
            name: path.into(),
            import_path: path.into(),
            dir: PathBuf::from("/nonexistent").join(path),
            funcs: vec![crate::loader::DeclDoc {
                doc: String::new(),
                file: "a.go".into(),
                decl: Decl::Func(FuncDecl {
                    recv: None,
                    name: Ident::new(func),
                    ty: FuncType::default(),
                    body: None,
                }),
            }],
            ..Package::default()
        }
    }

    fn loader() -> Fixed
    {
        Fixed(HashMap::from([("a", package("a", "Alpha")), ("b", package("b", "Beta"))]))
    }

    fn opts() -> RenderOptions
    {
        RenderOptions { show_subdirectories: false, ..RenderOptions::default() }
    }

    #[test]
    fn output_follows_argument_order()
    {
        let paths = ["godoc://b".to_owned(), "a".to_owned()];
        let out = render_all(&loader(), &GoPrinter::default(), &opts(), &paths).expect("render");

        assert_eq!(out.len(), 2);
        assert!(out[0].text.starts_with("package b\n"));
        assert!(out[0].text.contains("func Beta()"));
        assert!(out[1].text.starts_with("package a\n"));
    }

    #[test]
    fn one_missing_package_fails_the_whole_run()
    {
        let paths = ["a".to_owned(), "missing".to_owned()];
        let err = render_all(&loader(), &GoPrinter::default(), &opts(), &paths)
            .expect_err("missing package");

        assert_eq!(err.to_string(), "Failed to load package missing");
        assert_eq!(err.root_cause().to_string(), "cannot find package \"missing\"");
    }

    #[test]
    fn scheme_prefix_is_optional()
    {
        assert_eq!(strip_scheme("godoc://net/http"), "net/http");
        assert_eq!(strip_scheme("./local"), "./local");
    }
}
