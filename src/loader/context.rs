//! Build context: import path lookup and source file selection.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::debug;

use crate::{
    loader::LoadError,
    syntax::scanner::{Scanner, TokenKind},
};

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

static IGNORE_CONSTRAINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*//[ \t]*(?:go:build|\+build)[ \t]+ignore[ \t]*$").expect("valid regex")
});

/// Where and for which target packages are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext
{
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub goos: String,
    pub goarch: String,
    /// Base for relative import paths.
    pub cwd: PathBuf,
}

/// One non-test source file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText
{
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

/// Result of scanning a package directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet
{
    pub package: String,
    /// Non-test files in name order.
    pub sources: Vec<SourceText>,
    pub test: Vec<String>,
    pub xtest: Vec<String>,
}

impl BuildContext
{
    /// Context for the host target with roots taken from `GOROOT` and
    /// `GOPATH`.
    pub fn from_env(cwd: PathBuf) -> Self
    {
        let goroot = std::env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let gopath = std::env::var_os("GOPATH")
            .map(|v| {
                std::env::split_paths(&v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            goroot,
            gopath,
            goos: host_os().to_owned(),
            goarch: host_arch().to_owned(),
            cwd,
        }
    }

    /// `src` directories searched for non-local import paths, in order.
    pub fn src_roots(&self) -> Vec<PathBuf>
    {
        self.goroot
            .iter()
            .chain(&self.gopath)
            .map(|root| root.join("src"))
            .collect()
    }

    /// Resolve `import_path` to its canonical import path and directory.
    pub fn find(
        &self,
        import_path: &str,
    ) -> Result<(String, PathBuf), LoadError>
    {
        if is_local(import_path)
        {
            let dir = dunce::canonicalize(
                self.cwd
                    .join(import_path),
            )
            .ok()
            .filter(|d| d.is_dir())
            .ok_or_else(|| LoadError::NotFound(import_path.to_owned()))?;

            // Local directories inside a source root get their real path.
            let path = self
                .src_roots()
                .iter()
                .filter_map(|root| dunce::canonicalize(root).ok())
                .find_map(|root| {
                    dir.strip_prefix(&root)
                        .ok()
                        .map(slash_path)
                })
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| import_path.to_owned());
            return Ok((path, dir));
        }

        self.src_roots()
            .into_iter()
            .map(|root| root.join(import_path))
            .find(|dir| dir.is_dir())
            .map(|dir| (import_path.to_owned(), dir))
            .ok_or_else(|| LoadError::NotFound(import_path.to_owned()))
    }

    /// Select and read the buildable files of `dir`.
    pub fn scan(
        &self,
        dir: &Path,
    ) -> Result<FileSet, LoadError>
    {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| LoadError::Io { path, source }
        };

        let mut names = BTreeSet::new();
        for entry in fs::read_dir(dir).map_err(io_err(dir))?
        {
            let entry = entry.map_err(io_err(dir))?;
            let is_file = entry
                .file_type()
                .map_err(io_err(&entry.path()))?
                .is_file();
            let name = entry
                .file_name()
                .to_string_lossy()
                .into_owned();
            if is_file && name.ends_with(".go") && !name.starts_with(['_', '.'])
            {
                names.insert(name);
            }
        }

        let mut set = FileSet::default();
        for name in names
        {
            if !self.matches_target(&name)
            {
                debug!(file = %name, "skipped for target");
                continue;
            }

            let path = dir.join(&name);
            let text = fs::read_to_string(&path).map_err(io_err(&path))?;
            let Some((start, package)) = package_clause(&text)
            else
            {
                debug!(file = %name, "no package clause");
                continue;
            };
            if IGNORE_CONSTRAINT.is_match(&text[..start])
            {
                debug!(file = %name, "skipped by ignore constraint");
                continue;
            }
            let package = package.to_owned();

            if name.ends_with("_test.go")
            {
                if package.ends_with("_test")
                {
                    set.xtest
                        .push(name);
                }
                else
                {
                    set.test
                        .push(name);
                }
                continue;
            }

            if set.package.is_empty()
            {
                set.package = package;
            }
            else if set.package != package
            {
                return Err(LoadError::MultiplePackages {
                    first: set.package,
                    second: package,
                    dir: dir.to_path_buf(),
                });
            }
            set.sources
                .push(SourceText { name, path, text });
        }

        if set.sources.is_empty()
        {
            return Err(LoadError::NoGoFiles(dir.to_path_buf()));
        }
        Ok(set)
    }

    /// GOOS/GOARCH file name suffix check (`x_linux.go`, `x_arm64.go`,
    /// `x_windows_amd64_test.go`).
    pub fn matches_target(
        &self,
        name: &str,
    ) -> bool
    {
        let stem = name
            .strip_suffix(".go")
            .unwrap_or(name);
        let stem = stem
            .strip_suffix("_test")
            .unwrap_or(stem);
        // The part before the first underscore is never a constraint.
        let Some(i) = stem.find('_')
        else
        {
            return true;
        };
        let parts: Vec<&str> = stem[i + 1..]
            .split('_')
            .collect();

        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1])
        {
            return self.os_matches(parts[n - 2]) && parts[n - 1] == self.goarch;
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last)
        {
            return self.os_matches(last);
        }
        if KNOWN_ARCH.contains(&last)
        {
            return last == self.goarch;
        }
        true
    }

    fn os_matches(
        &self,
        os: &str,
    ) -> bool
    {
        os == self.goos
            || (os == "linux" && self.goos == "android")
            || (os == "solaris" && self.goos == "illumos")
            || (os == "darwin" && self.goos == "ios")
    }
}

fn is_local(path: &str) -> bool
{
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || Path::new(path).is_absolute()
}

fn slash_path(rel: &Path) -> String
{
    rel.components()
        .map(|c| {
            c.as_os_str()
                .to_string_lossy()
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn host_os() -> &'static str
{
    match std::env::consts::OS
    {
        "macos" => "darwin",
        os => os,
    }
}

fn host_arch() -> &'static str
{
    match std::env::consts::ARCH
    {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        arch => arch,
    }
}

/// Offset of the `package` keyword and the package name. Comments before
/// the clause are skipped, so doc examples inside them never match.
pub fn package_clause(text: &str) -> Option<(usize, &str)>
{
    let mut tokens = Scanner::new(text).filter(|t| t.kind != TokenKind::Comment);
    let keyword = tokens.next()?;
    if keyword.kind != TokenKind::Keyword || keyword.text != "package"
    {
        return None;
    }
    let name = tokens.next()?;
    (name.kind == TokenKind::Ident).then_some((keyword.offset, name.text))
}

/// Package name implied by an import path: the last element, minus common
/// `go-` / `.go` / `-go` decorations and major-version suffixes.
pub fn guess_name_from_path(path: &str) -> String
{
    let mut elems = path
        .rsplit('/')
        .filter(|e| !e.is_empty());
    let mut name = elems
        .next()
        .unwrap_or(path);
    let is_version = |e: &str| {
        e.strip_prefix('v')
            .is_some_and(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
    };
    if is_version(name)
        && let Some(prev) = elems.next()
    {
        name = prev;
    }
    let name = name
        .strip_prefix("go-")
        .unwrap_or(name);
    let name = name
        .strip_suffix(".go")
        .or_else(|| name.strip_suffix("-go"))
        .unwrap_or(name);
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
