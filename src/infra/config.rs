use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{AppContext, InitArgs},
    core::{classify::Limits, render::RenderOptions},
    loader::BuildContext,
};

/// Config file names searched in the working directory, first match wins.
const CONFIG_FILES: [&str; 2] = ["annodoc.toml", ".annodoc.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Output layout
    pub render: RenderConfig,

    /// Where packages are looked up and how they are loaded
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig
{
    /// Indent of documentation text and list entries
    pub indent: usize,
    /// Wrap width of documentation paragraphs
    pub text_width: usize,
    /// Longer string literals are elided in declarations
    pub max_string_literal: usize,
    /// Larger composite literals are elided in declarations
    pub max_composite_elements: usize,
    pub show_files: bool,
    pub show_subdirectories: bool,
    /// Spaces per indentation level in printed declarations
    pub tab_width: usize,
}

impl Default for RenderConfig
{
    fn default() -> Self
    {
        let opts = RenderOptions::default();
        Self {
            indent: opts.indent,
            text_width: opts.text_width,
            max_string_literal: opts
                .limits
                .max_string_literal,
            max_composite_elements: opts
                .limits
                .max_composite_elements,
            show_files: opts.show_files,
            show_subdirectories: opts.show_subdirectories,
            tab_width: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig
{
    /// Overrides $GOROOT
    pub goroot: Option<String>,
    /// Overrides $GOPATH entries
    pub gopath: Vec<String>,
    /// Target OS for file-name build constraints (host OS if unset)
    pub goos: Option<String>,
    /// Target architecture (host architecture if unset)
    pub goarch: Option<String>,
    /// Keep function bodies in rendered declarations
    pub preserve_bodies: bool,
}

impl Config
{
    pub fn render_options(&self) -> RenderOptions
    {
        let r = &self.render;
        RenderOptions {
            limits: Limits {
                max_string_literal: r.max_string_literal,
                max_composite_elements: r.max_composite_elements,
            },
            indent: r.indent,
            text_width: r.text_width,
            show_files: r.show_files,
            show_subdirectories: r.show_subdirectories,
        }
    }

    /// Environment-derived build context with configured overrides applied.
    pub fn build_context(
        &self,
        cwd: PathBuf,
    ) -> Result<BuildContext>
    {
        let mut ctx = BuildContext::from_env(cwd);
        let ws = &self.workspace;

        if let Some(root) = &ws.goroot
        {
            ctx.goroot = Some(expand(root)?);
        }
        if !ws
            .gopath
            .is_empty()
        {
            ctx.gopath = ws
                .gopath
                .iter()
                .map(|p| expand(p))
                .collect::<Result<_>>()?;
        }
        if let Some(os) = &ws.goos
        {
            ctx.goos = os.clone();
        }
        if let Some(arch) = &ws.goarch
        {
            ctx.goarch = arch.clone();
        }
        Ok(ctx)
    }
}

/// `~` and `$VAR` expansion for configured roots
fn expand(path: &str) -> Result<PathBuf>
{
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path {path:?}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Load configuration from `dir`, then `ANNODOC_*` environment variables
/// (`ANNODOC_RENDER__TEXT_WIDTH=60`).
pub fn load_config(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    for name in CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ANNODOC")
            .prefix_separator("_")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let dir = ctx
        .cwd
        .join(&args.path);
    let config_path = dir.join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let toml_string =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
