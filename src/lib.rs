//! **annodoc** - Go package documentation for editor viewers
//!
//! Renders a package as plain text plus an out-of-band metadata stream of
//! anchors, links and source jumps keyed by line:column spans.

/// Command-line interface with clap integration
pub mod cli;

/// Go declaration syntax: tree, identifier scanner and printer
pub mod syntax {
    /// Declaration-level syntax tree with resolution info
    pub mod ast;

    /// Predeclared identifiers of the universe scope
    pub mod predeclared;

    /// Identifier tokenizer for printed declarations
    pub mod scanner;

    /// Canonical declaration printer with literal splices
    pub mod printer;
    pub use printer::{DeclPrinter, GoPrinter};
}

/// Core rendering pipeline
pub mod core {
    /// Metadata records and their wire format
    pub mod meta;

    /// Deduplicating string table
    pub mod intern;

    /// Incremental line:column tracking over the output buffer
    pub mod position;

    /// Identifier link classification and literal redaction
    pub mod classify;

    /// Package and declaration renderers
    pub mod render;
    pub use render::{PackageRenderer, RenderOptions, Rendered};

    /// The `doc` command
    pub mod doc;
    pub use doc::run as doc_run;
}

/// Package discovery, parsing and the documentation model
pub mod loader;

/// Infrastructure - configuration, logging and helpers
pub mod infra {
    /// Layered TOML/env configuration
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// tracing subscriber setup
    pub mod logging;

    /// Tree-sitter node and comment helpers
    pub mod utils;
}

pub use crate::cli::{AppContext, Cli, Commands};
pub use crate::core::{PackageRenderer, RenderOptions, Rendered, doc_run};
pub use crate::loader::{GoLoader, Package, PackageLoader};
