//! `incsrc_core` is the engine behind [incsrc](https://github.com/incsrc/incsrc). It rewrites documents that contain include directives, HTML comments naming a glob of asset files, and fills each directive with the generated `<script>` or `<link>` markup for the files it matches.
//!
//! ## Processing Pipeline
//!
//! ```text
//! HTML / markdown document
//!   → Scanner (finds include comments, parses their JSON options, pairs start and end markers)
//!   → Resolver (expands each directive's glob into an ordered file list)
//!   → Concatenator (optionally merges the files into one artifact on disk)
//!   → Cache buster (optionally versions each path with an md5 or date token)
//!   → Renderer (turns each path into markup through a template)
//!   → Rewriter (splices the generated block between the markers)
//! ```
//!
//! ## Directive Syntax
//!
//! ```html
//! <!-- include-js:vendor({"src": "*.js", "basePath": "lib"}) -->
//! <script type="text/javascript" src="lib/a.js"></script>
//! <script type="text/javascript" src="lib/b.js"></script>
//! <!-- /include-js:vendor -->
//! ```
//!
//! The block between the markers is regenerated on every run, so rewriting
//! the same document twice yields the same text as rewriting it once.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `incsrc.toml`.
//! - [`fs`]: The [`AssetFs`] capability with disk, in-memory and overlay
//!   implementations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use incsrc_core::ProcessOptions;
//! use incsrc_core::process;
//!
//! let options = ProcessOptions::load(".").unwrap();
//! let html = std::fs::read_to_string("index.html").unwrap();
//! let rewritten = process(&html, &options).unwrap();
//! std::fs::write("index.html", rewritten).unwrap();
//! ```

pub use cache::*;
pub use concat::*;
pub use config::*;
pub use contents::*;
pub use engine::*;
pub use error::*;
pub use fs::*;
pub use position::*;
pub use render::*;
pub use resolver::*;
pub use scanner::*;

mod cache;
mod concat;
pub mod config;
mod contents;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod fs;
pub(crate) mod lexer;
mod position;
mod render;
mod resolver;
mod scanner;

#[cfg(test)]
mod __fixtures;
