#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Conversion stages for pipekit sub-pipelines. Each stage is an iterator
//! adapter from [`FileRecord`](record::FileRecord) to
//! [`StageResult`](splice::StageResult), so it can be returned directly from
//! a splice handler:
//!
//! - [`template_html`] renders templates to `.html`;
//! - [`template_script`] compiles templates to `.js` modules that export a
//!   function of the template locals;
//! - [`stylesheet`] compiles Sass/SCSS to `.css`, optionally followed by a
//!   `.css.map` record.
//!
//! # Design
//!
//! Converters sit behind the [`TemplateEngine`] and [`StylesheetCompiler`]
//! traits. The default implementations use `minijinja` and `grass`; the
//! `*_with` variants accept any other implementation. Converter failures
//! surface as [`PluginError`] and are never retried.
//!
//! Records without contents are read from disk. Directory records pass
//! through unchanged.
//!
//! # Examples
//!
//! ```
//! use plugins::{TemplateOptions, template_html};
//! use record::FileRecord;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let page = FileRecord::new("/site", "/site/src", "/site/src/index.jinja")?
//!     .with_contents(b"<h1>{{ title }}</h1>".to_vec());
//! let options = TemplateOptions::default()
//!     .with_context(serde_json::json!({ "title": "Docs" }));
//!
//! let rendered = template_html([page], options).next().expect("one record")?;
//! assert_eq!(rendered.contents(), Some(&b"<h1>Docs</h1>"[..]));
//! assert_eq!(rendered.path(), std::path::Path::new("/site/src/index.html"));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;
mod stylesheet;
mod template;

pub use error::PluginError;
pub use stylesheet::{
    CompiledStylesheet, GrassCompiler, OutputStyle, StylesheetCompiler, StylesheetOptions,
    stylesheet, stylesheet_with,
};
pub use template::{
    DEFAULT_SCRIPT_NAME, MiniJinjaEngine, TemplateEngine, TemplateOptions, template_html,
    template_html_with, template_script, template_script_with,
};
