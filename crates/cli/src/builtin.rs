use std::path::PathBuf;

use plugins::{OutputStyle, StylesheetOptions, TemplateOptions};
use serde::Deserialize;
use serde_json::{Map, Value};
use tasks::{Handler, HandlerContext, Mode};

/// Handlers a manifest can name.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinHandler {
    /// Records pass through unchanged.
    Copy,
    /// Templates rendered to `.html`.
    Template,
    /// Templates compiled to `.js` script modules.
    TemplateScript,
    /// Stylesheets compiled to `.css`; compressed in production.
    Stylesheet,
}

/// Manifest settings the built-in handlers read.
#[derive(Clone, Debug, Default)]
pub struct BuiltinOptions {
    /// Template variables shared by every template task.
    pub context: Option<Value>,
    /// Absolute stylesheet import directories.
    pub include_paths: Vec<PathBuf>,
    /// Exported function name for script templates.
    pub script_name: Option<String>,
}

impl BuiltinHandler {
    /// Builds the task handler.
    #[must_use]
    pub fn handler(self, options: BuiltinOptions) -> Handler {
        match self {
            Self::Copy => Handler::passthrough(),
            Self::Template => Handler::new(move |feed, context| {
                plugins::template_html(feed, template_options(&options, context))
            }),
            Self::TemplateScript => Handler::new(move |feed, context| {
                plugins::template_script(feed, template_options(&options, context))
            }),
            Self::Stylesheet => Handler::new(move |feed, context| {
                plugins::stylesheet(feed, stylesheet_options(&options, context))
            }),
        }
    }
}

/// Template variables: the manifest context plus `mode` and `task`, unless
/// the manifest already defines them.
fn template_options(options: &BuiltinOptions, context: &HandlerContext) -> TemplateOptions {
    let mut variables = match &options.context {
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("context".to_owned(), other.clone());
            map
        }
        None => Map::new(),
    };
    variables
        .entry("mode")
        .or_insert_with(|| Value::from(context.mode.as_str()));
    variables
        .entry("task")
        .or_insert_with(|| Value::from(context.task_name.clone()));

    let template = TemplateOptions::default().with_context(Value::Object(variables));
    match &options.script_name {
        Some(name) => template.with_name(name.clone()),
        None => template,
    }
}

fn stylesheet_options(options: &BuiltinOptions, context: &HandlerContext) -> StylesheetOptions {
    let output_style = match context.mode {
        Mode::Development => OutputStyle::Expanded,
        Mode::Production => OutputStyle::Compressed,
    };
    let mut include_paths = vec![context.base_path.clone()];
    include_paths.extend(options.include_paths.iter().cloned());
    StylesheetOptions {
        output_style,
        include_paths,
        // grass emits no source maps.
        source_map: false,
    }
}
