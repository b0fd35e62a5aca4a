use std::fs;
use std::path::{Path, PathBuf};

use record::FileRecord;
use splice::StageResult;

use crate::error::PluginError;

/// Formatting of compiled CSS.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputStyle {
    /// One declaration per line.
    #[default]
    Expanded,
    /// Whitespace removed.
    Compressed,
}

/// Options for the stylesheet stage.
#[derive(Clone, Debug, Default)]
pub struct StylesheetOptions {
    /// Formatting of the produced CSS.
    pub output_style: OutputStyle,
    /// Extra directories searched by `@use` and `@import`.
    pub include_paths: Vec<PathBuf>,
    /// Emit a `.css.map` record when the compiler produces a source map.
    ///
    /// [`GrassCompiler`] never produces one, so this only has an effect with
    /// a custom [`StylesheetCompiler`].
    pub source_map: bool,
}

/// Result of compiling one stylesheet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompiledStylesheet {
    /// Generated CSS.
    pub css: String,
    /// Source map, when the compiler produced one.
    pub source_map: Option<String>,
}

/// Converter contract for the stylesheet stage.
pub trait StylesheetCompiler {
    /// Compiles stylesheet `source` located at `path`.
    fn render(
        &self,
        path: &Path,
        source: &str,
        options: &StylesheetOptions,
    ) -> Result<CompiledStylesheet, PluginError>;
}

/// [`StylesheetCompiler`] backed by `grass`. It never produces source maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrassCompiler;

impl StylesheetCompiler for GrassCompiler {
    fn render(
        &self,
        path: &Path,
        source: &str,
        options: &StylesheetOptions,
    ) -> Result<CompiledStylesheet, PluginError> {
        let style = match options.output_style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let mut grass_options = grass::Options::default().style(style);
        if let Some(dir) = path.parent() {
            grass_options = grass_options.load_path(dir);
        }
        for include in &options.include_paths {
            grass_options = grass_options.load_path(include);
        }
        let input_syntax = match path.extension().and_then(|ext| ext.to_str()) {
            Some("sass") => grass::InputSyntax::Sass,
            Some("css") => grass::InputSyntax::Css,
            _ => grass::InputSyntax::Scss,
        };
        grass_options = grass_options.input_syntax(input_syntax);

        let css = grass::from_string(source.to_owned(), &grass_options)
            .map_err(|error| PluginError::stylesheet(path, error))?;
        Ok(CompiledStylesheet {
            css,
            source_map: None,
        })
    }
}

/// Compiles every record as a stylesheet and renames it to `.css`.
pub fn stylesheet<I>(records: I, options: StylesheetOptions) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
{
    stylesheet_with(records, GrassCompiler, options)
}

/// [`stylesheet`] with an explicit compiler.
///
/// When `options.source_map` is set and the compiler returns a map, the CSS
/// record is followed by a sibling `<name>.css.map` record.
pub fn stylesheet_with<I, C>(
    records: I,
    compiler: C,
    options: StylesheetOptions,
) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
    C: StylesheetCompiler,
{
    records
        .into_iter()
        .flat_map(move |record| match compile(record, &compiler, &options) {
            Ok(outputs) => outputs.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(error) => vec![Err(error)],
        })
}

fn compile<C>(
    mut record: FileRecord,
    compiler: &C,
    options: &StylesheetOptions,
) -> Result<Vec<FileRecord>, splice::StageError>
where
    C: StylesheetCompiler,
{
    let bytes = match record.take_contents() {
        Some(bytes) => bytes,
        None => {
            let io_error = |source| PluginError::Io {
                path: record.path().to_path_buf(),
                source,
            };
            if record.stat_is_directory().map_err(io_error)? {
                return Ok(vec![record]);
            }
            fs::read(record.path()).map_err(io_error)?
        }
    };
    let source = String::from_utf8_lossy(&bytes);
    let compiled = compiler.render(record.path(), &source, options)?;

    record.set_extension("css");
    let map_record = match compiled.source_map {
        Some(map) if options.source_map => {
            let mut map_path = record.path().as_os_str().to_owned();
            map_path.push(".map");
            let mut map_record = record.clone();
            map_record.set_path(PathBuf::from(map_path));
            map_record.set_contents(map.into_bytes());
            Some(map_record)
        }
        _ => None,
    };
    record.set_contents(compiled.css.into_bytes());

    let mut outputs = vec![record];
    outputs.extend(map_record);
    Ok(outputs)
}
