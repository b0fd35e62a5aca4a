use std::fs;
use std::path::Path;

use minijinja::Environment;
use record::FileRecord;
use serde_json::Value;
use splice::StageResult;

use crate::error::PluginError;

/// Default identifier of compiled script templates.
pub const DEFAULT_SCRIPT_NAME: &str = "template";

/// Converter contract for template stages.
///
/// `source` is the template text; `path` is where it lives, so relative
/// includes can be resolved.
pub trait TemplateEngine {
    /// Renders a template to markup.
    fn render_file(&self, path: &Path, source: &str, context: &Value)
    -> Result<String, PluginError>;

    /// Compiles a template into a script module exporting `name` as a
    /// function of its locals.
    fn compile_file_to_script(
        &self,
        path: &Path,
        source: &str,
        name: &str,
        context: &Value,
    ) -> Result<String, PluginError>;
}

/// [`TemplateEngine`] backed by `minijinja`.
///
/// Includes and `extends` resolve relative to the template's directory.
/// Script compilation pre-renders the markup with the given context and
/// embeds it as a string literal; the generated function ignores the
/// `locals` it receives at runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    fn environment(path: &Path) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        if let Some(dir) = path.parent() {
            env.set_loader(minijinja::path_loader(dir));
        }
        env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_file(
        &self,
        path: &Path,
        source: &str,
        context: &Value,
    ) -> Result<String, PluginError> {
        Self::environment(path)
            .render_str(source, context)
            .map_err(|error| PluginError::template(path, error))
    }

    fn compile_file_to_script(
        &self,
        path: &Path,
        source: &str,
        name: &str,
        context: &Value,
    ) -> Result<String, PluginError> {
        if !is_identifier(name) {
            return Err(PluginError::template(
                path,
                format!("'{name}' is not a valid script identifier"),
            ));
        }
        let markup = self.render_file(path, source, context)?;
        let literal =
            serde_json::to_string(&markup).map_err(|error| PluginError::template(path, error))?;
        Ok(format!(
            "function {name}(locals) {{\n  return {literal};\n}}\nexport default {name};\n"
        ))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Options shared by the template stages.
#[derive(Clone, Debug)]
pub struct TemplateOptions {
    /// Variables made available to templates.
    pub context: Value,
    /// Function name used by [`template_script`].
    pub name: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            context: Value::Object(serde_json::Map::new()),
            name: DEFAULT_SCRIPT_NAME.to_owned(),
        }
    }
}

impl TemplateOptions {
    /// Replaces the template context.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Replaces the exported script function name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Renders every record as a template and renames it to `.html`.
pub fn template_html<I>(records: I, options: TemplateOptions) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
{
    template_html_with(records, MiniJinjaEngine, options)
}

/// [`template_html`] with an explicit engine.
pub fn template_html_with<I, T>(
    records: I,
    engine: T,
    options: TemplateOptions,
) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
    T: TemplateEngine,
{
    records.into_iter().map(move |record| {
        convert(record, "html", |path, source| {
            engine.render_file(path, source, &options.context)
        })
    })
}

/// Compiles every record into a script module and renames it to `.js`.
///
/// The markup is rendered at build time with `options.context` and embedded
/// as a string literal. The exported function accepts a `locals` argument for
/// call-site compatibility but ignores it: values only known at runtime never
/// reach the output.
pub fn template_script<I>(records: I, options: TemplateOptions) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
{
    template_script_with(records, MiniJinjaEngine, options)
}

/// [`template_script`] with an explicit engine.
pub fn template_script_with<I, T>(
    records: I,
    engine: T,
    options: TemplateOptions,
) -> impl Iterator<Item = StageResult>
where
    I: IntoIterator<Item = FileRecord>,
    T: TemplateEngine,
{
    records.into_iter().map(move |record| {
        convert(record, "js", |path, source| {
            engine.compile_file_to_script(path, source, &options.name, &options.context)
        })
    })
}

/// Applies `render` to a record's template text and swaps in the result.
///
/// Records that name a directory pass through untouched.
fn convert<F>(mut record: FileRecord, extension: &str, render: F) -> StageResult
where
    F: FnOnce(&Path, &str) -> Result<String, PluginError>,
{
    let bytes = match record.take_contents() {
        Some(bytes) => bytes,
        None => {
            let io_error = |source| PluginError::Io {
                path: record.path().to_path_buf(),
                source,
            };
            if record.stat_is_directory().map_err(io_error)? {
                return Ok(record);
            }
            fs::read(record.path()).map_err(io_error)?
        }
    };
    let source = String::from_utf8_lossy(&bytes);
    let output = render(record.path(), &source)?;
    record.set_contents(output.into_bytes());
    record.set_extension(extension);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use test_support::TestDir;

    fn record(dir: &TestDir, relative: &str, contents: &str) -> FileRecord {
        let path = dir.write_file(relative, contents).expect("write template");
        FileRecord::new(dir.path(), dir.join("src"), path)
            .expect("record")
            .with_contents(contents.as_bytes().to_vec())
    }

    #[test]
    fn renders_markup_with_context() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/index.jinja", "<h1>{{ title }}</h1>");
        let options = TemplateOptions::default().with_context(json!({"title": "Hello"}));

        let output: Vec<_> = template_html([input], options)
            .collect::<Result<_, _>>()
            .expect("render");
        assert_eq!(output[0].contents(), Some(&b"<h1>Hello</h1>"[..]));
        assert_eq!(output[0].relative(), PathBuf::from("index.html"));
    }

    #[test]
    fn includes_resolve_next_to_the_template() {
        let dir = TestDir::new().expect("test dir");
        dir.write_file("src/partials/nav.jinja", "<nav></nav>").expect("partial");
        let input = record(&dir, "src/page.jinja", "{% include 'partials/nav.jinja' %}<main></main>");

        let output: Vec<_> = template_html([input], TemplateOptions::default())
            .collect::<Result<_, _>>()
            .expect("render");
        assert_eq!(output[0].contents(), Some(&b"<nav></nav><main></main>"[..]));
    }

    #[test]
    fn script_module_exports_named_function() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/card.jinja", "<p class=\"card\">{{ n }}</p>");
        let options = TemplateOptions::default()
            .with_context(json!({"n": 3}))
            .with_name("cardTemplate");

        let output: Vec<_> = template_script([input], options)
            .collect::<Result<_, _>>()
            .expect("compile");
        let script = String::from_utf8(output[0].contents().expect("contents").to_vec())
            .expect("utf8");
        assert_eq!(
            script,
            "function cardTemplate(locals) {\n  return \"<p class=\\\"card\\\">3</p>\";\n}\nexport default cardTemplate;\n"
        );
        assert_eq!(output[0].relative(), PathBuf::from("card.js"));
    }

    #[test]
    fn script_bakes_in_build_time_context() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/greet.jinja", "Hi {{ who }}");
        let options = TemplateOptions::default().with_context(json!({"who": "build"}));

        let output: Vec<_> = template_script([input], options)
            .collect::<Result<_, _>>()
            .expect("compile");
        let script = std::str::from_utf8(output[0].contents().expect("contents")).expect("utf8");
        assert!(script.contains("return \"Hi build\";"));
        assert!(!script.contains("locals."));
    }

    #[test]
    fn default_script_name_is_template() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/a.jinja", "x");
        let output: Vec<_> = template_script([input], TemplateOptions::default())
            .collect::<Result<_, _>>()
            .expect("compile");
        let script = std::str::from_utf8(output[0].contents().expect("contents")).expect("utf8");
        assert!(script.ends_with("export default template;\n"));
    }

    #[test]
    fn invalid_script_name_is_rejected() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/a.jinja", "x");
        let mut stage = template_script([input], TemplateOptions::default().with_name("not-valid"));
        let error = stage.next().expect("item").unwrap_err();
        assert!(error.to_string().contains("not a valid script identifier"));
    }

    #[test]
    fn syntax_errors_carry_the_path() {
        let dir = TestDir::new().expect("test dir");
        let input = record(&dir, "src/broken.jinja", "{% if %}");
        let mut stage = template_html([input], TemplateOptions::default());
        let error = stage.next().expect("item").unwrap_err();
        let error = error.downcast::<PluginError>().expect("plugin error");
        assert!(matches!(*error, PluginError::Template { .. }));
        assert!(error.to_string().contains("broken.jinja"));
    }

    #[test]
    fn missing_contents_are_read_from_disk() {
        let dir = TestDir::new().expect("test dir");
        let path = dir.write_file("src/disk.jinja", "{{ 1 + 1 }}").expect("write");
        let input = FileRecord::new(dir.path(), dir.join("src"), path).expect("record");
        let output: Vec<_> = template_html([input], TemplateOptions::default())
            .collect::<Result<_, _>>()
            .expect("render");
        assert_eq!(output[0].contents(), Some(&b"2"[..]));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_source_reports_io_error() {
        let dir = TestDir::new().expect("test dir");
        dir.write_file("src/notes.txt", "plain file").expect("write");
        let input =
            FileRecord::new(dir.path(), dir.join("src"), dir.join("src/notes.txt/inner.jinja"))
                .expect("record");
        let error = template_html([input], TemplateOptions::default())
            .next()
            .expect("item")
            .unwrap_err();
        let error = error.downcast::<PluginError>().expect("plugin error");
        assert!(matches!(*error, PluginError::Io { .. }));
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(is_identifier("template"));
        assert!(is_identifier("_private$1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
