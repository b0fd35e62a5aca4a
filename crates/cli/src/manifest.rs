use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tasks::{DEFAULT_DIST_PATH_PART, DEFAULT_SRC_PATH_PART, LinkSpec, Mode, TaskInfo, ToolConfig};

use crate::builtin::{BuiltinHandler, BuiltinOptions};
use crate::error::CliError;

/// Default manifest file name, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "pipekit.json";

/// Parsed `pipekit.json`.
///
/// ```json
/// {
///   "src": "src",
///   "dist": "dist",
///   "context": { "title": "Site" },
///   "tasks": [
///     { "name": "pages", "src": ["**/*.jinja", "!**/_*.jinja"],
///       "handlers": { "dev": "template", "prod": "template" } }
///   ],
///   "links": [{ "source": "node_modules/lib", "to": "vendor/lib" }]
/// }
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Manifest {
    /// Source directory, relative to the working directory.
    #[serde(default = "default_src")]
    pub src: String,
    /// Output directory, relative to the working directory.
    #[serde(default = "default_dist")]
    pub dist: PathBuf,
    /// Variables made available to templates.
    #[serde(default)]
    pub context: Option<Value>,
    /// Extra stylesheet import directories, relative to the working directory.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Task descriptions.
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    /// Auxiliary links created by the `links` task.
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

/// One task description.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TaskEntry {
    /// Task name.
    pub name: String,
    /// Globs relative to the source directory.
    pub src: Vec<String>,
    /// Handler per mode name; `null` means the task does not exist in that
    /// mode.
    #[serde(default)]
    pub handlers: BTreeMap<String, Option<BuiltinHandler>>,
    /// Output directory for this task only.
    #[serde(default)]
    pub dist: Option<PathBuf>,
    /// Exported function name for `template-script`.
    #[serde(default)]
    pub script_name: Option<String>,
}

/// One auxiliary link.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    /// Link target, relative to the working directory.
    pub source: PathBuf,
    /// Link location, relative to the output directory.
    pub to: PathBuf,
}

fn default_src() -> String {
    DEFAULT_SRC_PATH_PART.to_owned()
}

fn default_dist() -> PathBuf {
    PathBuf::from(DEFAULT_DIST_PATH_PART)
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
            context: None,
            include_paths: Vec::new(),
            tasks: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl Manifest {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadManifest {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::ParseManifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the tool configuration for a run rooted at `cwd`.
    pub fn tool_config(&self, cwd: &Path) -> Result<ToolConfig, CliError> {
        let mut seen = HashSet::new();
        let mut config = ToolConfig::new()
            .with_cwd(cwd)
            .with_src_path_part(self.src.clone())
            .with_dist_path_part(self.dist.clone());

        for entry in &self.tasks {
            if !seen.insert(entry.name.as_str()) {
                return Err(CliError::DuplicateTask(entry.name.clone()));
            }
            let options = BuiltinOptions {
                context: self.context.clone(),
                include_paths: self.include_paths.iter().map(|path| cwd.join(path)).collect(),
                script_name: entry.script_name.clone(),
            };
            let mut info = TaskInfo::new(entry.name.clone(), entry.src.iter().cloned());
            for (mode, handler) in &entry.handlers {
                let mode: Mode = mode.parse()?;
                if let Some(handler) = handler {
                    info = info.with_handler(mode, handler.handler(options.clone()));
                }
            }
            config = config.with_task(info);
        }
        Ok(config)
    }

    /// Link specifications for the `links` task.
    #[must_use]
    pub fn link_specs(&self) -> Vec<LinkSpec> {
        self.links
            .iter()
            .map(|link| LinkSpec::new(link.source.clone(), link.to.clone()))
            .collect()
    }

    /// Looks a task entry up by name.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&TaskEntry> {
        self.tasks.iter().find(|entry| entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Manifest {
        serde_json::from_str(json).expect("manifest parses")
    }

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(parse("{}"), Manifest::default());
    }

    #[test]
    fn handlers_accept_null_and_kebab_case_names() {
        let manifest = parse(
            r#"{"tasks": [{"name": "views", "src": ["*.jinja"],
                "handlers": {"dev": null, "prod": "template-script"}, "scriptName": "view"}]}"#,
        );
        let entry = manifest.task("views").expect("views");
        assert_eq!(entry.handlers["dev"], None);
        assert_eq!(entry.handlers["prod"], Some(BuiltinHandler::TemplateScript));
        assert_eq!(entry.script_name.as_deref(), Some("view"));

        let config = manifest.tool_config(Path::new("/site")).expect("config");
        let info = &config.tasks()[0];
        assert!(info.handler(Mode::Production).is_some());
        assert!(info.handler(Mode::Development).is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = serde_json::from_str::<Manifest>(r#"{"sources": []}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_handler_names_are_rejected() {
        let result = serde_json::from_str::<Manifest>(
            r#"{"tasks": [{"name": "a", "src": ["*"], "handlers": {"dev": "minify"}}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_mode_keys_fail_configuration() {
        let manifest = parse(r#"{"tasks": [{"name": "a", "src": ["*"], "handlers": {"staging": "copy"}}]}"#);
        let error = manifest.tool_config(Path::new("/site")).unwrap_err();
        assert!(matches!(error, CliError::Mode(_)));
    }

    #[test]
    fn duplicate_task_names_fail_configuration() {
        let manifest = parse(
            r#"{"tasks": [{"name": "a", "src": ["*"]}, {"name": "a", "src": ["*.txt"]}]}"#,
        );
        let error = manifest.tool_config(Path::new("/site")).unwrap_err();
        assert!(matches!(error, CliError::DuplicateTask(ref name) if name == "a"));
    }

    #[test]
    fn links_become_link_specs() {
        let manifest = parse(r#"{"links": [{"source": "node_modules/x", "to": "vendor/x"}]}"#);
        assert_eq!(manifest.link_specs(), vec![LinkSpec::new("node_modules/x", "vendor/x")]);
    }

    #[test]
    fn load_reports_the_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pipekit.json");
        let error = Manifest::load(&path).unwrap_err();
        assert!(matches!(error, CliError::ReadManifest { .. }));
        assert!(error.to_string().contains("pipekit.json"));

        fs::write(&path, "{ not json").expect("write");
        let error = Manifest::load(&path).unwrap_err();
        assert!(matches!(error, CliError::ParseManifest { .. }));
    }
}
