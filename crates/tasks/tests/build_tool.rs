//! Build tool tasks run end to end over a temporary site.

use std::io;
use std::path::{Path, PathBuf};

use splice::{SpliceError, StageResult};
use tasks::{BuildTool, Handler, LinkSpec, Mode, RunError, Runner, TaskError, TaskInfo, ToolConfig};
use test_support::TestDir;

fn shout() -> Handler {
    Handler::new(|feed, context| {
        let suffix = format!("<!-- {} -->", context.task_name);
        feed.map(move |mut record| -> StageResult {
            if let Some(contents) = record.take_contents() {
                let mut text = String::from_utf8_lossy(&contents).to_uppercase();
                text.push_str(&suffix);
                record.set_contents(text.into_bytes());
            }
            Ok(record)
        })
    })
}

fn site() -> TestDir {
    let dir = TestDir::new().expect("test dir");
    dir.write_file("src/index.html", b"home").expect("write");
    dir.write_file("src/about/team.html", b"team").expect("write");
    dir.write_file("src/about/_draft.html", b"draft").expect("write");
    dir.write_file("src/notes.txt", b"notes").expect("write");
    dir
}

fn tool(dir: &TestDir) -> BuildTool {
    let pages = TaskInfo::new("pages", ["**/*.html", "!**/_*.html"])
        .with_handler(Mode::Development, Handler::passthrough())
        .with_handler(Mode::Production, shout());
    let text = TaskInfo::new("text", ["*.txt"]).with_handler(Mode::Development, Handler::passthrough());
    BuildTool::new(ToolConfig::new().with_cwd(dir.path()).with_task(pages).with_task(text))
}

fn runner() -> Runner {
    Runner::new().without_subscriber()
}

#[test]
fn clean_dist_leaves_an_empty_directory_every_time() {
    let dir = site();
    dir.write_file("dist/old/stale.html", b"stale").expect("stale");
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Development, None))
        .task(tool.clean_dist_task())
        .series("clean", ["use_dev", "cleanDist"]);

    runner.run("clean").expect("first clean");
    assert!(dir.list("dist").expect("list").is_empty());
    runner.run("clean").expect("second clean");
    assert!(dir.list("dist").expect("list").is_empty());
}

#[test]
fn handle_task_writes_handler_output_under_dist() {
    let dir = site();
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Production, None))
        .task(tool.handle_task("pages", None))
        .series("build", ["use_prod", "handle_pages"]);

    runner.run("build").expect("build");
    assert_eq!(
        dir.read_file("dist/index.html").expect("index"),
        b"HOME<!-- pages -->"
    );
    assert_eq!(
        dir.read_file("dist/about/team.html").expect("team"),
        b"TEAM<!-- pages -->"
    );
    assert!(!dir.exists("dist/about/_draft.html"));
    assert!(!dir.exists("dist/notes.txt"));
}

#[test]
fn dist_override_redirects_one_task() {
    let dir = site();
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Development, None))
        .task(tool.handle_task("text", Some(PathBuf::from("public/text"))))
        .series("build", ["use_dev", "handle_text"]);

    runner.run("build").expect("build");
    assert_eq!(dir.read_file("public/text/notes.txt").expect("notes"), b"notes");
    assert!(!dir.exists("dist/notes.txt"));
}

#[test]
fn tasks_without_a_handler_in_the_mode_are_not_found() {
    let dir = site();
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Production, None))
        .task(tool.handle_task("text", None))
        .task(tool.handle_task("missing", None))
        .series("text", ["use_prod", "handle_text"]);

    let error = runner.run("text").unwrap_err();
    assert!(matches!(
        error,
        RunError::Failed { ref name, source: TaskError::NotFound { mode: Mode::Production, .. } }
            if name == "handle_text"
    ));
    assert!(matches!(
        runner.run("handle_missing"),
        Err(RunError::Failed { source: TaskError::NotFound { .. }, .. })
    ));
}

#[test]
fn pipeline_tasks_require_initialisation() {
    let dir = site();
    let tool = tool(&dir);
    let mut runner = runner();
    runner.task(tool.handle_task("pages", None)).task(tool.clean_dist_task());

    assert!(matches!(
        runner.run("handle_pages"),
        Err(RunError::Failed { source: TaskError::NotInitialized, .. })
    ));
    assert!(matches!(
        runner.run("cleanDist"),
        Err(RunError::Failed { source: TaskError::NotInitialized, .. })
    ));
}

#[test]
fn handler_failure_fails_the_task() {
    let dir = site();
    let failing = TaskInfo::new("pages", ["*.html"]).with_handler(
        Mode::Development,
        Handler::new(|feed, _context| {
            feed.map(|_record| -> StageResult { Err(io::Error::other("render failed").into()) })
        }),
    );
    let tool = BuildTool::new(ToolConfig::new().with_cwd(dir.path()).with_task(failing));
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Development, None))
        .task(tool.handle_task("pages", None))
        .series("build", ["use_dev", "handle_pages"]);

    let error = runner.run("build").unwrap_err();
    match error {
        RunError::Failed { name, source: TaskError::Splice(SpliceError::Stage(inner)) } => {
            assert_eq!(name, "handle_pages");
            assert_eq!(inner.to_string(), "render failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.exists("dist/index.html"));
}

#[cfg(unix)]
#[test]
fn symlink_task_replaces_stale_entries_on_rerun() {
    let dir = site();
    dir.write_file("dist/index.html", b"stale copy").expect("stale");
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Development, None))
        .task(tool.symlink_task("pages", None))
        .series("link", ["use_dev", "symlink_pages"]);

    runner.run("link").expect("first run");
    runner.run("link").expect("second run");

    assert!(dir.is_symlink("dist/index.html"));
    assert_eq!(dir.read_link("dist/index.html").expect("link"), Path::new("../src/index.html"));
    assert_eq!(
        dir.read_link("dist/about/team.html").expect("link"),
        Path::new("../../src/about/team.html")
    );
    assert!(!dir.is_symlink("dist/about"));
    assert_eq!(dir.read_file("dist/index.html").expect("read"), b"home");
}

#[cfg(unix)]
#[test]
fn links_task_creates_relative_links_into_dist() {
    let dir = site();
    dir.write_file("node_modules/lib/index.js", b"export {}").expect("module");
    let tool = tool(&dir);
    let mut runner = runner();
    runner
        .task(tool.init(Mode::Development, None))
        .task(tool.links_task(vec![
            LinkSpec::new("node_modules/lib", "vendor/lib"),
            LinkSpec::new("src/notes.txt", "notes.txt"),
        ]))
        .series("link", ["use_dev", "links"]);

    runner.run("link").expect("links");
    runner.run("link").expect("links again");

    assert_eq!(
        dir.read_link("dist/vendor/lib").expect("dir link"),
        Path::new("../../node_modules/lib")
    );
    assert_eq!(dir.read_file("dist/vendor/lib/index.js").expect("read"), b"export {}");
    assert_eq!(dir.read_link("dist/notes.txt").expect("file link"), Path::new("../src/notes.txt"));
}
