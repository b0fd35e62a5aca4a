use super::*;
use record::FileRecord;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

fn record(name: &str) -> FileRecord {
    FileRecord::new("/site", "/site/src", format!("/site/src/{name}")).expect("absolute path")
}

fn upstream(names: &[&str]) -> Vec<Result<FileRecord, StageError>> {
    names.iter().map(|name| Ok(record(name))).collect()
}

fn names(records: &[FileRecord]) -> Vec<PathBuf> {
    records.iter().map(FileRecord::relative).collect()
}

#[test]
fn identity_sub_pipeline_preserves_order() {
    let output = splice(upstream(&["a", "b", "c"]), |feed| feed.map(Ok))
        .expect("spawn")
        .collect::<Result<Vec<_>, _>>()
        .expect("records");
    assert_eq!(
        names(&output),
        vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
    );
}

#[test]
fn transformed_records_come_back_in_order() {
    let output = splice(upstream(&["one.pug", "two.pug"]), |feed| {
        feed.map(|mut record| {
            record.set_extension("html");
            record.set_contents(b"<p></p>".to_vec());
            Ok(record)
        })
    })
    .expect("spawn")
    .collect::<Result<Vec<_>, _>>()
    .expect("records");

    assert_eq!(
        names(&output),
        vec![PathBuf::from("one.html"), PathBuf::from("two.html")]
    );
    assert!(output.iter().all(|r| r.contents() == Some(&b"<p></p>"[..])));
}

#[test]
fn sub_pipeline_may_expand_and_filter() {
    let output = splice(upstream(&["keep.scss", "drop.txt"]), |feed| {
        feed.filter(|record| record.path().extension().is_some_and(|ext| ext == "scss"))
            .flat_map(|record| {
                let mut css = record.clone();
                css.set_extension("css");
                let mut map = record;
                map.set_extension("css.map");
                [Ok(css), Ok(map)]
            })
    })
    .expect("spawn")
    .collect::<Result<Vec<_>, _>>()
    .expect("records");

    assert_eq!(
        names(&output),
        vec![PathBuf::from("keep.css"), PathBuf::from("keep.css.map")]
    );
}

#[test]
fn buffered_output_is_flushed_after_input_closes() {
    let output = splice(upstream(&["a", "b", "c"]), |feed| {
        let mut all: Vec<_> = feed.collect();
        all.reverse();
        all.into_iter().map(Ok)
    })
    .expect("spawn")
    .collect::<Result<Vec<_>, _>>()
    .expect("records");
    assert_eq!(
        names(&output),
        vec![PathBuf::from("c"), PathBuf::from("b"), PathBuf::from("a")]
    );
}

#[test]
fn empty_upstream_finishes_cleanly() {
    let mut spliced = splice(Vec::<Result<FileRecord, StageError>>::new(), |feed| feed.map(Ok))
        .expect("spawn");
    assert!(spliced.next().is_none());
    assert!(spliced.next().is_none());
}

#[test]
fn stage_error_is_reported_once_and_fuses() {
    let mut spliced = splice(upstream(&["ok", "bad", "never"]), |feed| {
        feed.map(|record| {
            if record.relative() == Path::new("bad") {
                Err(StageError::from(io::Error::other("cannot render bad")))
            } else {
                Ok(record)
            }
        })
    })
    .expect("spawn");

    let first = spliced.next().expect("first").expect("ok record");
    assert_eq!(first.relative(), Path::new("ok"));

    let error = spliced.next().expect("error item").unwrap_err();
    assert!(matches!(error, SpliceError::Stage(_)));
    assert_eq!(error.to_string(), "sub-pipeline failed: cannot render bad");

    assert!(spliced.next().is_none());
    assert!(spliced.next().is_none());
}

#[test]
fn upstream_error_passes_through() {
    let items: Vec<Result<FileRecord, io::Error>> =
        vec![Ok(record("a")), Err(io::Error::other("glob failed"))];
    let mut spliced = splice(items, |feed| feed.map(Ok)).expect("spawn");

    assert!(spliced.next().expect("first").is_ok());
    let error = spliced.next().expect("error item").unwrap_err();
    assert!(matches!(error, SpliceError::Upstream(_)));
    assert!(spliced.next().is_none());
}

#[test]
fn worker_panic_is_reported() {
    let mut spliced = splice(upstream(&["a"]), |feed| {
        feed.map(|_record| -> StageResult { panic!("stage exploded") })
    })
    .expect("spawn");
    let error = spliced.next().expect("error item").unwrap_err();
    assert!(matches!(error, SpliceError::WorkerPanicked));
    assert!(spliced.next().is_none());
}

#[test]
fn submissions_while_busy_are_queued_in_order() {
    let mut session = SpliceSession::spawn(|feed| feed.map(Ok)).expect("spawn");
    assert_eq!(session.hand_off(), HandOff::AwaitingResult);

    for name in ["a", "b", "c"] {
        session.submit(record(name)).expect("submit");
    }
    assert_eq!(session.queued(), 3);
    assert_eq!(session.admitted(), 0);
    session.close();

    let mut seen = Vec::new();
    loop {
        match session.next_event().expect("event") {
            SpliceEvent::Output(record) => {
                assert!(session.admitted() <= session.emitted() + 1);
                seen.push(record.relative());
            }
            SpliceEvent::NeedsInput => panic!("closed session asked for input"),
            SpliceEvent::Finished => break,
        }
    }
    assert_eq!(
        seen,
        vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
    );
    assert_eq!(session.queued(), 0);
    assert_eq!(session.emitted(), 3);
}

#[test]
fn idle_session_asks_for_input_and_rejects_after_close() {
    let mut session = SpliceSession::spawn(|feed| feed.map(Ok)).expect("spawn");
    assert!(matches!(
        session.next_event().expect("event"),
        SpliceEvent::NeedsInput
    ));
    assert_eq!(session.hand_off(), HandOff::Idle);

    session.submit(record("a")).expect("submit");
    assert_eq!(session.hand_off(), HandOff::AwaitingResult);
    assert_eq!(session.queued(), 0);
    assert!(matches!(
        session.next_event().expect("event"),
        SpliceEvent::Output(_)
    ));

    session.close();
    assert!(session.is_closing());
    assert!(matches!(session.submit(record("b")), Err(SpliceError::Closed)));
    assert!(matches!(
        session.next_event().expect("event"),
        SpliceEvent::Finished
    ));
    assert!(matches!(
        session.next_event().expect("event"),
        SpliceEvent::Finished
    ));
}

#[test]
fn at_most_one_record_is_in_flight() {
    let pulled = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&pulled);
    let spliced = splice(upstream(&["a", "b", "c", "d", "e"]), move |feed| {
        feed.inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .map(Ok)
    })
    .expect("spawn");

    let mut received = 0;
    for item in spliced {
        item.expect("record");
        received += 1;
        assert!(pulled.load(Ordering::SeqCst) <= received + 1);
    }
    assert_eq!(received, 5);
    assert_eq!(pulled.load(Ordering::SeqCst), 5);
}

#[test]
fn dropping_mid_stream_stops_the_worker() {
    let mut spliced = splice(upstream(&["a", "b", "c"]), |feed| feed.map(Ok)).expect("spawn");
    assert!(spliced.next().is_some());
    assert_eq!(spliced.session().emitted(), 1);
    drop(spliced);
}

#[test]
fn sub_pipeline_that_stops_reading_ends_the_splice() {
    let output = splice(upstream(&["a", "b", "c"]), |feed| feed.take(1).map(Ok))
        .expect("spawn")
        .collect::<Result<Vec<_>, _>>()
        .expect("records");
    assert_eq!(names(&output), vec![PathBuf::from("a")]);
}
