//! Job pipeline tests: count → schedule → pool → aggregate → archive.
//!
//! All tests use the fake renderer from `common`, so they run without pdfium.

mod common;

use common::{FakeRenderer, Recorder, Workspace};
use edgequake_pdfwatch::{process_job, Job, JobError, MoveError, Outcome};
use std::sync::atomic::Ordering;
use std::sync::Arc;

// ── Scenario A: every page renders ───────────────────────────────────────────

#[tokio::test]
async fn three_page_document_is_rendered_and_processed() {
    let ws = Workspace::new(4);
    let renderer = FakeRenderer::new();
    let src = ws.drop_document("report.pdf", "FAKEDOC pages=3");

    let report = process_job(Job::new(&src), &ws.context(Arc::clone(&renderer))).await;

    assert_eq!(report.outcome, Outcome::Processed);
    let result = report.result.as_ref().expect("document should open");
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.success_count, 3);
    assert_eq!(result.fail_count, 0);
    assert!(result.is_success());

    assert_eq!(
        ws.outputs(),
        vec![
            "report_page_0001.png",
            "report_page_0002.png",
            "report_page_0003.png"
        ]
    );
    assert_eq!(ws.processed(), vec!["report.pdf"]);
    assert!(ws.errors().is_empty());
    assert!(ws.inputs().is_empty());
    assert_eq!(
        report.archived.as_ref().unwrap(),
        &ws.config.processed_dir.join("report.pdf")
    );

    // Each page opened its own copy of the document.
    assert_eq!(renderer.count_calls.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.render_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn output_images_are_real_pngs_at_scale() {
    let ws = Workspace::new(2);
    let src = ws.drop_document("scan.pdf", "FAKEDOC pages=1");

    process_job(Job::new(&src), &ws.context(FakeRenderer::new())).await;

    let img = image::open(ws.config.output_dir.join("scan_page_0001.png")).unwrap();
    // 8 px fake page × default 2.0 scale.
    assert_eq!((img.width(), img.height()), (16, 16));
}

// ── Scenario B: document does not open ───────────────────────────────────────

#[tokio::test]
async fn unparsable_document_goes_to_error_without_page_tasks() {
    let ws = Workspace::new(4);
    let renderer = FakeRenderer::new();
    let recorder = Arc::new(Recorder::default());
    let src = ws.drop_document("garbage.pdf", "this is not a document");

    let ctx = ws
        .context(Arc::clone(&renderer))
        .with_progress(Arc::clone(&recorder) as _);
    let report = process_job(Job::new(&src), &ctx).await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(matches!(report.result, Err(JobError::DocumentOpen { .. })));
    assert_eq!(renderer.render_calls.load(Ordering::SeqCst), 0);
    assert!(recorder.counted.lock().unwrap().is_empty());
    assert!(recorder.pages.lock().unwrap().is_empty());
    assert_eq!(*recorder.completed.lock().unwrap(), vec!["garbage.pdf"]);

    assert!(ws.outputs().is_empty());
    assert_eq!(ws.errors(), vec!["garbage.pdf"]);
    assert!(ws.processed().is_empty());
    assert!(ws.inputs().is_empty());
}

#[tokio::test]
async fn vanished_document_is_a_read_failure() {
    let ws = Workspace::new(1);
    let src = ws.config.input_dir.join("gone.pdf");

    let report = process_job(Job::new(&src), &ws.context(FakeRenderer::new())).await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(matches!(report.result, Err(JobError::DocumentRead { .. })));
    assert!(matches!(report.archived, Err(MoveError::Rename { .. })));
}

// ── Scenario C: one page fails ───────────────────────────────────────────────

#[tokio::test]
async fn one_failed_page_routes_document_to_error() {
    let ws = Workspace::new(3);
    let recorder = Arc::new(Recorder::default());
    let src = ws.drop_document("paper.pdf", "FAKEDOC pages=3 fail=2");

    let ctx = ws
        .context(FakeRenderer::new())
        .with_progress(Arc::clone(&recorder) as _);
    let report = process_job(Job::new(&src), &ctx).await;

    let result = report.result.as_ref().unwrap();
    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 1);
    assert!(!result.is_success());
    assert_eq!(report.outcome, Outcome::Error);

    assert_eq!(
        ws.outputs(),
        vec!["paper_page_0001.png", "paper_page_0003.png"]
    );
    assert_eq!(ws.errors(), vec!["paper.pdf"]);
    assert!(ws.processed().is_empty());
    assert_eq!(
        *recorder.pages.lock().unwrap(),
        vec![(1, true), (2, false), (3, true)]
    );
}

// ── Ordering and isolation ───────────────────────────────────────────────────

#[tokio::test]
async fn results_follow_page_order_not_completion_order() {
    let ws = Workspace::new(4);
    let renderer = FakeRenderer::new();
    let recorder = Arc::new(Recorder::default());
    let src = ws.drop_document(
        "slow_first.pdf",
        "FAKEDOC pages=4 delay=1:300,2:200,3:100,4:0",
    );

    let ctx = ws
        .context(Arc::clone(&renderer))
        .with_progress(Arc::clone(&recorder) as _);
    process_job(Job::new(&src), &ctx).await;

    let order: Vec<usize> = recorder.pages.lock().unwrap().iter().map(|p| p.0).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);

    // With four workers the later, faster pages really did finish first.
    let completed = renderer.completion_order.lock().unwrap().clone();
    assert_eq!(completed.len(), 4);
    assert_ne!(completed, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn panicking_page_does_not_affect_siblings() {
    let ws = Workspace::new(2);
    let recorder = Arc::new(Recorder::default());
    let src = ws.drop_document("crashy.pdf", "FAKEDOC pages=4 panic=3");

    let ctx = ws
        .context(FakeRenderer::new())
        .with_progress(Arc::clone(&recorder) as _);
    let report = process_job(Job::new(&src), &ctx).await;

    let result = report.result.as_ref().unwrap();
    assert_eq!(result.total_pages, 4);
    assert_eq!(result.success_count, 3);
    assert_eq!(result.fail_count, 1);
    assert_eq!(
        *recorder.pages.lock().unwrap(),
        vec![(1, true), (2, true), (3, false), (4, true)]
    );
    assert_eq!(ws.outputs().len(), 3);
    assert_eq!(ws.errors(), vec!["crashy.pdf"]);
}

#[tokio::test]
async fn encode_failure_is_captured_per_page() {
    let ws = Workspace::new(2);
    std::fs::remove_dir(&ws.config.output_dir).unwrap();
    let src = ws.drop_document("nowhere.pdf", "FAKEDOC pages=2");

    let report = process_job(Job::new(&src), &ws.context(FakeRenderer::new())).await;

    let result = report.result.as_ref().unwrap();
    assert_eq!(result.fail_count, 2);
    assert_eq!(report.outcome, Outcome::Error);
    assert_eq!(ws.errors(), vec!["nowhere.pdf"]);
}

#[tokio::test]
async fn worker_count_bounds_parallelism() {
    let ws = Workspace::new(2);
    let renderer = FakeRenderer::new();
    let src = ws.drop_document(
        "wide.pdf",
        "FAKEDOC pages=8 delay=1:40,2:40,3:40,4:40,5:40,6:40,7:40,8:40",
    );

    let report = process_job(Job::new(&src), &ws.context(Arc::clone(&renderer))).await;

    assert_eq!(report.outcome, Outcome::Processed);
    assert!(renderer.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(ws.outputs().len(), 8);
}

// ── Edge cases ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_page_document_is_processed() {
    let ws = Workspace::new(2);
    let src = ws.drop_document("blank.pdf", "FAKEDOC pages=0");

    let report = process_job(Job::new(&src), &ws.context(FakeRenderer::new())).await;

    assert_eq!(report.outcome, Outcome::Processed);
    assert_eq!(report.result.as_ref().unwrap().total_pages, 0);
    assert!(ws.outputs().is_empty());
    assert_eq!(ws.processed(), vec!["blank.pdf"]);
}

#[tokio::test]
async fn archive_collision_keeps_both_documents() {
    let ws = Workspace::new(2);
    std::fs::write(ws.config.processed_dir.join("dup.pdf"), b"earlier run").unwrap();
    let src = ws.drop_document("dup.pdf", "FAKEDOC pages=1");

    let report = process_job(Job::new(&src), &ws.context(FakeRenderer::new())).await;

    assert_eq!(
        report.archived.as_ref().unwrap(),
        &ws.config.processed_dir.join("dup_1.pdf")
    );
    assert_eq!(ws.processed(), vec!["dup.pdf", "dup_1.pdf"]);
    assert!(ws.inputs().is_empty());
}

#[tokio::test]
async fn rerun_overwrites_page_images() {
    let ws = Workspace::new(2);
    let ctx = ws.context(FakeRenderer::new());

    let src = ws.drop_document("again.pdf", "FAKEDOC pages=2");
    process_job(Job::new(&src), &ctx).await;
    let src = ws.drop_document("again.pdf", "FAKEDOC pages=2");
    process_job(Job::new(&src), &ctx).await;

    assert_eq!(ws.outputs(), vec!["again_page_0001.png", "again_page_0002.png"]);
    assert_eq!(ws.processed(), vec!["again.pdf", "again_1.pdf"]);
}
