use stagehand_core::{EngineConfig, TransferMode};
use stagehand_ops::{
    Clipboard, History, ItemOutcome, OperationEvent, OperationType, RecordKind, Session, SkipReason,
    UndoOutcome, start_paste,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sandbox() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("dest");
    fs::create_dir(&dest).unwrap();
    (dir, dest)
}

fn write(path: &Path, contents: &str) -> PathBuf {
    fs::write(path, contents).unwrap();
    path.to_path_buf()
}

fn session() -> Session {
    Session::new(&EngineConfig::default().with_trash(false))
}

#[test]
fn test_stage_copy_then_commit_keeps_clipboard() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");

    let mut clipboard = Clipboard::new();
    clipboard.stage_copy([&a]);
    let report = clipboard.commit(&dest);

    assert_eq!(report.pairs(), vec![(a.clone(), dest.join("a.txt"))]);
    assert!(clipboard.has_staged());
    assert_eq!(clipboard.mode(), Some(TransferMode::Copy));
    assert!(a.exists());
}

#[test]
fn test_stage_cut_then_commit_clears_clipboard() {
    let (dir, dest) = sandbox();
    let b = write(&dir.path().join("b.txt"), "b");

    let mut clipboard = Clipboard::new();
    clipboard.stage_cut([&b]);
    let report = clipboard.commit(&dest);

    assert_eq!(report.pairs(), vec![(b.clone(), dest.join("b.txt"))]);
    assert!(!b.exists());
    assert!(!clipboard.has_staged());
}

#[test]
fn test_repeated_paste_numbers_conflicts() {
    let (dir, dest) = sandbox();
    let file = write(&dir.path().join("name.ext"), "x");

    let mut clipboard = Clipboard::new();
    clipboard.stage_copy([&file]);

    let names: Vec<PathBuf> = (0..3)
        .flat_map(|_| clipboard.commit(&dest).pairs())
        .map(|(_, to)| to)
        .collect();

    assert_eq!(
        names,
        vec![
            dest.join("name.ext"),
            dest.join("name (1).ext"),
            dest.join("name (2).ext"),
        ]
    );
}

#[test]
fn test_conflict_counter_is_per_item() {
    let (dir, dest) = sandbox();
    write(&dest.join("a.txt"), "old a");
    write(&dest.join("b.txt"), "old b");
    let a = write(&dir.path().join("a.txt"), "a");
    let b = write(&dir.path().join("b.txt"), "b");

    let mut clipboard = Clipboard::new();
    clipboard.stage_copy([&a, &b]);
    let report = clipboard.commit(&dest);

    assert_eq!(
        report.pairs(),
        vec![(a, dest.join("a (1).txt")), (b, dest.join("b (1).txt"))]
    );
    assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "old a");
}

#[test]
fn test_commit_with_all_sources_gone() {
    let (dir, dest) = sandbox();
    let gone = dir.path().join("gone.txt");

    for mode in [TransferMode::Copy, TransferMode::Move] {
        let mut clipboard = Clipboard::new();
        match mode {
            TransferMode::Copy => clipboard.stage_copy([&gone]),
            TransferMode::Move => clipboard.stage_cut([&gone]),
        }
        let report = clipboard.commit(&dest);

        assert!(report.pairs().is_empty());
        assert!(matches!(
            report.outcomes[0],
            ItemOutcome::Skipped {
                reason: SkipReason::SourceMissing,
                ..
            }
        ));
        assert_eq!(clipboard.mode(), Some(mode));
        assert!(clipboard.has_staged());
    }
}

#[test]
fn test_partial_move_commit_clears_clipboard() {
    let (dir, dest) = sandbox();
    let gone = dir.path().join("gone.txt");
    let kept = write(&dir.path().join("kept.txt"), "kept");

    let mut clipboard = Clipboard::new();
    clipboard.stage_cut([&gone, &kept]);
    let report = clipboard.commit(&dest);

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.pairs(), vec![(kept.clone(), dest.join("kept.txt"))]);
    assert!(matches!(
        report.outcomes[0],
        ItemOutcome::Skipped {
            reason: SkipReason::SourceMissing,
            ..
        }
    ));
    assert!(!kept.exists());
    assert!(!clipboard.has_staged());
}

#[test]
fn test_commit_into_missing_destination_skips_every_item() {
    let (dir, _) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");
    let b = write(&dir.path().join("b.txt"), "b");

    let mut clipboard = Clipboard::new();
    clipboard.stage_cut([&a, &b]);
    let report = clipboard.commit(dir.path().join("nowhere"));

    assert!(report.pairs().is_empty());
    assert_eq!(report.skipped(), 2);
    // The sources are intact, so these are not stale-source skips.
    assert!(report.outcomes.iter().all(|o| matches!(
        o,
        ItemOutcome::Skipped {
            reason: SkipReason::Failed { .. },
            ..
        }
    )));
    assert!(a.exists() && b.exists());
    assert!(clipboard.has_staged());
}

#[test]
fn test_move_directory_into_itself_is_skipped() {
    let (dir, _) = sandbox();
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join("inner")).unwrap();

    let mut clipboard = Clipboard::new();
    clipboard.stage_cut([&tree]);
    let report = clipboard.commit(tree.join("inner"));

    assert_eq!(report.skipped(), 1);
    assert!(tree.join("inner").is_dir());
}

#[test]
fn test_history_bound_keeps_most_recent() {
    let mut history = History::new(3);
    for n in 0..4 {
        history
            .record_create_file(PathBuf::from(format!("/op{n}")))
            .unwrap();
    }

    let kept: Vec<_> = history
        .iter()
        .map(|record| match &record.kind {
            RecordKind::CreateFile { path } => path.clone(),
            other => panic!("unexpected record {other:?}"),
        })
        .collect();
    assert_eq!(
        kept,
        vec![
            PathBuf::from("/op1"),
            PathBuf::from("/op2"),
            PathBuf::from("/op3")
        ]
    );
}

#[test]
fn test_history_undo_redo_round_trip() {
    let mut history = History::new(10);
    history.record_create_file(PathBuf::from("/a")).unwrap();
    history.record_create_file(PathBuf::from("/b")).unwrap();
    let before = (history.undo_len(), history.redo_len());

    let undone = history.undo().unwrap();
    let redone = history.redo().unwrap();

    assert_eq!(undone, redone);
    assert_eq!((history.undo_len(), history.redo_len()), before);
}

#[test]
fn test_session_copy_paste_undo_redo() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");

    let mut session = session();
    session.copy([&a]);
    session.paste(&dest);
    let pasted = dest.join("a.txt");
    assert!(pasted.exists());

    let UndoOutcome::Applied { report, .. } = session.undo() else {
        panic!("undo should apply");
    };
    assert_eq!(report.operation_type, OperationType::Delete);
    assert!(!pasted.exists());
    assert!(a.exists());

    assert!(matches!(session.redo(), UndoOutcome::Applied { .. }));
    assert_eq!(fs::read_to_string(&pasted).unwrap(), "a");
}

#[test]
fn test_session_move_undo_restores_sources() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write(&sub.join("inner.txt"), "inner");

    let mut session = session();
    session.cut([&a, &sub]);
    let report = session.paste(&dest);
    assert_eq!(report.succeeded(), 2);
    assert!(!session.clipboard().has_staged());

    session.undo();
    assert!(a.exists());
    assert_eq!(fs::read_to_string(sub.join("inner.txt")).unwrap(), "inner");
    assert!(!dest.join("a.txt").exists());

    session.redo();
    assert!(!a.exists());
    assert!(dest.join("sub/inner.txt").exists());
}

#[test]
fn test_undo_skips_externally_removed_destination() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");
    let b = write(&dir.path().join("b.txt"), "b");

    let mut session = session();
    session.copy([&a, &b]);
    session.paste(&dest);
    fs::remove_file(dest.join("a.txt")).unwrap();

    let UndoOutcome::Applied { report, .. } = session.undo() else {
        panic!("undo should apply");
    };
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.skipped(), 1);
    assert!(!dest.join("b.txt").exists());
}

#[test]
fn test_new_operation_clears_redo() {
    let (dir, _) = sandbox();
    let mut session = session();

    session.create_file(&dir.path().join("one.txt")).unwrap();
    session.undo();
    assert!(session.history().can_redo());

    session.create_directory(&dir.path().join("two")).unwrap();
    assert!(!session.history().can_redo());
}

#[test]
fn test_disabled_history_never_undoes() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");

    let mut session = Session::new(&EngineConfig::default().with_history_limit(0));
    session.copy([&a]);
    session.paste(&dest);

    assert!(matches!(session.undo(), UndoOutcome::Nothing));
    assert!(dest.join("a.txt").exists());
}

#[tokio::test]
async fn test_start_paste_reports_progress() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "aaa");
    let b = write(&dir.path().join("b.txt"), "bb");

    let mut clipboard = Clipboard::new();
    clipboard.stage_copy([&a, &b]);
    let batch = clipboard.begin_commit().unwrap();

    let mut rx = start_paste(batch, dest.clone());
    let mut progress_events = 0;
    let mut report = None;
    while let Some(event) = rx.recv().await {
        match event {
            OperationEvent::Progress(_) => progress_events += 1,
            OperationEvent::Complete(done) => report = Some(done),
            OperationEvent::Unsupported(e) => panic!("unexpected: {e}"),
        }
    }

    let report = report.unwrap();
    assert_eq!(progress_events, 2);
    assert_eq!(report.bytes_processed(), 5);
    assert_eq!(report.summary(), "Copied 2 items");
    clipboard.finish_commit(&report);
    assert!(clipboard.has_staged());
}

#[tokio::test]
async fn test_session_paste_with_progress_records() {
    let (dir, dest) = sandbox();
    let a = write(&dir.path().join("a.txt"), "a");

    let mut session = session();
    session.cut([&a]);

    let mut seen = Vec::new();
    let report = session
        .paste_with_progress(&dest, |progress| seen.push(progress.current.clone()))
        .await;

    assert_eq!(report.pairs(), vec![(a.clone(), dest.join("a.txt"))]);
    assert_eq!(seen, vec![Some(a)]);
    assert!(!session.clipboard().has_staged());
    assert!(session.history().can_undo());
}
