//! End-to-end batches: analyze exports, then unexport or rename them.

mod common;

use common::lower_first;
use insta::{assert_json_snapshot, assert_snapshot};
use rebind_core::rename::ConflictKind;
use rebind_core::{
    BatchMode, ConflictPolicy, Outcome, RenameError, RenameRequest, Session, SessionOptions,
};

fn render_edits(result: &rebind_core::BatchResult) -> String {
    result
        .touched
        .edits
        .iter()
        .map(|e| format!("{}:{}:{} {} -> {}\n", e.filename, e.line, e.column, e.old, e.new))
        .collect()
}

#[test]
fn unexporting_with_widening_renames_implementations_once() {
    let fixture = common::shapes();
    let options = SessionOptions {
        widen_methods: true,
        ..SessionOptions::default()
    };
    let mut session = Session::new(fixture.program, options);

    let report = session.unused_exports(&[fixture.shapes]);
    let result = session.unexport(&report, lower_first);

    assert_eq!(result.outcome(), Outcome::Clean);
    assert_json_snapshot!(result.applied, @r#"
    [
      {
        "from": "Shape",
        "to": "shape",
        "notes": []
      },
      {
        "from": "Area",
        "to": "area",
        "notes": []
      },
      {
        "from": "Side",
        "to": "side",
        "notes": []
      },
      {
        "from": "Scale",
        "to": "scale",
        "notes": []
      },
      {
        "from": "Unused",
        "to": "unused",
        "notes": []
      },
      {
        "from": "Version",
        "to": "version",
        "notes": []
      }
    ]
    "#);
    assert_snapshot!(render_edits(&result).trim_end(), @r"
    shapes/shapes.go:3:6 Shape -> shape
    shapes/shapes.go:4:2 Area -> area
    shapes/shapes.go:8:2 Side -> side
    shapes/shapes.go:11:17 Area -> area
    shapes/shapes.go:14:2 Scale -> scale
    shapes/shapes.go:19:6 Unused -> unused
    shapes/shapes.go:21:7 Version -> version
    ");
    assert_eq!(result.touched.filenames, vec!["shapes/shapes.go"]);
}

#[test]
fn unexporting_without_widening_stops_at_the_interface() {
    let fixture = common::shapes();
    let mut session = Session::new(fixture.program, SessionOptions::default());

    let report = session.unused_exports(&[fixture.shapes]);
    let result = session.unexport(&report, lower_first);

    assert_eq!(result.outcome(), Outcome::Failed);
    assert!(result.aborted);
    assert_eq!(result.applied.len(), 1);
    assert_eq!(result.applied[0].to, "shape");

    let rejected = &result.rejected[0];
    assert_eq!(rejected.from, "Area");
    let conflicts = &rejected.error.report().unwrap().conflicts;
    assert_eq!(conflicts[0].kind, ConflictKind::InterfaceBreak);
    assert_eq!(session.program().symbol(fixture.square_area.symbol).name, "Area");
}

#[test]
fn ignore_policy_reports_rejections_and_keeps_going() {
    let fixture = common::shapes();
    let options = SessionOptions {
        conflicts: ConflictPolicy::Ignore,
        ..SessionOptions::default()
    };
    let mut session = Session::new(fixture.program, options);

    let report = session.unused_exports(&[fixture.shapes]);
    let result = session.unexport(&report, lower_first);

    assert_eq!(result.outcome(), Outcome::Findings);
    let rejected: Vec<&str> = result.rejected.iter().map(|r| r.from.as_str()).collect();
    assert_eq!(rejected, vec!["Area", "Area"]);
    let applied: Vec<&str> = result.applied.iter().map(|a| a.to.as_str()).collect();
    assert_eq!(applied, vec!["shape", "side", "scale", "unused", "version"]);
}

#[test]
fn all_or_nothing_batch_leaves_program_untouched() {
    let fixture = common::shapes();
    let options = SessionOptions {
        batch: BatchMode::AllOrNothing,
        ..SessionOptions::default()
    };
    let mut session = Session::new(fixture.program, options);

    let report = session.unused_exports(&[fixture.shapes]);
    let result = session.unexport(&report, lower_first);

    assert!(result.aborted);
    assert!(result.applied.is_empty());
    assert!(result.touched.is_empty());
    assert_eq!(session.program().symbol(fixture.shape).name, "Shape");
}

#[test]
fn narrow_session_asks_for_a_wider_snapshot() {
    let fixture = common::shapes();
    let mut session =
        Session::with_packages(fixture.program, SessionOptions::default(), vec![fixture.shapes]);

    let result = session.rename(vec![RenameRequest::new(
        vec![fixture.new_square.symbol],
        "MakeSquare",
    )]);

    assert_eq!(result.outcome(), Outcome::Failed);
    let error = &result.rejected[0].error;
    assert!(error.needs_wider_snapshot());
    match error {
        RenameError::UnregisteredPackageTouched { packages, .. } => {
            assert_eq!(packages, &vec!["example.com/app".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.program().symbol(fixture.new_square.symbol).name, "NewSquare");
}

#[test]
fn cross_package_rename_touches_importer() {
    let fixture = common::shapes();
    let mut session = Session::new(fixture.program, SessionOptions::default());

    let result = session.rename(vec![RenameRequest::new(
        vec![fixture.new_square.symbol],
        "MakeSquare",
    )]);

    assert_eq!(result.outcome(), Outcome::Clean);
    assert_snapshot!(render_edits(&result).trim_end(), @r"
    app/main.go:6:9 NewSquare -> MakeSquare
    shapes/shapes.go:17:6 NewSquare -> MakeSquare
    ");
}

#[test]
fn repeated_request_in_one_batch_is_rejected_as_self_collision() {
    let fixture = common::shapes();
    let mut session = Session::new(fixture.program, SessionOptions::default());
    let request = RenameRequest::new(vec![fixture.new_square.symbol], "MakeSquare");

    let result = session.rename(vec![request.clone(), request]);

    assert_eq!(result.outcome(), Outcome::Failed);
    assert_eq!(result.applied.len(), 1);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].from, "MakeSquare");
    match &result.rejected[0].error {
        RenameError::ConflictDetected { report, .. } => {
            assert_eq!(report.conflicts.len(), 1);
            assert_eq!(report.conflicts[0].kind, ConflictKind::ScopeCollision);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(render_edits(&result).lines().count(), 2);
}
