//! Integration tests for checking and applying renames across packages.

mod common;

use insta::assert_json_snapshot;
use rebind_core::rename::{Checker, ConflictKind, RenameRequest, apply};
use rebind_core::resolve_at;

#[test]
fn rename_rewrites_every_package() {
    let mut fixture = common::shapes();
    let targets = resolve_at(&fixture.program, "app/main.go", 6, 9).unwrap();
    assert_eq!(targets, vec![fixture.new_square.symbol]);
    let request = RenameRequest::new(targets, "MakeSquare");

    let mut checker = Checker::new(&fixture.program);
    checker.register_all();
    let report = checker.check(&request);
    assert!(!report.has_conflicts());

    let packages = [fixture.shapes, fixture.app];
    let touched = apply(
        &mut fixture.program,
        &packages,
        &report.edit_set(&request),
        &request.new_name,
    );

    assert_json_snapshot!(touched, @r#"
    {
      "filenames": [
        "app/main.go",
        "shapes/shapes.go"
      ],
      "edits": [
        {
          "filename": "app/main.go",
          "line": 6,
          "column": 9,
          "old": "NewSquare",
          "new": "MakeSquare"
        },
        {
          "filename": "shapes/shapes.go",
          "line": 17,
          "column": 6,
          "old": "NewSquare",
          "new": "MakeSquare"
        }
      ]
    }
    "#);
}

#[test]
fn collision_with_sibling_declaration_is_reported_once() {
    let fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program);
    checker.register_all();

    let report = checker.check(&RenameRequest::new(
        vec![fixture.unused.symbol],
        "NewSquare",
    ));

    assert_json_snapshot!(report.conflicts, @r#"
    [
      {
        "kind": "scope_collision",
        "position": {
          "filename": "shapes/shapes.go",
          "line": 19,
          "column": 6
        },
        "other_position": {
          "filename": "shapes/shapes.go",
          "line": 17,
          "column": 6
        },
        "message": "renaming this func \"Unused\" to \"NewSquare\" conflicts with func \"NewSquare\" declared at shapes/shapes.go:17:6"
      }
    ]
    "#);
}

#[test]
fn unexporting_a_used_function_breaks_importers() {
    let fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program);
    checker.register_all();

    let report = checker.check(&RenameRequest::new(
        vec![fixture.new_square.symbol],
        "newSquare",
    ));

    let kinds: Vec<ConflictKind> = report.conflicts.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ConflictKind::Visibility]);
    assert!(report.conflicts[0].message.contains("example.com/app"));
}

#[test]
fn interface_method_rename_needs_implementation() {
    let fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program);
    checker.register_all();

    let report = checker.check(&RenameRequest::new(vec![fixture.shape_area], "Size"));

    assert!(report.method_scope);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].kind, ConflictKind::InterfaceBreak);
    assert_eq!(report.conflicts[0].other, Some(fixture.square_area.symbol));
}

#[test]
fn widened_rename_keeps_satisfaction() {
    let mut fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program).widen_methods(true);
    checker.register_all();
    let request = RenameRequest::new(vec![fixture.shape_area], "Size");

    let report = checker.check(&request);
    assert!(!report.has_conflicts());
    assert_eq!(report.widened, vec![fixture.square_area.symbol]);

    let edit = report.edit_set(&request);
    let packages = [fixture.shapes, fixture.app];
    apply(&mut fixture.program, &packages, &edit, "Size");

    let mut after = Checker::new(&fixture.program);
    after.register_all();
    assert!(after.method_sets().satisfies(fixture.square, fixture.shape));
    assert_eq!(fixture.program.symbol(fixture.square_area.symbol).name, "Size");
}

#[test]
fn field_rename_onto_method_name_collides() {
    let fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program);
    checker.register_all();

    let report = checker.check(&RenameRequest::new(vec![fixture.side], "Area"));

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].kind, ConflictKind::SelectorCollision);
    assert_eq!(
        report.conflicts[0].message,
        "renaming this field \"Side\" to \"Area\" conflicts with method \"Area\" of type \"Square\" declared at shapes/shapes.go:11:17"
    );
}

#[test]
fn checking_only_the_declaring_package_flags_importers() {
    let fixture = common::shapes();
    let mut checker = Checker::new(&fixture.program);
    checker.register_package(fixture.shapes);

    let report = checker.check(&RenameRequest::new(
        vec![fixture.new_square.symbol],
        "MakeSquare",
    ));

    assert!(report.touches_unregistered());
    assert!(report.conflicts[0].message.contains("\"example.com/app\""));
}
