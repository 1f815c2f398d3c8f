//! Loading a snapshot from disk and running every stage on it.
//!
//! ```text
//! greet/greet.go                         cmd/main.go
//!  1 package greet                        1 package main
//!  3 func Hello(v any) string {           3 import "example.com/greet"
//!  4     switch x := v.(type) {           5 func main() {
//!  5     case string:                     6     greet.Hello(nil)
//!  6         return x                     7 }
//!  7     }
//!  8     return ""
//!  9 }
//! 11 func Unused() {}
//! ```

use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use rebind_core::rename::{Checker, ConflictKind, RenameRequest, apply};
use rebind_core::{
    ExportAnalyzer, LoadedProgram, ResolveError, Session, SessionOptions, load_snapshot,
    resolve_at,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures")).join(name)
}

fn greet() -> LoadedProgram {
    load_snapshot(&fixture("greet.json")).unwrap()
}

#[test]
fn initial_packages_come_from_the_snapshot() {
    let loaded = greet();

    let paths: Vec<&str> = loaded
        .initial
        .iter()
        .map(|&p| loaded.program.package(p).path.as_str())
        .collect();
    assert_eq!(paths, vec!["example.com/greet"]);
    assert_eq!(loaded.program.packages().count(), 2);
}

#[test]
fn unused_exports_ignore_cross_package_uses() {
    let loaded = greet();

    let report = ExportAnalyzer::new(&loaded.program).analyze(&loaded.initial);

    assert_eq!(report.exported, 2);
    assert_snapshot!(report.render().trim_end(), @"greet/greet.go:11:6: unused export Unused");
}

#[test]
fn type_switch_header_resolves_to_clause_object() {
    let loaded = greet();
    let program = &loaded.program;

    let header = resolve_at(program, "greet/greet.go", 4, 12).unwrap();
    let reference = resolve_at(program, "greet/greet.go", 6, 16).unwrap();

    assert_eq!(header, reference);
    assert!(program.symbol(header[0]).implicit);
}

#[test]
fn renaming_clause_object_rewrites_the_header() {
    let mut loaded = greet();
    let targets = resolve_at(&loaded.program, "greet/greet.go", 6, 16).unwrap();
    let request = RenameRequest::new(targets, "s");

    let mut checker = Checker::new(&loaded.program);
    checker.register_all();
    let report = checker.check(&request);
    assert!(!report.has_conflicts());

    let packages: Vec<_> = loaded.program.packages().map(|p| p.id).collect();
    let touched = apply(
        &mut loaded.program,
        &packages,
        &report.edit_set(&request),
        &request.new_name,
    );

    let edits: Vec<String> = touched
        .edits
        .iter()
        .map(|e| format!("{}:{} {}", e.line, e.column, e.new))
        .collect();
    assert_eq!(edits, vec!["4:12 s", "6:16 s"]);
}

#[test]
fn package_clause_cannot_be_renamed() {
    let loaded = greet();

    let err = resolve_at(&loaded.program, "greet/greet.go", 1, 9).unwrap_err();

    assert_eq!(
        err.to_string(),
        "greet/greet.go:1:9: renaming \"greet\" is not supported: package clause"
    );
}

#[test]
fn predeclared_identifiers_cannot_be_renamed() {
    let loaded = greet();

    let err = resolve_at(&loaded.program, "cmd/main.go", 6, 17).unwrap_err();

    assert_eq!(
        err,
        ResolveError::CannotRenamePredeclared {
            name: "nil".to_string()
        }
    );
}

#[test]
fn missing_occurrence_is_not_found() {
    let loaded = greet();

    let err = resolve_at(&loaded.program, "greet/greet.go", 2, 1).unwrap_err();

    assert!(matches!(err, ResolveError::NotFound { line: 2, column: 1, .. }));
}

#[test]
fn renaming_onto_a_sibling_function_is_rejected() {
    let loaded = greet();
    let targets = resolve_at(&loaded.program, "greet/greet.go", 11, 6).unwrap();

    let mut checker = Checker::new(&loaded.program);
    checker.register_all();
    let report = checker.check(&RenameRequest::new(targets, "Hello"));

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].kind, ConflictKind::ScopeCollision);
    assert_snapshot!(report.render().trim_end(), @r#"greet/greet.go:11:6: renaming this func "Unused" to "Hello" conflicts with func "Hello" declared at greet/greet.go:3:6"#);
}

#[test]
fn session_over_initial_packages_needs_the_importer() {
    let loaded = greet();
    let targets = resolve_at(&loaded.program, "greet/greet.go", 3, 6).unwrap();
    let mut session = Session::with_packages(
        loaded.program,
        SessionOptions::default(),
        loaded.initial.clone(),
    );

    let result = session.rename(vec![RenameRequest::new(targets, "Greet")]);

    assert!(result.rejected[0].error.needs_wider_snapshot());
    assert!(result.touched.is_empty());
}
