//! Human-readable output with colors.

use colored::Colorize;
use rebind_core::{BatchResult, ExportReport, Program, SymbolId};

pub fn format_exports(report: &ExportReport) -> String {
    let mut output = String::new();

    for entry in &report.entries {
        output.push_str(&format!(
            "{}: {} {}\n",
            entry.position,
            "unused export".yellow(),
            entry.name.bold()
        ));
    }

    if report.is_empty() {
        output.push_str(&format!(
            "{} no unused exports among {} exported declaration(s)\n",
            "ok:".green().bold(),
            report.exported
        ));
    } else {
        output.push_str(&format!(
            "\nFound {} unused export(s) among {} exported declaration(s)\n",
            report.entries.len(),
            report.exported
        ));
    }

    output
}

pub fn format_batch(result: &BatchResult) -> String {
    let mut output = String::new();

    for applied in &result.applied {
        output.push_str(&format!(
            "{} {} -> {}\n",
            "renamed".green().bold(),
            applied.from,
            applied.to
        ));
        for note in &applied.notes {
            output.push_str(&format!("  {} {}\n", "note:".cyan(), note));
        }
    }

    for rejected in &result.rejected {
        output.push_str(&format!(
            "{} {} -> {}\n",
            "rejected".red().bold(),
            rejected.from,
            rejected.to
        ));
        match rejected.error.report() {
            Some(report) => {
                for conflict in &report.conflicts {
                    output.push_str(&format!("  {conflict}\n"));
                    if let Some(other) = &conflict.other_position {
                        output.push_str(&format!("  {} {}\n", "-->".blue(), other));
                    }
                }
            }
            None => output.push_str(&format!("  {}\n", rejected.error)),
        }
        if rejected.error.needs_wider_snapshot() {
            output.push_str(&format!(
                "  {} reload the snapshot with the packages above and retry\n",
                "help:".green()
            ));
        }
    }

    if !result.touched.edits.is_empty() {
        output.push('\n');
        for edit in &result.touched.edits {
            output.push_str(&format!(
                "{}:{}:{}: {} -> {}\n",
                edit.filename,
                edit.line,
                edit.column,
                edit.old.dimmed(),
                edit.new
            ));
        }
    }

    if result.aborted {
        output.push_str(&format!(
            "\n{} batch aborted; no files should be written\n",
            "error:".red().bold()
        ));
    } else {
        output.push_str(&format!(
            "\nRenamed {} symbol group(s) in {} file(s), {} rejected\n",
            result.applied.len(),
            result.touched.filenames.len(),
            result.rejected.len()
        ));
    }

    output
}

pub fn format_resolved(program: &Program, symbols: &[SymbolId]) -> String {
    let mut output = String::new();

    for &id in symbols {
        let symbol = program.symbol(id);
        let location = program
            .symbol_position(id)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(no declaring occurrence)".to_string());
        let package = symbol
            .package
            .map(|p| program.package(p).path.as_str())
            .unwrap_or("");
        output.push_str(&format!(
            "{}: {} {} {}\n",
            location,
            symbol.kind.describe(),
            symbol.name.bold(),
            package.dimmed()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebind_core::ast::Pos;
    use rebind_core::{RenameRequest, Session, SessionOptions};

    fn program() -> (Program, SymbolId, SymbolId) {
        let mut b = rebind_core::ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let helper = b.func(unit, "Helper", Pos::new(3, 6)).symbol;
        let other = b.func(unit, "Other", Pos::new(5, 6)).symbol;
        (b.build(), helper, other)
    }

    #[test]
    fn exports_lists_each_entry_then_a_summary() {
        colored::control::set_override(false);
        let (program, _, _) = program();
        let report = rebind_core::ExportAnalyzer::new(&program)
            .analyze(&program.packages().map(|p| p.id).collect::<Vec<_>>());

        let text = format_exports(&report);

        assert_eq!(
            text,
            "a/a.go:3:6: unused export Helper\n\
             a/a.go:5:6: unused export Other\n\
             \n\
             Found 2 unused export(s) among 2 exported declaration(s)\n"
        );
    }

    #[test]
    fn batch_shows_conflicts_with_both_positions() {
        colored::control::set_override(false);
        let (program, helper, _) = program();
        let mut session = Session::new(program, SessionOptions::default());

        let result = session.rename(vec![RenameRequest::new(vec![helper], "Other")]);
        let text = format_batch(&result);

        assert!(text.starts_with("rejected Helper -> Other\n"));
        assert!(text.contains("  a/a.go:3:6: renaming this func \"Helper\""));
        assert!(text.contains("  --> a/a.go:5:6\n"));
        assert!(text.contains("batch aborted"));
    }

    #[test]
    fn batch_lists_edits() {
        colored::control::set_override(false);
        let (program, helper, _) = program();
        let mut session = Session::new(program, SessionOptions::default());

        let result = session.rename(vec![RenameRequest::new(vec![helper], "helper")]);
        let text = format_batch(&result);

        assert!(text.contains("renamed Helper -> helper\n"));
        assert!(text.contains("a/a.go:3:6: Helper -> helper\n"));
        assert!(text.ends_with("Renamed 1 symbol group(s) in 1 file(s), 0 rejected\n"));
    }

    #[test]
    fn resolved_symbols_show_declaration() {
        colored::control::set_override(false);
        let (program, helper, _) = program();

        let text = format_resolved(&program, &[helper]);

        assert_eq!(text, "a/a.go:3:6: func Helper example.com/a\n");
    }
}
