//! Conflict and interface-consistency checking.

use std::cell::OnceCell;
use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, instrument};

use super::methodsets::MethodSetCache;
use super::{Conflict, ConflictKind, ConflictReport, RenameRequest};
use crate::ast::IdentId;
use crate::semantic::{
    PackageId, Position, Program, ScopeId, ScopeKind, SymbolId, SymbolKind, is_exported_name,
};

/// Validates rename requests against a set of registered packages.
///
/// The method set cache is built on first use and shared by every request
/// checked through the same checker.
pub struct Checker<'p> {
    program: &'p Program,
    packages: HashSet<PackageId>,
    widen_methods: bool,
    method_sets: OnceCell<MethodSetCache>,
}

/// Why a method outside the request must be renamed with it.
struct Link {
    method: SymbolId,
    required_by: SymbolId,
    interface: SymbolId,
    concrete: SymbolId,
}

impl<'p> Checker<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            packages: HashSet::new(),
            widen_methods: false,
            method_sets: OnceCell::new(),
        }
    }

    /// Let a method rename pull in the methods it must stay consistent with,
    /// as long as they live in registered packages.
    pub fn widen_methods(mut self, widen: bool) -> Self {
        self.widen_methods = widen;
        self
    }

    pub fn register_package(&mut self, package: PackageId) {
        self.packages.insert(package);
    }

    pub fn register_all(&mut self) {
        let all: Vec<PackageId> = self.program.packages().map(|p| p.id).collect();
        self.packages.extend(all);
    }

    pub fn is_registered(&self, package: PackageId) -> bool {
        self.packages.contains(&package)
    }

    pub fn registered(&self) -> Vec<PackageId> {
        let mut packages: Vec<PackageId> = self.packages.iter().copied().collect();
        packages.sort_by(|&a, &b| {
            self.program
                .package(a)
                .path
                .cmp(&self.program.package(b).path)
        });
        packages
    }

    pub fn method_sets(&self) -> &MethodSetCache {
        self.method_sets
            .get_or_init(|| MethodSetCache::build(self.program))
    }

    #[instrument(skip_all, fields(to = %request.new_name, targets = request.targets.len()))]
    pub fn check(&self, request: &RenameRequest) -> ConflictReport {
        let mut edit = Vec::new();
        for &target in &request.targets {
            if !edit.contains(&target) {
                edit.push(target);
            }
        }

        let mut run = Run {
            checker: self,
            program: self.program,
            to: &request.new_name,
            edit,
            report: ConflictReport::default(),
            seen: HashSet::new(),
        };

        run.expand_implicits();
        run.check_methods();
        for symbol in run.edit.clone() {
            run.check_symbol(symbol);
        }

        if run.report.has_conflicts() {
            info!(conflicts = run.report.conflicts.len(), "rename rejected");
        } else {
            debug!(widened = run.report.widened.len(), "rename is safe");
        }
        run.report
    }
}

type SeenKey = (SymbolId, Option<SymbolId>, Option<ConflictKind>);

struct Run<'c, 'p> {
    checker: &'c Checker<'p>,
    program: &'p Program,
    to: &'c str,
    edit: Vec<SymbolId>,
    report: ConflictReport,
    seen: HashSet<SeenKey>,
}

impl Run<'_, '_> {
    fn describe(&self, symbol: SymbolId) -> String {
        let symbol = self.program.symbol(symbol);
        format!("{} \"{}\"", symbol.kind.describe(), symbol.name)
    }

    /// ` declared at <pos>`, or a note for objects with no declaring
    /// occurrence.
    fn declared_at(&self, symbol: SymbolId) -> String {
        match self.program.symbol_position(symbol) {
            Some(position) => format!(" declared at {position}"),
            None if self.program.symbol(symbol).is_predeclared() => " (predeclared)".to_string(),
            None => String::new(),
        }
    }

    fn this(&self, symbol: SymbolId) -> String {
        format!(
            "renaming this {} to \"{}\"",
            self.describe(symbol),
            self.to
        )
    }

    fn widen(&mut self, symbol: SymbolId) {
        if !self.edit.contains(&symbol) {
            self.edit.push(symbol);
            self.report.widened.push(symbol);
        }
    }

    fn conflict(
        &mut self,
        kind: ConflictKind,
        target: SymbolId,
        other: Option<SymbolId>,
        other_position: Option<Position>,
        message: String,
    ) {
        let key = (target, other, other.is_none().then_some(kind));
        if !self.seen.insert(key) {
            return;
        }
        debug!(kind = ?kind, %message, "conflict");
        self.report.conflicts.push(Conflict {
            kind,
            target,
            other,
            position: self.program.symbol_position(target),
            other_position,
            message,
        });
    }

    /// Records a collision with `other` unless it is renamed as well.
    fn collide(&mut self, kind: ConflictKind, target: SymbolId, other: SymbolId, message: String) {
        if other == target || self.edit.contains(&other) {
            return;
        }
        let position = self.program.symbol_position(other);
        self.conflict(kind, target, Some(other), position, message);
    }

    /// Every clause object of a type switch shares the header identifier,
    /// so renaming one renames them all.
    fn expand_implicits(&mut self) {
        for target in self.edit.clone() {
            let symbol = self.program.symbol(target);
            if !symbol.implicit {
                continue;
            }
            let Some(header) = symbol.decl else {
                continue;
            };
            let siblings: Vec<SymbolId> = self
                .program
                .symbols()
                .all_symbols()
                .filter(|s| s.implicit && s.decl == Some(header) && s.id != target)
                .map(|s| s.id)
                .collect();
            for sibling in siblings {
                self.widen(sibling);
            }
        }
    }

    fn check_methods(&mut self) {
        let methods: Vec<SymbolId> = self
            .edit
            .iter()
            .copied()
            .filter(|&s| self.program.symbol(s).kind == SymbolKind::Method)
            .collect();
        if methods.is_empty() {
            return;
        }

        let checker = self.checker;
        let method_sets = checker.method_sets();
        self.report.method_scope = methods.iter().any(|&m| {
            self.program
                .symbol(m)
                .owner
                .is_some_and(|owner| method_sets.participates(owner))
        });

        for link in self.method_closure(method_sets, &methods) {
            self.follow_link(link);
        }
        self.note_new_satisfactions(method_sets);
    }

    /// Methods that must share a name with the targets for every current
    /// satisfaction relation to survive, found by walking from each method
    /// to the interfaces its owner satisfies and, for interfaces, to the
    /// types satisfying them.
    fn method_closure(&self, method_sets: &MethodSetCache, methods: &[SymbolId]) -> Vec<Link> {
        let mut seen: HashSet<SymbolId> = self.edit.iter().copied().collect();
        let mut queue: VecDeque<SymbolId> = methods.iter().copied().collect();
        let mut links = Vec::new();

        while let Some(method) = queue.pop_front() {
            let symbol = self.program.symbol(method);
            let Some(owner) = symbol.owner else {
                continue;
            };

            let mut pairs: Vec<(SymbolId, SymbolId)> = method_sets
                .interfaces_satisfied_by(owner)
                .iter()
                .map(|&iface| (iface, owner))
                .collect();
            if self.program.symbol(owner).is_interface() {
                pairs.extend(
                    method_sets
                        .satisfiers_of(owner)
                        .iter()
                        .map(|&ty| (owner, ty)),
                );
            }

            for (interface, concrete) in pairs {
                let neighbour = if interface == owner { concrete } else { interface };
                let Some(other) = method_sets.method(neighbour, &symbol.name) else {
                    continue;
                };
                if seen.insert(other) {
                    links.push(Link {
                        method: other,
                        required_by: method,
                        interface,
                        concrete,
                    });
                    queue.push_back(other);
                }
            }
        }

        links
    }

    fn follow_link(&mut self, link: Link) {
        let other = self.program.symbol(link.method);
        let relation = format!(
            "\"{}\" satisfying \"{}\"",
            self.program.symbol(link.concrete).name,
            self.program.symbol(link.interface).name
        );

        match other.package {
            None => {
                let message = format!(
                    "{} would stop {relation}, which involves predeclared {}",
                    self.this(link.required_by),
                    self.describe(link.method)
                );
                self.conflict(
                    ConflictKind::InterfaceBreak,
                    link.required_by,
                    Some(link.method),
                    None,
                    message,
                );
            }
            Some(package) if !self.checker.is_registered(package) => {
                let message = format!(
                    "{} requires renaming {} in unanalyzed package \"{}\" to keep {relation}",
                    self.this(link.required_by),
                    self.describe(link.method),
                    self.program.package(package).path
                );
                let position = self.program.symbol_position(link.method);
                self.conflict(
                    ConflictKind::UnregisteredPackage,
                    link.required_by,
                    Some(link.method),
                    position,
                    message,
                );
            }
            Some(_) if !self.checker.widen_methods => {
                let message = format!(
                    "{} would stop {relation}; {}{} must be renamed with it",
                    self.this(link.required_by),
                    self.describe(link.method),
                    self.declared_at(link.method)
                );
                let position = self.program.symbol_position(link.method);
                self.conflict(
                    ConflictKind::InterfaceBreak,
                    link.required_by,
                    Some(link.method),
                    position,
                    message,
                );
            }
            Some(_) => {
                debug!(
                    method = %other.name,
                    relation = %relation,
                    "widening rename"
                );
                self.widen(link.method);
            }
        }
    }

    fn note_new_satisfactions(&mut self, method_sets: &MethodSetCache) {
        let renamed: HashSet<SymbolId> = self
            .edit
            .iter()
            .copied()
            .filter(|&s| self.program.symbol(s).kind == SymbolKind::Method)
            .collect();
        let mut owners: Vec<SymbolId> = renamed
            .iter()
            .filter_map(|&m| self.program.symbol(m).owner)
            .collect();
        owners.sort_by_key(|id| id.index());
        owners.dedup();

        let interfaces = method_sets.interfaces(self.program);
        let named = method_sets.named_types();
        let mut pairs = Vec::new();
        for &owner in &owners {
            for &iface in &interfaces {
                pairs.push((owner, iface));
            }
            if self.program.symbol(owner).is_interface() {
                for &ty in &named {
                    pairs.push((ty, owner));
                }
            }
        }

        for (ty, iface) in pairs {
            if ty == iface || method_sets.satisfies(ty, iface) {
                continue;
            }
            if method_sets.satisfies_after_rename(ty, iface, &renamed, self.to) {
                let note = format!(
                    "renaming to \"{}\" makes \"{}\" satisfy \"{}\"",
                    self.to,
                    self.program.symbol(ty).name,
                    self.program.symbol(iface).name
                );
                if !self.report.notes.contains(&note) {
                    self.report.notes.push(note);
                }
            }
        }
    }

    fn check_symbol(&mut self, target: SymbolId) {
        let occurrences = self.program.occurrences(target);
        self.check_registration(target, &occurrences);

        let symbol = self.program.symbol(target);
        if symbol.name == self.to {
            let message = format!(
                "{} conflicts with itself: the name is already bound",
                self.this(target)
            );
            let position = self.program.symbol_position(target);
            self.conflict(
                ConflictKind::ScopeCollision,
                target,
                Some(target),
                position,
                message,
            );
        }

        match symbol.scope {
            Some(scope) => {
                self.check_lexical(target, scope, &occurrences);
                self.check_importers(target, &occurrences);
            }
            None => self.check_selector(target),
        }
        self.check_visibility(target, &occurrences);
    }

    fn check_registration(&mut self, target: SymbolId, occurrences: &[IdentId]) {
        let mut outside: Vec<String> = Vec::new();
        let mut first = None;
        let declaring = self.program.symbol(target).package;

        let packages = declaring.into_iter().map(|p| (p, None)).chain(
            occurrences
                .iter()
                .map(|&i| (self.program.unit(self.program.ident(i).unit).package, Some(i))),
        );
        for (package, ident) in packages {
            if self.checker.is_registered(package) {
                continue;
            }
            let path = self.program.package(package).path.clone();
            if !outside.contains(&path) {
                outside.push(path);
            }
            if first.is_none() {
                first = ident;
            }
        }

        if outside.is_empty() {
            return;
        }
        let quoted: Vec<String> = outside.iter().map(|p| format!("\"{p}\"")).collect();
        let message = format!(
            "{} would affect unanalyzed package {}",
            self.this(target),
            quoted.join(", ")
        );
        let position = first.map(|i| self.program.position(i));
        self.conflict(
            ConflictKind::UnregisteredPackage,
            target,
            None,
            position,
            message,
        );
    }

    fn check_lexical(&mut self, target: SymbolId, scope: ScopeId, occurrences: &[IdentId]) {
        let program = self.program;
        let scopes = program.scopes();
        let symbols = program.symbols();

        let mut neighbours = vec![scope];
        match scopes.get(scope).kind {
            ScopeKind::Package => {
                if let Some(package) = scopes.get(scope).package {
                    neighbours.extend(
                        program
                            .package(package)
                            .units
                            .iter()
                            .map(|&u| program.unit(u).scope),
                    );
                }
            }
            ScopeKind::File => neighbours.extend(scopes.get(scope).parent),
            _ => {}
        }
        for declaring in neighbours {
            if let Some(other) = symbols.lookup_local(self.to, declaring) {
                let message = format!(
                    "{} conflicts with {}{}",
                    self.this(target),
                    self.describe(other),
                    self.declared_at(other)
                );
                self.collide(ConflictKind::ScopeCollision, target, other, message);
            }
        }

        // References to the target that a nearer declaration of the new name
        // would capture.
        for &ident in occurrences {
            let occurrence = program.ident(ident);
            if occurrence.qualified || !scopes.is_descendant_of(occurrence.scope, scope) {
                continue;
            }
            let nearer: Vec<ScopeId> = scopes
                .ancestors(occurrence.scope)
                .take_while(|s| s.id != scope)
                .map(|s| s.id)
                .collect();
            for inner in nearer {
                if let Some(other) = symbols.lookup_local(self.to, inner) {
                    let message = format!(
                        "{} would make the reference at {} resolve to {}{}",
                        self.this(target),
                        program.position(ident),
                        self.describe(other),
                        self.declared_at(other)
                    );
                    self.collide(ConflictKind::Shadowing, target, other, message);
                }
            }
        }

        // References to other declarations of the new name that the renamed
        // target would capture.
        for index in 0..program.ident_count() {
            let ident = IdentId(index as u32);
            let occurrence = program.ident(ident);
            if occurrence.name != self.to || occurrence.qualified {
                continue;
            }
            let Some(other) = program.binding(ident) else {
                continue;
            };
            let Some(other_scope) = program.symbol(other).scope else {
                continue;
            };
            if other_scope != scope
                && scopes.is_descendant_of(scope, other_scope)
                && scopes.is_descendant_of(occurrence.scope, scope)
            {
                let message = format!(
                    "{} would shadow the reference at {} to {}{}",
                    self.this(target),
                    program.position(ident),
                    self.describe(other),
                    self.declared_at(other)
                );
                self.collide(ConflictKind::Shadowing, target, other, message);
            }
        }
    }

    /// Unqualified references from other packages (dot imports) resolve
    /// through the importing file's scope chain, where the new name may
    /// already be taken. Qualified references cannot collide there.
    fn check_importers(&mut self, target: SymbolId, occurrences: &[IdentId]) {
        let program = self.program;
        let home = program.symbol(target).package;

        for &ident in occurrences {
            let occurrence = program.ident(ident);
            let package = program.unit(occurrence.unit).package;
            if occurrence.qualified || Some(package) == home {
                continue;
            }
            let Some(other) = program
                .symbols()
                .lookup(self.to, occurrence.scope, program.scopes())
            else {
                continue;
            };
            if program.symbol(other).is_predeclared() {
                continue;
            }
            let message = format!(
                "{} conflicts with {}{} in importing package \"{}\"",
                self.this(target),
                self.describe(other),
                self.declared_at(other),
                program.package(package).path
            );
            self.collide(ConflictKind::ScopeCollision, target, other, message);
        }
    }

    fn check_selector(&mut self, target: SymbolId) {
        let Some(owner) = self.program.symbol(target).owner else {
            return;
        };
        let clashing: Vec<SymbolId> = self
            .program
            .symbols()
            .members(owner)
            .iter()
            .copied()
            .filter(|&m| self.program.symbol(m).name == self.to)
            .collect();
        for other in clashing {
            let message = format!(
                "{} conflicts with {} of type \"{}\"{}",
                self.this(target),
                self.describe(other),
                self.program.symbol(owner).name,
                self.declared_at(other)
            );
            self.collide(ConflictKind::SelectorCollision, target, other, message);
        }
    }

    fn check_visibility(&mut self, target: SymbolId, occurrences: &[IdentId]) {
        let symbol = self.program.symbol(target);
        if !is_exported_name(&symbol.name) || is_exported_name(self.to) {
            return;
        }
        let Some(home) = symbol.package else {
            return;
        };

        let foreign = occurrences
            .iter()
            .copied()
            .find(|&i| self.program.unit(self.program.ident(i).unit).package != home);
        if let Some(ident) = foreign {
            let package = self.program.unit(self.program.ident(ident).unit).package;
            let message = format!(
                "{} would unexport it while package \"{}\" refers to it at {}",
                self.this(target),
                self.program.package(package).path,
                self.program.position(ident)
            );
            let position = self.program.position(ident);
            self.conflict(
                ConflictKind::Visibility,
                target,
                None,
                Some(position),
                message,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Pos;
    use crate::rename::apply;
    use crate::semantic::ProgramBuilder;

    fn checker(program: &Program) -> Checker<'_> {
        let mut checker = Checker::new(program);
        checker.register_all();
        checker
    }

    #[test]
    fn renaming_onto_sibling_declaration_is_one_conflict() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let foo = b.func(unit, "Foo", Pos::new(3, 6));
        let bar = b.func(unit, "bar", Pos::new(5, 6));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![bar.symbol], "Foo"));

        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::ScopeCollision);
        assert_eq!(conflict.other, Some(foo.symbol));
        assert_eq!(
            conflict.to_string(),
            "a/a.go:5:6: renaming this func \"bar\" to \"Foo\" conflicts with func \"Foo\" declared at a/a.go:3:6"
        );
    }

    #[test]
    fn dot_imported_reference_collides_in_the_importing_file() {
        let mut b = ProgramBuilder::new();
        let lib = b.package("example.com/lib", "lib");
        let lib_unit = b.unit(lib, "lib/lib.go");
        let helper = b.func(lib_unit, "Helper", Pos::new(3, 6));

        let app = b.package("example.com/app", "main");
        let app_unit = b.unit(app, "app/main.go");
        b.import(app, lib);
        let run = b.func(app_unit, "Run", Pos::new(5, 6));
        let main = b.func(app_unit, "main", Pos::new(7, 6));
        let call = b.call_stmt(app_unit, main.scope, helper.symbol, Pos::new(8, 2));
        b.push_stmt(app_unit, main.ident, call);

        let tool = b.package("example.com/tool", "main");
        let tool_unit = b.unit(tool, "tool/main.go");
        let lib_name = b.import_name(tool_unit, lib);
        b.func(tool_unit, "Start", Pos::new(5, 6));
        let main = b.func(tool_unit, "main", Pos::new(7, 6));
        let call = b.qualified_call(tool_unit, main.scope, lib_name, helper.symbol, Pos::new(8, 2));
        b.push_stmt(tool_unit, main.ident, call);
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![helper.symbol], "Run"));

        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::ScopeCollision);
        assert_eq!(conflict.other, Some(run.symbol));
        assert!(conflict.message.ends_with("in importing package \"example.com/app\""));

        let report = checker(&program).check(&RenameRequest::new(vec![helper.symbol], "Start"));

        assert!(!report.has_conflicts());
    }

    #[test]
    fn fresh_name_checks_clean() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let helper = b.func(unit, "Helper", Pos::new(3, 6));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![helper.symbol], "helper"));

        assert!(!report.has_conflicts());
        assert!(!report.method_scope);
    }

    #[test]
    fn renaming_again_to_the_same_name_conflicts_with_itself() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let helper = b.func(unit, "Helper", Pos::new(3, 6));
        let mut program = b.build();
        let request = RenameRequest::new(vec![helper.symbol], "helper");

        assert!(!checker(&program).check(&request).has_conflicts());
        apply(&mut program, &[pkg], &request.targets, &request.new_name);
        let report = checker(&program).check(&request);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::ScopeCollision);
        assert_eq!(report.conflicts[0].other, Some(helper.symbol));
    }

    #[test]
    fn local_declaration_would_capture_reference() {
        // var y int; func f() { x := 0; { _ = y } }  rename x -> y
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let y = b.value(unit, SymbolKind::Variable, "y", None, Pos::new(3, 5));
        let f = b.func(unit, "f", Pos::new(5, 6));
        let (x, _) = b.define(unit, f.scope, "x", SymbolKind::Variable, Pos::new(6, 2));
        let block = b.scope(ScopeKind::Block, f.scope);
        b.refer(unit, block, y, Pos::new(7, 8));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![x], "y"));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::Shadowing);
        assert!(report.conflicts[0].message.contains("would shadow the reference at a/a.go:7:8"));
    }

    #[test]
    fn nearer_declaration_would_capture_target_reference() {
        // var x int; func f() { y := 0; _ = x }  rename x -> y
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let x = b.value(unit, SymbolKind::Variable, "x", None, Pos::new(3, 5));
        let f = b.func(unit, "f", Pos::new(5, 6));
        b.define(unit, f.scope, "y", SymbolKind::Variable, Pos::new(6, 2));
        b.refer(unit, f.scope, x, Pos::new(7, 6));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![x], "y"));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::Shadowing);
        assert!(report.conflicts[0].message.contains("resolve to var \"y\""));
    }

    #[test]
    fn package_level_rename_collides_with_import_name() {
        let mut b = ProgramBuilder::new();
        let fmt = b.package("fmt", "fmt");
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        b.import_name(unit, fmt);
        let helper = b.func(unit, "helper", Pos::new(5, 6));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![helper.symbol], "fmt"));

        assert_eq!(report.conflicts.len(), 1);
        assert!(report.conflicts[0].message.contains("imported package name \"fmt\""));
    }

    #[test]
    fn field_rename_collides_with_method_of_same_type() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let int = b.predeclared("int").unwrap();
        let scope = b.file_scope(unit);
        let t = b.struct_type(unit, "T", Pos::new(3, 6));
        let ty = b.type_name(unit, scope, int, Pos::new(4, 8));
        let count = b.field(unit, t, "count", ty, Pos::new(4, 2));
        b.method(unit, t, "Len", "() int", Pos::new(7, 10));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![count], "Len"));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::SelectorCollision);
    }

    fn runner_program() -> (Program, PackageId, SymbolId, SymbolId) {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let runner = b.interface_type(unit, "Runner", Pos::new(3, 6));
        let iface_run = b.interface_method(unit, runner, "Run", "()", Pos::new(4, 2));
        let job = b.struct_type(unit, "Job", Pos::new(7, 6));
        let job_run = b.method(unit, job, "Run", "()", Pos::new(9, 15));
        (b.build(), pkg, iface_run, job_run.symbol)
    }

    #[test]
    fn method_rename_breaking_satisfaction_is_a_conflict() {
        let (program, _, _, job_run) = runner_program();

        let report = checker(&program).check(&RenameRequest::new(vec![job_run], "Start"));

        assert!(report.method_scope);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::InterfaceBreak);
        assert!(report.widened.is_empty());
    }

    #[test]
    fn method_rename_widens_when_allowed() {
        let (program, _, iface_run, job_run) = runner_program();
        let checker = checker(&program).widen_methods(true);

        let report = checker.check(&RenameRequest::new(vec![job_run], "Start"));

        assert!(!report.has_conflicts());
        assert_eq!(report.widened, vec![iface_run]);
    }

    #[test]
    fn widening_into_unregistered_package_is_a_conflict() {
        let mut b = ProgramBuilder::new();
        let api = b.package("example.com/api", "api");
        let api_unit = b.unit(api, "api/api.go");
        let runner = b.interface_type(api_unit, "Runner", Pos::new(3, 6));
        b.interface_method(api_unit, runner, "Run", "()", Pos::new(4, 2));
        let jobs = b.package("example.com/jobs", "jobs");
        let jobs_unit = b.unit(jobs, "jobs/jobs.go");
        let job = b.struct_type(jobs_unit, "Job", Pos::new(3, 6));
        let run = b.method(jobs_unit, job, "Run", "()", Pos::new(5, 15));
        let program = b.build();
        let mut checker = Checker::new(&program).widen_methods(true);
        checker.register_package(jobs);

        let report = checker.check(&RenameRequest::new(vec![run.symbol], "Start"));

        assert!(report.touches_unregistered());
        assert!(report.widened.is_empty());
        assert!(report.conflicts[0].message.contains("\"example.com/api\""));
    }

    #[test]
    fn unexporting_symbol_used_elsewhere_is_a_conflict() {
        let mut b = ProgramBuilder::new();
        let lib = b.package("example.com/lib", "lib");
        let lib_unit = b.unit(lib, "lib/lib.go");
        let helper = b.func(lib_unit, "Helper", Pos::new(3, 6));
        let app = b.package("example.com/app", "app");
        let app_unit = b.unit(app, "app/main.go");
        let lib_name = b.import_name(app_unit, lib);
        let main = b.func(app_unit, "main", Pos::new(5, 6));
        let call = b.qualified_call(app_unit, main.scope, lib_name, helper.symbol, Pos::new(6, 2));
        b.push_stmt(app_unit, main.ident, call);
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![helper.symbol], "helper"));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictKind::Visibility);
    }

    #[test]
    fn rename_creating_satisfaction_is_noted() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let closer = b.interface_type(unit, "Closer", Pos::new(3, 6));
        b.interface_method(unit, closer, "Close", "()", Pos::new(4, 2));
        let file = b.struct_type(unit, "File", Pos::new(7, 6));
        let shut = b.method(unit, file, "Shut", "()", Pos::new(9, 16));
        let program = b.build();

        let report = checker(&program).check(&RenameRequest::new(vec![shut.symbol], "Close"));

        assert!(!report.has_conflicts());
        assert_eq!(
            report.notes,
            vec!["renaming to \"Close\" makes \"File\" satisfy \"Closer\"".to_string()]
        );
    }
}
