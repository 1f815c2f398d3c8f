//! Method sets and structural interface satisfaction
//!
//! A named type satisfies an interface when its method set contains every
//! method of the interface with an identical signature. The relation is
//! computed once for the whole program and shared by every check of one
//! checker.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::semantic::{Program, SymbolId, SymbolKind};

/// Method name → (signature, method symbol).
pub type MethodSet = BTreeMap<String, (String, SymbolId)>;

#[derive(Debug, Clone, Default)]
pub struct MethodSetCache {
    sets: HashMap<SymbolId, MethodSet>,
    satisfies: HashMap<SymbolId, Vec<SymbolId>>,
    satisfiers: HashMap<SymbolId, Vec<SymbolId>>,
}

fn covers(have: &MethodSet, want: &MethodSet) -> bool {
    want.iter()
        .all(|(name, (sig, _))| have.get(name).is_some_and(|(other, _)| other == sig))
}

impl MethodSetCache {
    pub fn build(program: &Program) -> Self {
        let mut cache = Self::default();
        let mut types = Vec::new();
        let mut interfaces = Vec::new();

        for symbol in program.symbols().all_symbols() {
            if symbol.kind != SymbolKind::Type {
                continue;
            }
            let set = method_set(program, symbol.id);
            if symbol.is_interface() {
                if set.is_empty() {
                    continue;
                }
                interfaces.push(symbol.id);
            } else if set.is_empty() {
                continue;
            }
            types.push(symbol.id);
            cache.sets.insert(symbol.id, set);
        }

        for &ty in &types {
            for &iface in &interfaces {
                if ty != iface && covers(&cache.sets[&ty], &cache.sets[&iface]) {
                    cache.satisfies.entry(ty).or_default().push(iface);
                    cache.satisfiers.entry(iface).or_default().push(ty);
                }
            }
        }

        debug!(
            types = types.len(),
            interfaces = interfaces.len(),
            relations = cache.satisfies.values().map(Vec::len).sum::<usize>(),
            "built method set cache"
        );
        cache
    }

    pub fn method_set(&self, ty: SymbolId) -> Option<&MethodSet> {
        self.sets.get(&ty)
    }

    /// The method of `ty` spelled `name`, if any.
    pub fn method(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.sets.get(&ty)?.get(name).map(|(_, id)| *id)
    }

    pub fn satisfies(&self, ty: SymbolId, iface: SymbolId) -> bool {
        self.interfaces_satisfied_by(ty).contains(&iface)
    }

    pub fn interfaces_satisfied_by(&self, ty: SymbolId) -> &[SymbolId] {
        self.satisfies.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn satisfiers_of(&self, iface: SymbolId) -> &[SymbolId] {
        self.satisfiers.get(&iface).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `ty` takes part in any satisfaction relation, on either side.
    pub fn participates(&self, ty: SymbolId) -> bool {
        !self.interfaces_satisfied_by(ty).is_empty() || !self.satisfiers_of(ty).is_empty()
    }

    /// All types and interfaces that have a method set, in symbol order.
    pub fn named_types(&self) -> Vec<SymbolId> {
        let mut types: Vec<SymbolId> = self.sets.keys().copied().collect();
        types.sort_by_key(|id| id.index());
        types
    }

    pub fn interfaces(&self, program: &Program) -> Vec<SymbolId> {
        self.named_types()
            .into_iter()
            .filter(|&ty| program.symbol(ty).is_interface())
            .collect()
    }

    /// Whether `ty` would satisfy `iface` once every method in `renamed` is
    /// spelled `new_name`.
    pub fn satisfies_after_rename(
        &self,
        ty: SymbolId,
        iface: SymbolId,
        renamed: &HashSet<SymbolId>,
        new_name: &str,
    ) -> bool {
        let (Some(have), Some(want)) = (self.sets.get(&ty), self.sets.get(&iface)) else {
            return false;
        };
        covers(
            &apply_rename(have, renamed, new_name),
            &apply_rename(want, renamed, new_name),
        )
    }
}

fn method_set(program: &Program, ty: SymbolId) -> MethodSet {
    program
        .symbols()
        .members(ty)
        .iter()
        .map(|&m| program.symbol(m))
        .filter(|m| m.kind == SymbolKind::Method)
        .map(|m| {
            let sig = m.signature.clone().unwrap_or_default();
            (m.name.clone(), (sig, m.id))
        })
        .collect()
}

fn apply_rename(set: &MethodSet, renamed: &HashSet<SymbolId>, new_name: &str) -> MethodSet {
    set.iter()
        .map(|(name, (sig, id))| {
            let name = if renamed.contains(id) {
                new_name.to_string()
            } else {
                name.clone()
            };
            (name, (sig.clone(), *id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Pos;
    use crate::semantic::ProgramBuilder;

    #[test]
    fn concrete_type_satisfies_interface_with_same_signatures() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let runner = b.interface_type(unit, "Runner", Pos::new(3, 6));
        b.interface_method(unit, runner, "Run", "() error", Pos::new(4, 2));
        let job = b.struct_type(unit, "Job", Pos::new(7, 6));
        b.method(unit, job, "Run", "() error", Pos::new(9, 15));
        let task = b.struct_type(unit, "Task", Pos::new(11, 6));
        b.method(unit, task, "Run", "()", Pos::new(13, 16));
        let program = b.build();

        let cache = MethodSetCache::build(&program);

        assert!(cache.satisfies(job, runner));
        assert!(!cache.satisfies(task, runner));
        assert_eq!(cache.satisfiers_of(runner), &[job]);
        assert!(cache.participates(job));
        assert!(!cache.participates(task));
    }

    #[test]
    fn error_method_satisfies_predeclared_error() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let error = b.predeclared("error").unwrap();
        let failure = b.struct_type(unit, "Failure", Pos::new(3, 6));
        b.method(unit, failure, "Error", "() string", Pos::new(5, 19));
        let program = b.build();

        let cache = MethodSetCache::build(&program);

        assert_eq!(cache.interfaces_satisfied_by(failure), &[error]);
    }

    #[test]
    fn rename_can_create_satisfaction() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let closer = b.interface_type(unit, "Closer", Pos::new(3, 6));
        b.interface_method(unit, closer, "Close", "()", Pos::new(4, 2));
        let file = b.struct_type(unit, "File", Pos::new(7, 6));
        let shut = b.method(unit, file, "Shut", "()", Pos::new(9, 16));
        let program = b.build();

        let cache = MethodSetCache::build(&program);
        let renamed = HashSet::from([shut.symbol]);

        assert!(!cache.satisfies(file, closer));
        assert!(cache.satisfies_after_rename(file, closer, &renamed, "Close"));
        assert!(!cache.satisfies_after_rename(file, closer, &renamed, "Stop"));
    }

    #[test]
    fn empty_interfaces_are_ignored() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let any_of = b.interface_type(unit, "Anything", Pos::new(3, 6));
        let job = b.struct_type(unit, "Job", Pos::new(5, 6));
        b.method(unit, job, "Run", "()", Pos::new(7, 15));
        let program = b.build();

        let cache = MethodSetCache::build(&program);

        assert!(cache.satisfiers_of(any_of).is_empty());
        assert!(cache.method_set(any_of).is_none());
        assert_eq!(
            cache.method(job, "Run").map(|m| program.symbol(m).name.clone()),
            Some("Run".to_string())
        );
    }
}
