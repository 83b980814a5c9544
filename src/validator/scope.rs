//! Layered scopes with snapshot semantics.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Where a binding came from. Completion reuses this to rank candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Builtin,
    TemplateParam,
    /// Member declared on the shader itself.
    Member,
    /// Member contributed by the inheritance chain.
    InheritedMember,
    Method,
    Composition,
    Param,
    Local,
}

/// One name visible in a scope, with its declared type.
///
/// `type_name` is empty for bindings with no useful declared type
/// (intrinsics, reserved receivers); inference treats those as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub type_name: SmolStr,
    pub kind: BindingKind,
}

impl Binding {
    pub fn new(type_name: impl Into<SmolStr>, kind: BindingKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
        }
    }
}

/// A flat snapshot of every visible name.
///
/// A child scope copies its parent's bindings at creation time, so
/// additions in the child never leak upward — statement blocks can bind
/// freely without unwinding anything.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: FxHashMap<SmolStr, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot this scope as the parent of a new one.
    pub fn child(&self) -> Scope {
        Scope {
            bindings: self.bindings.clone(),
        }
    }

    /// Bind a name, shadowing any earlier binding.
    pub fn insert(&mut self, name: impl Into<SmolStr>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    /// Bind a name only if nothing closer already holds it.
    pub fn insert_if_absent(&mut self, name: impl Into<SmolStr>, binding: Binding) {
        self.bindings.entry(name.into()).or_insert(binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_additions_do_not_leak_upward() {
        let mut parent = Scope::new();
        parent.insert("a", Binding::new("float", BindingKind::Local));

        let mut child = parent.child();
        child.insert("b", Binding::new("int", BindingKind::Local));

        assert!(child.lookup("a").is_some());
        assert!(child.lookup("b").is_some());
        assert!(parent.lookup("b").is_none());
    }

    #[test]
    fn test_child_shadows_without_touching_parent() {
        let mut parent = Scope::new();
        parent.insert("x", Binding::new("float", BindingKind::Member));

        let mut child = parent.child();
        child.insert("x", Binding::new("int", BindingKind::Local));

        assert_eq!(child.lookup("x").unwrap().type_name, "int");
        assert_eq!(parent.lookup("x").unwrap().type_name, "float");
    }

    #[test]
    fn test_insert_if_absent_keeps_closest() {
        let mut scope = Scope::new();
        scope.insert("v", Binding::new("float", BindingKind::Member));
        scope.insert_if_absent("v", Binding::new("int", BindingKind::InheritedMember));
        assert_eq!(scope.lookup("v").unwrap().type_name, "float");
    }
}
