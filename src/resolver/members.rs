//! Member aggregation over resolved chains.
//!
//! Every aggregation yields `(member, defining unit)` pairs: local members
//! first, then chain members in chain order, keeping only the first
//! (closest) occurrence of each name.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::chain::InheritanceResolver;
use crate::syntax::{Composition, Method, Variable};

impl InheritanceResolver {
    /// All variables visible on a shader, shadowing resolved.
    pub fn variables_of(&self, name: &str) -> Vec<(Variable, SmolStr)> {
        self.aggregate(name, |decl| decl.variables.clone())
    }

    /// All methods visible on a shader, shadowing resolved.
    pub fn methods_of(&self, name: &str) -> Vec<(Method, SmolStr)> {
        self.aggregate(name, |decl| decl.methods.clone())
    }

    /// All compositions visible on a shader, shadowing resolved.
    pub fn compositions_of(&self, name: &str) -> Vec<(Composition, SmolStr)> {
        self.aggregate(name, |decl| decl.compositions.clone())
    }

    /// Stream-qualified variables visible on a shader, shadowing resolved.
    pub fn streams_of(&self, name: &str) -> Vec<(Variable, SmolStr)> {
        self.variables_of(name)
            .into_iter()
            .filter(|(v, _)| v.qualifiers.stream)
            .collect()
    }

    fn aggregate<T: Member>(
        &self,
        name: &str,
        extract: impl Fn(&crate::syntax::ShaderDecl) -> Vec<T>,
    ) -> Vec<(T, SmolStr)> {
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        let mut out = Vec::new();

        let mut collect = |definer: &str, out: &mut Vec<(T, SmolStr)>| {
            if let Some(decl) = self.index.get_parsed(definer) {
                for member in extract(&decl) {
                    if seen.insert(member.member_name().clone()) {
                        out.push((member, SmolStr::new(definer)));
                    }
                }
            }
        };

        collect(name, &mut out);
        for base in &self.resolve_chain(name).order {
            collect(base, &mut out);
        }
        out
    }
}

/// Anything with a shadowing name.
trait Member {
    fn member_name(&self) -> &SmolStr;
}

impl Member for Variable {
    fn member_name(&self) -> &SmolStr {
        &self.name
    }
}

impl Member for Method {
    fn member_name(&self) -> &SmolStr {
        &self.name
    }
}

impl Member for Composition {
    fn member_name(&self) -> &SmolStr {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use crate::resolver::testutil::resolver_with;

    #[test]
    fn test_variables_include_definer() {
        let r = resolver_with(&[
            ("Base", "shader Base { stage float4 Color; }"),
            ("Derived", "shader Derived : Base { float Extra; }"),
        ]);
        let vars = r.variables_of("Derived");
        let pairs: Vec<_> = vars
            .iter()
            .map(|(v, d)| (v.name.as_str(), d.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Extra", "Derived"), ("Color", "Base")]);
    }

    #[test]
    fn test_shadowed_variable_reported_once_closest_wins() {
        let r = resolver_with(&[
            ("Base", "shader Base { float4 Color; }"),
            ("Derived", "shader Derived : Base { float Color; }"),
        ]);
        let vars = r.variables_of("Derived");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0.type_name, "float");
        assert_eq!(vars[0].1, "Derived");
    }

    #[test]
    fn test_closer_base_shadows_farther() {
        let r = resolver_with(&[
            ("Far", "shader Far { float V; }"),
            ("Near", "shader Near : Far { int V; }"),
            ("Top", "shader Top : Near {}"),
        ]);
        let vars = r.variables_of("Top");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0.type_name, "int");
        assert_eq!(vars[0].1, "Near");
    }

    #[test]
    fn test_methods_and_compositions_aggregate() {
        let r = resolver_with(&[
            ("Base", "shader Base { float4 Shade() { return 0; } compose Light light; }"),
            ("Derived", "shader Derived : Base {}"),
        ]);
        assert_eq!(r.methods_of("Derived").len(), 1);
        assert_eq!(r.compositions_of("Derived").len(), 1);
        assert_eq!(r.methods_of("Derived")[0].1, "Base");
    }

    #[test]
    fn test_streams_filters_qualifier() {
        let r = resolver_with(&[(
            "S",
            "shader S { stream float2 Uv; stage float4 Color; float Plain; }",
        )]);
        let streams = r.streams_of("S");
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].0.name, "Uv");
    }
}
