//! Declaration tree for a single shader unit.

use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::expr::{Expr, Stmt};

/// Structural output of parsing one shader source file.
///
/// `is_partial` marks a best-effort extraction from invalid input. Partial
/// declarations are never treated as authoritative by the parse cache:
/// they only replace the cached structure when no full parse exists yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderDecl {
    pub name: SmolStr,
    pub is_partial: bool,
    /// Direct bases in declaration order. Order matters: it drives
    /// inheritance distance and member shadowing.
    pub bases: Vec<MixinRef>,
    pub template_params: Vec<TemplateParam>,
    pub variables: Vec<Variable>,
    pub methods: Vec<Method>,
    pub compositions: Vec<Composition>,
    pub structs: Vec<StructDef>,
    pub span: Span,
}

impl ShaderDecl {
    /// Find a locally declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Find a locally declared method by name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Find a locally declared composition by name.
    pub fn composition(&self, name: &str) -> Option<&Composition> {
        self.compositions.iter().find(|c| c.name == name)
    }

    /// Find a locally declared struct by name.
    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// True if any local member (variable, method, or composition) has
    /// this name, compared case-insensitively.
    pub fn declares_member_ignore_case(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name.eq_ignore_ascii_case(name))
            || self.methods.iter().any(|m| m.name.eq_ignore_ascii_case(name))
            || self
                .compositions
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// A reference to a base shader in a declaration's base list.
///
/// `full_name` keeps the templated form as written (`Light<3>`); it is what
/// diagnostics and hover display. `base_name` strips the template arguments
/// and is the only key chain resolution ever looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinRef {
    pub full_name: SmolStr,
    pub base_name: SmolStr,
    pub template_args: Vec<SmolStr>,
    pub span: Span,
}

impl MixinRef {
    pub fn new(full_name: impl Into<SmolStr>, span: Span) -> Self {
        let full_name: SmolStr = full_name.into();
        let (base_name, template_args) = split_template_args(&full_name);
        Self {
            full_name,
            base_name,
            template_args,
            span,
        }
    }
}

/// Split `Name<a, b>` into the bare name and its argument list.
fn split_template_args(full: &str) -> (SmolStr, Vec<SmolStr>) {
    match full.find('<') {
        Some(open) => {
            let name = SmolStr::new(full[..open].trim());
            let inner = full[open + 1..].trim_end_matches('>');
            let args = inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(SmolStr::new)
                .collect();
            (name, args)
        }
        None => (SmolStr::new(full.trim()), Vec::new()),
    }
}

/// A template parameter of a shader declaration, e.g. `int SampleCount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub span: Span,
}

/// Storage qualifiers on a variable declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarQualifiers {
    pub stage: bool,
    pub stream: bool,
    pub compose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub qualifiers: VarQualifiers,
    /// Semantic annotation, e.g. `: COLOR0`.
    pub semantic: Option<SmolStr>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Qualifiers on a method declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodQualifiers {
    pub is_override: bool,
    pub is_abstract: bool,
    pub stage: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: SmolStr,
    pub return_type: SmolStr,
    pub params: Vec<Param>,
    pub qualifiers: MethodQualifiers,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Method {
    /// Render a `float4 Shade(float3 n)` style signature for hover text.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({})", self.return_type, self.name, params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: SmolStr,
    pub type_name: SmolStr,
}

/// A `compose` member: a slot holding a polymorphic shader implementation,
/// matched by its interface-like shader type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: SmolStr,
    pub fields: Vec<StructField>,
    pub span: Span,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub semantic: Option<SmolStr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixin_ref_strips_template_args() {
        let r = MixinRef::new("LightGroup<8, PerView>", Span::default());
        assert_eq!(r.base_name, "LightGroup");
        assert_eq!(r.full_name, "LightGroup<8, PerView>");
        assert_eq!(r.template_args, vec!["8", "PerView"]);
    }

    #[test]
    fn test_mixin_ref_plain_name() {
        let r = MixinRef::new("ShaderBase", Span::default());
        assert_eq!(r.base_name, "ShaderBase");
        assert!(r.template_args.is_empty());
    }

    #[test]
    fn test_declares_member_ignore_case() {
        let mut decl = ShaderDecl::default();
        decl.variables.push(Variable {
            name: "Color".into(),
            type_name: "float4".into(),
            qualifiers: VarQualifiers::default(),
            semantic: None,
            init: None,
            span: Span::default(),
        });
        assert!(decl.declares_member_ignore_case("color"));
        assert!(!decl.declares_member_ignore_case("normal"));
    }
}
