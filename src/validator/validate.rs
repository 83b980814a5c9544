//! The validation pass.

use std::panic::{AssertUnwindSafe, catch_unwind};

use smol_str::SmolStr;

use super::infer::InferCtx;
use super::scope::{Binding, BindingKind, Scope};
use crate::base::Span;
use crate::base::constants::{BASE_RECEIVER, STREAMS_RECEIVER};
use crate::resolver::InheritanceResolver;
use crate::syntax::{Diagnostic, Method, ShaderDecl, Stmt, codes};
use crate::typesys::{check_conversion, intrinsics, parse_type};
use crate::workspace::{ShaderIndex, ShaderUnit};

/// Scope-aware semantic validation over one shader unit.
pub struct Validator<'a> {
    index: &'a ShaderIndex,
    resolver: &'a InheritanceResolver,
}

impl<'a> Validator<'a> {
    pub fn new(index: &'a ShaderIndex, resolver: &'a InheritanceResolver) -> Self {
        Self { index, resolver }
    }

    /// Validate a unit, returning semantic diagnostics.
    ///
    /// Any internal failure is contained here and degrades this one
    /// shader's diagnostics to a "possibly incomplete" note.
    pub fn validate_unit(&self, unit: &ShaderUnit) -> Vec<Diagnostic> {
        match catch_unwind(AssertUnwindSafe(|| self.validate_inner(unit))) {
            Ok(diags) => diags,
            Err(_) => {
                tracing::warn!(shader = %unit.name, "validation failed internally");
                vec![
                    Diagnostic::info(
                        Span::default(),
                        format!("analysis of '{}' is possibly incomplete", unit.name),
                    )
                    .with_code(codes::ANALYSIS_INCOMPLETE),
                ]
            }
        }
    }

    fn validate_inner(&self, unit: &ShaderUnit) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        let Some(decl) = self.index.get_parsed(&unit.name) else {
            return diags;
        };

        self.check_declaration(unit, &decl, &mut diags);

        let scope = self.build_shader_scope(&decl);
        let cx = InferCtx {
            resolver: self.resolver,
            shader: decl.name.as_str(),
            decl: decl.as_ref(),
        };

        // Member initializers run in the shader scope.
        for variable in &decl.variables {
            if let Some(init) = &variable.init {
                let found = cx.infer(init, &scope, &mut diags);
                self.check_assignment(
                    found.as_deref(),
                    &variable.type_name,
                    init.span(),
                    &mut diags,
                );
            }
        }

        for method in &decl.methods {
            self.check_method(&cx, method, &scope, &mut diags);
        }

        diags
    }

    // =========================================================================
    // Declaration-level checks
    // =========================================================================

    fn check_declaration(
        &self,
        unit: &ShaderUnit,
        decl: &ShaderDecl,
        diags: &mut Vec<Diagnostic>,
    ) {
        let file_stem = unit
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if !file_stem.is_empty() && file_stem != decl.name {
            diags.push(
                Diagnostic::warning(
                    decl.span,
                    format!(
                        "shader '{}' is declared in file '{}'; the file name should match",
                        decl.name, file_stem
                    ),
                )
                .with_code(codes::FILENAME_MISMATCH),
            );
        }

        if self.index.has_duplicates(&decl.name) {
            diags.push(
                Diagnostic::warning(
                    decl.span,
                    format!("shader '{}' is declared in multiple workspace files", decl.name),
                )
                .with_code(codes::DUPLICATE_SHADER),
            );
        }

        let chain = self.resolver.resolve_chain(&decl.name);
        if chain.cyclic {
            diags.push(
                Diagnostic::error(
                    decl.span,
                    format!("cyclic inheritance involving shader '{}'", decl.name),
                )
                .with_code(codes::CYCLIC_INHERITANCE),
            );
        }

        for base in &decl.bases {
            if self.index.has_duplicates(&base.base_name) {
                diags.push(
                    Diagnostic::warning(
                        base.span,
                        format!(
                            "base '{}' is ambiguous: multiple shaders share this name",
                            base.full_name
                        ),
                    )
                    .with_code(codes::AMBIGUOUS_BASE),
                );
            }
        }

        for base in self.resolver.redundant_bases(decl) {
            diags.push(
                Diagnostic::warning(
                    base.span,
                    format!(
                        "base '{}' is redundant: another listed base already inherits it",
                        base.full_name
                    ),
                )
                .with_code(codes::REDUNDANT_BASE),
            );
        }

        for method in &decl.methods {
            if method.qualifiers.is_override && !self.chain_declares_method(&chain.order, &method.name)
            {
                diags.push(
                    Diagnostic::error(
                        method.span,
                        format!(
                            "method '{}' is marked override but no base declares it",
                            method.name
                        ),
                    )
                    .with_code(codes::OVERRIDE_WITHOUT_BASE),
                );
            }
        }
    }

    fn chain_declares_method(&self, chain: &[SmolStr], method: &str) -> bool {
        chain.iter().any(|base| {
            self.index
                .get_parsed(base)
                .map(|decl| decl.method(method).is_some())
                .unwrap_or(false)
        })
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Built-ins → template parameters → local members → inherited
    /// members, each carrying its declared type.
    fn build_shader_scope(&self, decl: &ShaderDecl) -> Scope {
        let mut scope = Scope::new();

        for intrinsic in intrinsics() {
            scope.insert(intrinsic.name, Binding::new("", BindingKind::Builtin));
        }
        scope.insert(BASE_RECEIVER, Binding::new("", BindingKind::Builtin));
        scope.insert(STREAMS_RECEIVER, Binding::new("", BindingKind::Builtin));

        for param in &decl.template_params {
            scope.insert(
                param.name.clone(),
                Binding::new(param.type_name.clone(), BindingKind::TemplateParam),
            );
        }

        // Aggregations are already deduplicated closest-first, so the
        // first binding for a name is the one that must stick.
        for (variable, definer) in self.resolver.variables_of(&decl.name) {
            let kind = if definer == decl.name {
                BindingKind::Member
            } else {
                BindingKind::InheritedMember
            };
            scope.insert_if_absent(variable.name.clone(), Binding::new(variable.type_name, kind));
        }
        for (method, _) in self.resolver.methods_of(&decl.name) {
            scope.insert_if_absent(
                method.name.clone(),
                Binding::new(method.return_type, BindingKind::Method),
            );
        }
        for (composition, _) in self.resolver.compositions_of(&decl.name) {
            scope.insert_if_absent(
                composition.name.clone(),
                Binding::new(composition.type_name, BindingKind::Composition),
            );
        }

        scope
    }

    // =========================================================================
    // Method bodies
    // =========================================================================

    fn check_method(
        &self,
        cx: &InferCtx<'_>,
        method: &Method,
        shader_scope: &Scope,
        diags: &mut Vec<Diagnostic>,
    ) {
        let mut scope = shader_scope.child();
        for param in &method.params {
            scope.insert(
                param.name.clone(),
                Binding::new(param.type_name.clone(), BindingKind::Param),
            );
        }
        self.check_stmts(cx, &method.body, &mut scope, method, diags);
    }

    fn check_stmts(
        &self,
        cx: &InferCtx<'_>,
        stmts: &[Stmt],
        scope: &mut Scope,
        method: &Method,
        diags: &mut Vec<Diagnostic>,
    ) {
        for stmt in stmts {
            match stmt {
                Stmt::Local {
                    name,
                    type_name,
                    init,
                    ..
                } => {
                    if let Some(init) = init {
                        let found = cx.infer(init, scope, diags);
                        self.check_assignment(found.as_deref(), type_name, init.span(), diags);
                    }
                    scope.insert(
                        name.clone(),
                        Binding::new(type_name.clone(), BindingKind::Local),
                    );
                }
                Stmt::Assign { target, value, .. } => {
                    let target_ty = cx.infer(target, scope, diags);
                    let value_ty = cx.infer(value, scope, diags);
                    if let Some(target_ty) = target_ty {
                        self.check_assignment(value_ty.as_deref(), &target_ty, value.span(), diags);
                    }
                }
                Stmt::Return { value, .. } => {
                    if let Some(value) = value {
                        let found = cx.infer(value, scope, diags);
                        if method.return_type != "void" {
                            self.check_assignment(
                                found.as_deref(),
                                &method.return_type,
                                value.span(),
                                diags,
                            );
                        }
                    }
                }
                Stmt::Expr(expr) => {
                    cx.infer(expr, scope, diags);
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                    ..
                } => {
                    cx.infer(cond, scope, diags);
                    let mut then_scope = scope.child();
                    self.check_stmts(cx, then_body, &mut then_scope, method, diags);
                    let mut else_scope = scope.child();
                    self.check_stmts(cx, else_body, &mut else_scope, method, diags);
                }
                Stmt::For {
                    init,
                    cond,
                    step,
                    body,
                    ..
                } => {
                    let mut loop_scope = scope.child();
                    if let Some(init) = init {
                        self.check_stmts(
                            cx,
                            std::slice::from_ref(&**init),
                            &mut loop_scope,
                            method,
                            diags,
                        );
                    }
                    if let Some(cond) = cond {
                        cx.infer(cond, &loop_scope, diags);
                    }
                    if let Some(step) = step {
                        cx.infer(step, &loop_scope, diags);
                    }
                    self.check_stmts(cx, body, &mut loop_scope, method, diags);
                }
                Stmt::Block(stmts) => {
                    let mut block_scope = scope.child();
                    self.check_stmts(cx, stmts, &mut block_scope, method, diags);
                }
            }
        }
    }

    /// Conversion legality for an initializer/assignment, when both sides
    /// are known to the type system.
    fn check_assignment(
        &self,
        from: Option<&str>,
        to: &str,
        span: Span,
        diags: &mut Vec<Diagnostic>,
    ) {
        let Some(from_name) = from else { return };
        let (Some(from_info), Some(to_info)) = (parse_type(from_name), parse_type(to)) else {
            return;
        };
        let conversion = check_conversion(&from_info, &to_info);
        if !conversion.allowed {
            diags.push(
                Diagnostic::error(
                    span,
                    format!("cannot convert from '{from_name}' to '{to}'"),
                )
                .with_code(codes::TYPE_MISMATCH),
            );
        } else if conversion.warning.is_some() {
            diags.push(
                Diagnostic::warning(
                    span,
                    format!("conversion from '{from_name}' to '{to}' may lose data"),
                )
                .with_code(codes::LOSSY_CONVERSION),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceTier;
    use crate::parser::StructuralParser;
    use crate::syntax::Severity;
    use std::path::Path;
    use std::sync::Arc;

    fn diagnostics_for(sources: &[(&str, &str)], target: &str) -> Vec<Diagnostic> {
        let index = Arc::new(ShaderIndex::new(Arc::new(StructuralParser)));
        for (name, source) in sources {
            let path = format!("/proj/{name}.sdsl");
            index.register(&path, SourceTier::Workspace);
            index.update_content(Path::new(&path), source);
        }
        let resolver = InheritanceResolver::new(index.clone());
        let validator = Validator::new(&index, &resolver);
        let unit = index.lookup_by_name(target).unwrap();
        validator.validate_unit(&unit)
    }

    fn codes_of(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn test_clean_shader_has_no_diagnostics() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    stage float4 Color;
                    float4 Shade() { return Color; }
                }"#,
            )],
            "S",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_undefined_identifier_reported() {
        let diags = diagnostics_for(
            &[("S", "shader S { float4 M() { return Missing; } }")],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::UNDEFINED_IDENTIFIER]);
        assert!(diags[0].message.contains("Missing"));
    }

    #[test]
    fn test_inherited_member_is_in_scope() {
        let diags = diagnostics_for(
            &[
                ("Base", "shader Base { stage float4 Color; }"),
                (
                    "Derived",
                    "shader Derived : Base { override float4 Color2() { return Color; } }",
                ),
            ],
            "Derived",
        );
        // Color resolves through the chain; the only finding would be
        // override-without-base, and Color2 is genuinely new...
        assert_eq!(codes_of(&diags), vec![codes::OVERRIDE_WITHOUT_BASE]);
    }

    #[test]
    fn test_override_with_base_method_is_clean() {
        let diags = diagnostics_for(
            &[
                ("Base", "shader Base { float4 Shade() { return 1; } }"),
                (
                    "Derived",
                    "shader Derived : Base { override float4 Shade() { return 2; } }",
                ),
            ],
            "Derived",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    void M() {
                        float2 small = float2(0, 0);
                        float3 big = small;
                    }
                }"#,
            )],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::TYPE_MISMATCH]);
    }

    #[test]
    fn test_lossy_conversion_is_warning() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    void M() {
                        float f = 1.5f;
                        int i = f;
                    }
                }"#,
            )],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::LOSSY_CONVERSION]);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_filename_mismatch_warning() {
        let index = Arc::new(ShaderIndex::new(Arc::new(StructuralParser)));
        index.register("/proj/WrongName.sdsl", SourceTier::Workspace);
        index.update_content(Path::new("/proj/WrongName.sdsl"), "shader Actual {}");
        let resolver = InheritanceResolver::new(index.clone());
        let validator = Validator::new(&index, &resolver);
        let unit = index.lookup_by_name("WrongName").unwrap();
        let diags = validator.validate_unit(&unit);
        assert_eq!(codes_of(&diags), vec![codes::FILENAME_MISMATCH]);
    }

    #[test]
    fn test_duplicate_shader_name_warning() {
        let index = Arc::new(ShaderIndex::new(Arc::new(StructuralParser)));
        index.register("/proj/a/Dup.sdsl", SourceTier::Workspace);
        index.register("/proj/b/Dup.sdsl", SourceTier::Workspace);
        index.update_content(Path::new("/proj/a/Dup.sdsl"), "shader Dup {}");
        let resolver = InheritanceResolver::new(index.clone());
        let validator = Validator::new(&index, &resolver);
        let unit = index.lookup_by_name("Dup").unwrap();
        let diags = validator.validate_unit(&unit);
        assert!(codes_of(&diags).contains(&codes::DUPLICATE_SHADER));
    }

    #[test]
    fn test_redundant_base_single_diagnostic() {
        let diags = diagnostics_for(
            &[
                ("A", "shader A {}"),
                ("B", "shader B : A {}"),
                ("X", "shader X : A, B {}"),
            ],
            "X",
        );
        let redundant: Vec<_> = diags
            .iter()
            .filter(|d| d.code.as_deref() == Some(codes::REDUNDANT_BASE))
            .collect();
        assert_eq!(redundant.len(), 1);
        assert!(redundant[0].message.contains("'A'"));
    }

    #[test]
    fn test_cyclic_inheritance_reported() {
        let diags = diagnostics_for(
            &[("A", "shader A : B {}"), ("B", "shader B : A {}")],
            "A",
        );
        assert!(codes_of(&diags).contains(&codes::CYCLIC_INHERITANCE));
    }

    #[test]
    fn test_streams_receiver_resolves_stream_vars() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    stream float2 Uv;
                    float2 M() { return streams.Uv; }
                }"#,
            )],
            "S",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_streams_receiver_unknown_member() {
        let diags = diagnostics_for(
            &[("S", "shader S { float2 M() { return streams.Nope; } }")],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::UNDEFINED_IDENTIFIER]);
    }

    #[test]
    fn test_base_receiver_resolves_chain_member() {
        let diags = diagnostics_for(
            &[
                ("Base", "shader Base { float4 Shade() { return 1; } }"),
                (
                    "Derived",
                    "shader Derived : Base { override float4 Shade() { return base.Shade(); } }",
                ),
            ],
            "Derived",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_invalid_swizzle_reported() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    void M() {
                        float4 v = float4(0, 0, 0, 0);
                        float2 bad = v.xg;
                    }
                }"#,
            )],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::TYPE_MISMATCH]);
        assert!(diags[0].message.contains("swizzle"));
    }

    #[test]
    fn test_struct_field_access() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    struct Vtx { float3 Position; };
                    void M() {
                        Vtx v;
                        float3 p = v.Position;
                    }
                }"#,
            )],
            "S",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }

    #[test]
    fn test_child_scope_bindings_do_not_leak() {
        let diags = diagnostics_for(
            &[(
                "S",
                r#"shader S {
                    void M() {
                        if (true) { float inner = 1; }
                        float outer = inner;
                    }
                }"#,
            )],
            "S",
        );
        assert_eq!(codes_of(&diags), vec![codes::UNDEFINED_IDENTIFIER]);
        assert!(diags[0].message.contains("inner"));
    }

    #[test]
    fn test_template_params_in_scope() {
        let diags = diagnostics_for(
            &[(
                "S",
                "shader S<int Count> { int M() { return Count; } }",
            )],
            "S",
        );
        assert!(diags.is_empty(), "unexpected: {diags:?}");
    }
}
