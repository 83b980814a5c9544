//! Expression type inference for the validation walk.
//!
//! Returns declared type *names*; the type system parses them into shapes
//! where numeric reasoning is needed. Unknown types infer to `None` and
//! suppress downstream checks rather than cascade false positives.

use smol_str::SmolStr;

use super::scope::Scope;
use crate::base::Span;
use crate::base::constants::{BASE_RECEIVER, STREAMS_RECEIVER};
use crate::resolver::InheritanceResolver;
use crate::syntax::{Diagnostic, Expr, LiteralKind, ShaderDecl, StructDef, UnaryOp, codes};
use crate::typesys::{
    ReturnRule, binary_result_type, intrinsic, parse_type, swizzle_type,
};

/// Everything inference needs about the shader under validation.
pub(super) struct InferCtx<'a> {
    pub resolver: &'a InheritanceResolver,
    pub shader: &'a str,
    pub decl: &'a ShaderDecl,
}

impl InferCtx<'_> {
    /// Infer the declared type name of an expression, reporting undefined
    /// identifiers and invalid member accesses as it goes.
    pub fn infer(
        &self,
        expr: &Expr,
        scope: &Scope,
        diags: &mut Vec<Diagnostic>,
    ) -> Option<SmolStr> {
        match expr {
            Expr::Literal { kind, .. } => match kind {
                LiteralKind::Int => Some(SmolStr::new("int")),
                LiteralKind::Float => Some(SmolStr::new("float")),
                LiteralKind::Bool => Some(SmolStr::new("bool")),
                LiteralKind::String => None,
            },

            Expr::Ident { name, span } => match scope.lookup(name) {
                Some(binding) if binding.type_name.is_empty() => None,
                Some(binding) => Some(binding.type_name.clone()),
                None => {
                    diags.push(
                        Diagnostic::error(*span, format!("undefined identifier '{name}'"))
                            .with_code(codes::UNDEFINED_IDENTIFIER),
                    );
                    None
                }
            },

            Expr::Member { base, member, span } => {
                self.infer_member(base, member, *span, scope, diags)
            }

            Expr::Call { callee, args, span } => {
                for arg in args {
                    self.infer(arg, scope, diags);
                }
                self.infer_call(callee, args, *span, scope, diags)
            }

            Expr::Index { base, index, span: _ } => {
                self.infer(index, scope, diags);
                let base_ty = self.infer(base, scope, diags)?;
                let info = parse_type(&base_ty)?;
                if info.is_matrix {
                    // Row access on a matrix.
                    Some(crate::typesys::TypeInfo::vector_of(info.scalar, info.cols).name)
                } else if info.is_vector() {
                    Some(SmolStr::new(info.scalar.name()))
                } else {
                    None
                }
            }

            Expr::Binary { op, lhs, rhs, .. } => {
                let lt = self.infer(lhs, scope, diags);
                let rt = self.infer(rhs, scope, diags);
                let left = parse_type(lt.as_deref()?)?;
                let right = parse_type(rt.as_deref()?)?;
                binary_result_type(&left, &right, *op).map(|t| t.name)
            }

            Expr::Unary { op, operand, .. } => {
                let ty = self.infer(operand, scope, diags)?;
                match op {
                    UnaryOp::Not => {
                        let info = parse_type(&ty)?;
                        Some(crate::typesys::TypeInfo::vector_of(
                            crate::typesys::ScalarKind::Bool,
                            info.rows,
                        )
                        .name)
                    }
                    UnaryOp::Neg | UnaryOp::BitNot => Some(ty),
                }
            }

            Expr::Cast {
                type_name, operand, ..
            } => {
                self.infer(operand, scope, diags);
                Some(type_name.clone())
            }

            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                ..
            } => {
                self.infer(cond, scope, diags);
                let then_ty = self.infer(then_expr, scope, diags);
                let else_ty = self.infer(else_expr, scope, diags);
                then_ty.or(else_ty)
            }
        }
    }

    /// `receiver.member` — reserved receivers first, then swizzles, struct
    /// fields, and shader/composition members.
    fn infer_member(
        &self,
        base: &Expr,
        member: &str,
        span: Span,
        scope: &Scope,
        diags: &mut Vec<Diagnostic>,
    ) -> Option<SmolStr> {
        if let Expr::Ident { name, .. } = base {
            if name == BASE_RECEIVER {
                return self.lookup_chain_member(self.shader, member, true).or_else(|| {
                    diags.push(
                        Diagnostic::error(
                            span,
                            format!("no inherited member '{member}' in any base of '{}'", self.shader),
                        )
                        .with_code(codes::UNDEFINED_IDENTIFIER),
                    );
                    None
                });
            }
            if name == STREAMS_RECEIVER {
                return self.lookup_stream_member(member).or_else(|| {
                    diags.push(
                        Diagnostic::error(span, format!("no stream variable '{member}'"))
                            .with_code(codes::UNDEFINED_IDENTIFIER),
                    );
                    None
                });
            }
        }

        let base_ty = self.infer(base, scope, diags)?;

        // Numeric base: the member is a swizzle.
        if let Some(info) = parse_type(&base_ty) {
            return match swizzle_type(&info, member) {
                Some(result) => Some(result.name),
                None => {
                    diags.push(
                        Diagnostic::error(
                            span,
                            format!("invalid swizzle '{member}' on '{base_ty}'"),
                        )
                        .with_code(codes::TYPE_MISMATCH),
                    );
                    None
                }
            };
        }

        // Struct field.
        if let Some(def) = self.find_struct(&base_ty) {
            return match def.field(member) {
                Some(field) => Some(field.type_name.clone()),
                None => {
                    diags.push(
                        Diagnostic::error(
                            span,
                            format!("no field '{member}' in struct '{base_ty}'"),
                        )
                        .with_code(codes::UNDEFINED_IDENTIFIER),
                    );
                    None
                }
            };
        }

        // Shader (or composition interface) member.
        if self.resolver.index().lookup_by_name(&base_ty).is_some() {
            return self.lookup_chain_member(&base_ty, member, false).or_else(|| {
                diags.push(
                    Diagnostic::error(
                        span,
                        format!("no member '{member}' on shader '{base_ty}'"),
                    )
                    .with_code(codes::UNDEFINED_IDENTIFIER),
                );
                None
            });
        }

        // Opaque base type: stay quiet rather than cascade.
        None
    }

    fn infer_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        scope: &Scope,
        diags: &mut Vec<Diagnostic>,
    ) -> Option<SmolStr> {
        match callee {
            Expr::Ident { name, span: id_span } => {
                // Constructor style: float4(...), int2(...).
                if parse_type(name).is_some() {
                    return Some(name.clone());
                }
                if let Some(intrinsic) = intrinsic(name) {
                    return self.apply_return_rule(intrinsic.rule, args, scope);
                }
                match scope.lookup(name) {
                    Some(binding) if binding.type_name.is_empty() => None,
                    Some(binding) => Some(binding.type_name.clone()),
                    None => {
                        diags.push(
                            Diagnostic::error(*id_span, format!("undefined identifier '{name}'"))
                                .with_code(codes::UNDEFINED_IDENTIFIER),
                        );
                        None
                    }
                }
            }
            Expr::Member { base, member, .. } => {
                self.infer_member(base, member, span, scope, diags)
            }
            other => self.infer(other, scope, diags),
        }
    }

    /// Arguments were already walked by the caller, so re-inference here
    /// is silent to avoid duplicate reports.
    fn apply_return_rule(&self, rule: ReturnRule, args: &[Expr], scope: &Scope) -> Option<SmolStr> {
        let mut silent = Vec::new();
        match rule {
            ReturnRule::SameAsArg(i) => self.infer(args.get(i)?, scope, &mut silent),
            ReturnRule::ScalarOfArg(i) => {
                let ty = self.infer(args.get(i)?, scope, &mut silent)?;
                parse_type(&ty).map(|info| SmolStr::new(info.scalar.name()))
            }
            ReturnRule::Fixed(name) => Some(SmolStr::new(name)),
            ReturnRule::MatrixMul => {
                let lt = self.infer(args.first()?, scope, &mut silent)?;
                let rt = self.infer(args.get(1)?, scope, &mut silent)?;
                binary_result_type(
                    &parse_type(&lt)?,
                    &parse_type(&rt)?,
                    crate::syntax::BinaryOp::Mul,
                )
                .map(|t| t.name)
            }
        }
    }

    /// First declaration of `member` walking `shader`'s chain (optionally
    /// skipping the unit's own members for `base.` receivers).
    fn lookup_chain_member(
        &self,
        shader: &str,
        member: &str,
        skip_local: bool,
    ) -> Option<SmolStr> {
        let index = self.resolver.index();
        let chain = self.resolver.resolve_chain(shader);
        let mut units: Vec<SmolStr> = Vec::new();
        if !skip_local {
            units.push(SmolStr::new(shader));
        }
        units.extend(chain.order.iter().cloned());

        for unit in &units {
            if let Some(decl) = index.get_parsed(unit) {
                if let Some(v) = decl.variable(member) {
                    return Some(v.type_name.clone());
                }
                if let Some(m) = decl.method(member) {
                    return Some(m.return_type.clone());
                }
                if let Some(c) = decl.composition(member) {
                    return Some(c.type_name.clone());
                }
            }
        }
        None
    }

    /// A stream variable anywhere in the current shader's chain.
    fn lookup_stream_member(&self, member: &str) -> Option<SmolStr> {
        self.resolver
            .streams_of(self.shader)
            .into_iter()
            .find(|(v, _)| v.name == member)
            .map(|(v, _)| v.type_name)
    }

    /// A struct definition on the current shader or anywhere in its chain.
    fn find_struct(&self, name: &str) -> Option<StructDef> {
        if let Some(def) = self.decl.struct_def(name) {
            return Some(def.clone());
        }
        let index = self.resolver.index();
        for base in &self.resolver.resolve_chain(self.shader).order {
            if let Some(decl) = index.get_parsed(base) {
                if let Some(def) = decl.struct_def(name) {
                    return Some(def.clone());
                }
            }
        }
        None
    }
}
