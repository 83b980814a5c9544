//! Hover information.

use crate::base::{Position, Span};
use crate::resolver::InheritanceResolver;
use crate::syntax::ShaderDecl;
use crate::workspace::{ShaderIndex, ShaderUnit};

/// Result of a hover request: markdown contents plus the range it
/// describes.
#[derive(Clone, Debug)]
pub struct HoverResult {
    pub contents: String,
    pub span: Span,
}

/// Hover text for a position inside a unit's declaration: base
/// references, member declarations, template parameters, or the shader
/// header itself.
pub(super) fn hover(
    index: &ShaderIndex,
    resolver: &InheritanceResolver,
    unit: &ShaderUnit,
    position: Position,
) -> Option<HoverResult> {
    let decl = index.get_parsed(&unit.name)?;

    for base in &decl.bases {
        if base.span.contains(position) {
            let contents = match index.lookup_by_name(&base.base_name) {
                Some(target) => {
                    format!("shader {}\n\n{}", base.full_name, target.display_path)
                }
                None => format!("shader {} (not found in workspace)", base.full_name),
            };
            return Some(HoverResult {
                contents,
                span: base.span,
            });
        }
    }

    for param in &decl.template_params {
        if param.span.contains(position) {
            return Some(HoverResult {
                contents: format!("{} {} (template parameter)", param.type_name, param.name),
                span: param.span,
            });
        }
    }

    for variable in &decl.variables {
        if variable.span.contains(position) {
            let mut qualifiers = String::new();
            if variable.qualifiers.stage {
                qualifiers.push_str("stage ");
            }
            if variable.qualifiers.stream {
                qualifiers.push_str("stream ");
            }
            return Some(HoverResult {
                contents: format!(
                    "{}{} {} — {}",
                    qualifiers, variable.type_name, variable.name, decl.name
                ),
                span: variable.span,
            });
        }
    }

    for method in &decl.methods {
        if method.span.contains(position) {
            return Some(HoverResult {
                contents: format!("{} — {}", method.signature(), decl.name),
                span: method.span,
            });
        }
    }

    for composition in &decl.compositions {
        if composition.span.contains(position) {
            return Some(HoverResult {
                contents: format!(
                    "compose {} {} — {}",
                    composition.type_name, composition.name, decl.name
                ),
                span: composition.span,
            });
        }
    }

    Some(header_hover(resolver, unit, &decl))
}

fn header_hover(
    resolver: &InheritanceResolver,
    unit: &ShaderUnit,
    decl: &ShaderDecl,
) -> HoverResult {
    let mut contents = format!("shader {}", decl.name);
    if !decl.bases.is_empty() {
        let bases: Vec<_> = decl.bases.iter().map(|b| b.full_name.as_str()).collect();
        contents.push_str(&format!(" : {}", bases.join(", ")));
    }
    contents.push_str(&format!("\n\n{}", unit.display_path));

    let chain = resolver.resolve_chain(&decl.name);
    if !chain.order.is_empty() {
        contents.push_str(&format!("\n\ninherits {} shader(s)", chain.order.len()));
    }
    HoverResult {
        contents,
        span: decl.span,
    }
}
