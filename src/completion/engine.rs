//! Candidate generation and ranking.

use std::path::Path;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::chain::resolve_member_chain;
use super::context::{CompletionContext, classify_context};
use super::item::{CompletionItem, CompletionKind, priority};
use crate::base::Position;
use crate::resolver::InheritanceResolver;
use crate::typesys::{
    BUILTIN_SEMANTICS, BUILTIN_TYPE_NAMES, KEYWORDS, intrinsics, parse_type,
};

/// Completion candidates for a cursor position.
///
/// Purely a query: the caller must already have pushed buffer edits into
/// the workspace index. Results come back sorted by ascending priority,
/// first-seen label winning on duplicates.
pub fn completions(
    resolver: &InheritanceResolver,
    path: &Path,
    buffer: &str,
    position: Position,
) -> Vec<CompletionItem> {
    let shader = resolver
        .index()
        .lookup_by_path(path)
        .map(|unit| unit.name.clone());
    let shader = shader.as_deref();

    let context = classify_context(buffer, position);
    tracing::trace!(?context, "completion context");

    let mut items = Vec::new();
    match &context {
        CompletionContext::BaseMember => {
            if let Some(shader) = shader {
                push_chain_members(resolver, shader, &mut items);
            }
        }
        CompletionContext::StreamVariable => {
            if let Some(shader) = shader {
                for (variable, definer) in resolver.streams_of(shader) {
                    items.push(
                        CompletionItem::new(variable.name.clone(), CompletionKind::Variable)
                            .with_detail(format!("{} — {}", variable.type_name, definer))
                            .with_priority(priority::INHERITED),
                    );
                }
            }
        }
        CompletionContext::BaseShaderName => {
            push_base_candidates(resolver, shader, &mut items);
        }
        CompletionContext::InterfaceType => {
            for name in resolver.index().unit_names() {
                if Some(name.as_str()) == shader {
                    continue;
                }
                items.push(
                    CompletionItem::new(name, CompletionKind::Shader)
                        .with_priority(priority::SHADER_NAME),
                );
            }
        }
        CompletionContext::SemanticAnnotation => {
            for semantic in BUILTIN_SEMANTICS {
                items.push(
                    CompletionItem::new(*semantic, CompletionKind::Semantic)
                        .with_priority(priority::KEYWORD),
                );
            }
        }
        CompletionContext::MemberChain(segments) => {
            if let Some(type_name) =
                resolve_member_chain(resolver, shader, buffer, position, segments)
            {
                push_type_members(resolver, shader, &type_name, &mut items);
            }
        }
        CompletionContext::General => {
            push_general(resolver, shader, buffer, position, &mut items);
        }
    }

    // Stable sort keeps insertion order inside a priority class, so
    // distance ordering computed above survives ranking.
    items.sort_by_key(|item| item.sort_priority);
    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    items.retain(|item| seen.insert(item.label.clone()));
    items
}

/// Inherited members in chain order — closer bases first, so the stable
/// ranking sort keeps distance order inside the class.
fn push_chain_members(
    resolver: &InheritanceResolver,
    shader: &str,
    items: &mut Vec<CompletionItem>,
) {
    let index = resolver.index();
    for base in &resolver.resolve_chain(shader).order {
        let Some(decl) = index.get_parsed(base) else {
            continue;
        };
        for variable in &decl.variables {
            items.push(
                CompletionItem::new(variable.name.clone(), CompletionKind::Variable)
                    .with_detail(format!("{} — {}", variable.type_name, base))
                    .with_priority(priority::INHERITED),
            );
        }
        for method in &decl.methods {
            items.push(
                CompletionItem::new(method.name.clone(), CompletionKind::Method)
                    .with_detail(format!("{} — {}", method.signature(), base))
                    .with_priority(priority::INHERITED),
            );
        }
        for composition in &decl.compositions {
            items.push(
                CompletionItem::new(composition.name.clone(), CompletionKind::Composition)
                    .with_detail(format!("{} — {}", composition.type_name, base))
                    .with_priority(priority::INHERITED),
            );
        }
    }
}

/// Base-name candidates, popular bases first.
fn push_base_candidates(
    resolver: &InheritanceResolver,
    current: Option<&str>,
    items: &mut Vec<CompletionItem>,
) {
    let mut names: Vec<SmolStr> = resolver
        .index()
        .unit_names()
        .into_iter()
        .filter(|name| Some(name.as_str()) != current)
        .collect();
    names.sort_by_key(|name| std::cmp::Reverse(resolver.child_count_of(name)));
    for (i, name) in names.into_iter().enumerate() {
        let count = resolver.child_count_of(&name);
        let mut item = CompletionItem::new(name, CompletionKind::Shader)
            .with_priority(priority::SHADER_NAME + i as u32);
        if count > 0 {
            item = item.with_detail(format!("{count} direct children"));
        }
        items.push(item);
    }
}

/// Members of a resolved chain-target type: swizzle components, struct
/// fields, or shader members.
fn push_type_members(
    resolver: &InheritanceResolver,
    context_shader: Option<&str>,
    type_name: &str,
    items: &mut Vec<CompletionItem>,
) {
    if let Some(info) = parse_type(type_name) {
        let count = info.component_count() as usize;
        for alphabet in ["xyzw", "rgba"] {
            for component in alphabet.chars().take(count.max(1)) {
                items.push(
                    CompletionItem::new(SmolStr::new(component.to_string()), CompletionKind::Variable)
                        .with_detail(info.scalar.name())
                        .with_priority(priority::INHERITED),
                );
            }
        }
        return;
    }

    // Struct fields.
    if let Some(shader) = context_shader {
        let index = resolver.index();
        let mut owners = vec![SmolStr::new(shader)];
        owners.extend(resolver.resolve_chain(shader).order.iter().cloned());
        for owner in &owners {
            if let Some(decl) = index.get_parsed(owner) {
                if let Some(def) = decl.struct_def(type_name) {
                    for field in &def.fields {
                        items.push(
                            CompletionItem::new(field.name.clone(), CompletionKind::Variable)
                                .with_detail(field.type_name.to_string())
                                .with_priority(priority::INHERITED),
                        );
                    }
                    return;
                }
            }
        }
    }

    // Shader members: own first, then chain, distance ordered.
    if resolver.index().lookup_by_name(type_name).is_some() {
        for (variable, definer) in resolver.variables_of(type_name) {
            items.push(
                CompletionItem::new(variable.name.clone(), CompletionKind::Variable)
                    .with_detail(format!("{} — {}", variable.type_name, definer))
                    .with_priority(priority::INHERITED),
            );
        }
        for (method, definer) in resolver.methods_of(type_name) {
            items.push(
                CompletionItem::new(method.name.clone(), CompletionKind::Method)
                    .with_detail(format!("{} — {}", method.signature(), definer))
                    .with_priority(priority::INHERITED),
            );
        }
        for (composition, definer) in resolver.compositions_of(type_name) {
            items.push(
                CompletionItem::new(composition.name.clone(), CompletionKind::Composition)
                    .with_detail(format!("{} — {}", composition.type_name, definer))
                    .with_priority(priority::INHERITED),
            );
        }
    }
}

/// The general pool: locals < own/inherited members < intrinsics <
/// keywords < built-in types < workspace shader names.
fn push_general(
    resolver: &InheritanceResolver,
    shader: Option<&str>,
    buffer: &str,
    position: Position,
    items: &mut Vec<CompletionItem>,
) {
    for (name, type_name) in scan_local_declarations(buffer, position) {
        items.push(
            CompletionItem::new(name, CompletionKind::Variable)
                .with_detail(type_name.to_string())
                .with_priority(priority::LOCAL),
        );
    }

    if let Some(shader) = shader {
        for (variable, definer) in resolver.variables_of(shader) {
            let p = if definer == shader {
                priority::LOCAL
            } else {
                priority::INHERITED
            };
            items.push(
                CompletionItem::new(variable.name.clone(), CompletionKind::Variable)
                    .with_detail(format!("{} — {}", variable.type_name, definer))
                    .with_priority(p),
            );
        }
        for (method, definer) in resolver.methods_of(shader) {
            let p = if definer == shader {
                priority::LOCAL
            } else {
                priority::INHERITED
            };
            items.push(
                CompletionItem::new(method.name.clone(), CompletionKind::Method)
                    .with_detail(format!("{} — {}", method.signature(), definer))
                    .with_priority(p),
            );
        }
        for (composition, definer) in resolver.compositions_of(shader) {
            let p = if definer == shader {
                priority::LOCAL
            } else {
                priority::INHERITED
            };
            items.push(
                CompletionItem::new(composition.name.clone(), CompletionKind::Composition)
                    .with_detail(format!("{} — {}", composition.type_name, definer))
                    .with_priority(p),
            );
        }
    }

    for intrinsic in intrinsics() {
        items.push(
            CompletionItem::new(intrinsic.name, CompletionKind::Intrinsic)
                .with_priority(priority::INTRINSIC),
        );
    }
    for keyword in KEYWORDS {
        items.push(
            CompletionItem::new(*keyword, CompletionKind::Keyword)
                .with_priority(priority::KEYWORD),
        );
    }
    for type_name in BUILTIN_TYPE_NAMES {
        items.push(
            CompletionItem::new(*type_name, CompletionKind::Type)
                .with_priority(priority::BUILTIN_TYPE),
        );
    }
    for name in resolver.index().unit_names() {
        items.push(
            CompletionItem::new(name, CompletionKind::Shader)
                .with_priority(priority::SHADER_NAME),
        );
    }
}

/// Local `Type name` declarations on the lines above the cursor.
fn scan_local_declarations(buffer: &str, position: Position) -> Vec<(SmolStr, SmolStr)> {
    let mut out = Vec::new();
    for (i, line) in buffer.lines().enumerate() {
        if i > position.line {
            break;
        }
        let text = if i == position.line {
            &line[..super::chain::clamp_to_boundary(line, position.column)]
        } else {
            line
        };
        let trimmed = text.trim_start();
        let mut words = trimmed.split_whitespace();
        let (Some(first), Some(second)) = (words.next(), words.next()) else {
            continue;
        };
        let is_decl = parse_type(first).is_some()
            && second.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && matches!(words.next(), None | Some("=") | Some(";"));
        if is_decl {
            let name = second.trim_end_matches(';');
            if !name.is_empty() {
                out.push((SmolStr::new(name), SmolStr::new(first)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testutil::resolver_with;
    use std::path::Path;

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_base_member_context_lists_chain_members() {
        let r = resolver_with(&[
            ("Base", "shader Base { float4 Color; float4 Shade() { return Color; } }"),
            ("Derived", "shader Derived : Base {}"),
        ]);
        let buffer = "shader Derived : Base {\n    float4 M() { return base.";
        let items = completions(
            &r,
            Path::new("/proj/Derived.sdsl"),
            buffer,
            Position::new(1, 30),
        );
        assert!(labels(&items).contains(&"Color"));
        assert!(labels(&items).contains(&"Shade"));
    }

    #[test]
    fn test_base_member_distance_order_first_seen_wins() {
        let r = resolver_with(&[
            ("Far", "shader Far { float Value; }"),
            ("Near", "shader Near : Far { int Value; }"),
            ("Top", "shader Top : Near {}"),
        ]);
        let buffer = "shader Top : Near {\n    void M() { base.";
        let items = completions(
            &r,
            Path::new("/proj/Top.sdsl"),
            buffer,
            Position::new(1, 21),
        );
        let value_items: Vec<_> = items.iter().filter(|i| i.label == "Value").collect();
        assert_eq!(value_items.len(), 1);
        // Near is closer than Far, so its int Value wins.
        assert!(value_items[0].detail.as_ref().unwrap().contains("Near"));
    }

    #[test]
    fn test_stream_context_lists_stream_vars_only() {
        let r = resolver_with(&[(
            "S",
            "shader S { stream float2 Uv; stage float4 Color; }",
        )]);
        let buffer = "shader S {\n    void M() { streams.";
        let items = completions(&r, Path::new("/proj/S.sdsl"), buffer, Position::new(1, 24));
        assert_eq!(labels(&items), vec!["Uv"]);
    }

    #[test]
    fn test_base_list_ranks_popular_bases_first() {
        let r = resolver_with(&[
            ("Rare", "shader Rare {}"),
            ("Popular", "shader Popular {}"),
            ("A", "shader A : Popular {}"),
            ("B", "shader B : Popular {}"),
            ("New", "shader New {}"),
        ]);
        let buffer = "shader New : ";
        let items = completions(&r, Path::new("/proj/New.sdsl"), buffer, Position::new(0, 13));
        let popular_at = labels(&items).iter().position(|l| *l == "Popular").unwrap();
        let rare_at = labels(&items).iter().position(|l| *l == "Rare").unwrap();
        assert!(popular_at < rare_at);
        assert!(!labels(&items).contains(&"New"));
    }

    #[test]
    fn test_member_chain_swizzle_components() {
        let r = resolver_with(&[("S", "shader S { float2 Uv; }")]);
        let buffer = "shader S {\n    void M() { Uv.";
        let items = completions(&r, Path::new("/proj/S.sdsl"), buffer, Position::new(1, 19));
        let l = labels(&items);
        assert!(l.contains(&"x"));
        assert!(l.contains(&"y"));
        assert!(!l.contains(&"z"));
    }

    #[test]
    fn test_member_chain_unresolvable_yields_nothing() {
        let r = resolver_with(&[("S", "shader S {}")]);
        let buffer = "shader S {\n    void M() { mystery.";
        let items = completions(&r, Path::new("/proj/S.sdsl"), buffer, Position::new(1, 24));
        assert!(items.is_empty());
    }

    #[test]
    fn test_general_ranking_order() {
        let r = resolver_with(&[
            ("Base", "shader Base { float4 Inherited; }"),
            ("S", "shader S : Base { float4 Own; }"),
        ]);
        let buffer = "shader S : Base {\n    void M() {\n        float3 localVar = 0;\n        ";
        let items = completions(&r, Path::new("/proj/S.sdsl"), buffer, Position::new(3, 8));
        let l = labels(&items);

        let pos = |label: &str| l.iter().position(|x| *x == label).unwrap();
        assert!(pos("localVar") < pos("Inherited"));
        assert!(pos("Own") < pos("Inherited"));
        assert!(pos("Inherited") < pos("normalize"));
        assert!(pos("normalize") < pos("shader"));
        assert!(pos("shader") < pos("float4"));
        assert!(pos("float4") < pos("Base"));
    }

    #[test]
    fn test_composition_member_chain() {
        let r = resolver_with(&[
            ("Light", "shader Light { float3 Direction; float Intensity; }"),
            ("S", "shader S { compose Light light; }"),
        ]);
        let buffer = "shader S {\n    void M() { light.";
        let items = completions(&r, Path::new("/proj/S.sdsl"), buffer, Position::new(1, 22));
        let l = labels(&items);
        assert!(l.contains(&"Direction"));
        assert!(l.contains(&"Intensity"));
    }
}
