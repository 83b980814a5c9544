//! Member-chain type resolution over buffer text.
//!
//! Resolves `a.b.c.` one segment at a time: the first identifier's type
//! comes from shader members or a backward scan of preceding source lines
//! for local declarations; each later segment resolves as a struct field,
//! a swizzle, or a shader/composition member. Resolution stops with no
//! result on the first unresolvable segment — no guessing.

use smol_str::SmolStr;

use crate::base::Position;
use crate::resolver::InheritanceResolver;
use crate::typesys::{parse_type, swizzle_type};

/// Resolve the declared type name at the end of a dotted chain, or `None`
/// when any segment fails to resolve.
pub fn resolve_member_chain(
    resolver: &InheritanceResolver,
    shader: Option<&str>,
    buffer: &str,
    position: Position,
    segments: &[SmolStr],
) -> Option<SmolStr> {
    let (first, rest) = segments.split_first()?;

    let mut current = first_segment_type(resolver, shader, buffer, position, first)?;
    for segment in rest {
        current = member_type_of(resolver, shader, &current, segment)?;
    }
    Some(current)
}

/// The first identifier: a member of the current shader (inherited
/// included), else a local declaration found by scanning backward from
/// the cursor.
fn first_segment_type(
    resolver: &InheritanceResolver,
    shader: Option<&str>,
    buffer: &str,
    position: Position,
    name: &str,
) -> Option<SmolStr> {
    if let Some(shader) = shader {
        if let Some((v, _)) = resolver
            .variables_of(shader)
            .into_iter()
            .find(|(v, _)| v.name == name)
        {
            return Some(v.type_name);
        }
        if let Some((c, _)) = resolver
            .compositions_of(shader)
            .into_iter()
            .find(|(c, _)| c.name == name)
        {
            return Some(c.type_name);
        }
        if let Some((m, _)) = resolver
            .methods_of(shader)
            .into_iter()
            .find(|(m, _)| m.name == name)
        {
            return Some(m.return_type);
        }
    }
    scan_backward_for_local(buffer, position, name)
}

/// Look upward from the cursor for a `Type name` local declaration.
fn scan_backward_for_local(buffer: &str, position: Position, name: &str) -> Option<SmolStr> {
    for (i, line) in buffer
        .lines()
        .enumerate()
        .take(position.line + 1)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
    {
        let text = if i == position.line {
            &line[..clamp_to_boundary(line, position.column)]
        } else {
            line
        };
        if let Some(type_name) = declaration_on_line(text, name) {
            return Some(type_name);
        }
    }
    None
}

/// The largest char boundary at or below `column`.
pub(super) fn clamp_to_boundary(line: &str, column: usize) -> usize {
    let mut col = column.min(line.len());
    while col > 0 && !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

/// `Type name` followed by `=`, `;`, `,`, `)` or end of line, where
/// `Type` is the immediately preceding identifier-like word.
fn declaration_on_line(line: &str, name: &str) -> Option<SmolStr> {
    let mut search_from = 0;
    while let Some(at) = line[search_from..].find(name) {
        let at = search_from + at;
        search_from = at + name.len().max(1);

        // Whole-word match only.
        let before_ok = line[..at]
            .chars()
            .next_back()
            .map(|c| c.is_whitespace())
            .unwrap_or(false);
        let after = line[at + name.len()..].trim_start();
        let after_ok = after.is_empty()
            || after.starts_with('=') && !after.starts_with("==")
            || after.starts_with(';')
            || after.starts_with(',')
            || after.starts_with(')');
        if !before_ok || !after_ok {
            continue;
        }

        let before = line[..at].trim_end();
        let type_end = before.len();
        let type_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_' || *c == '<' || *c == '>')
            .map(|(i, _)| i)
            .last()
            .unwrap_or(type_end);
        if type_start == type_end {
            continue;
        }
        let type_name = &before[type_start..type_end];
        // Keywords in statement position are not types.
        if matches!(type_name, "return" | "else" | "if" | "for") {
            continue;
        }
        return Some(SmolStr::new(type_name));
    }
    None
}

/// One chain step: swizzle on a numeric type, struct field, or
/// shader/composition member.
pub(super) fn member_type_of(
    resolver: &InheritanceResolver,
    context_shader: Option<&str>,
    type_name: &str,
    member: &str,
) -> Option<SmolStr> {
    if let Some(info) = parse_type(type_name) {
        return swizzle_type(&info, member).map(|t| t.name);
    }

    // Struct defined on the context shader or its chain.
    if let Some(shader) = context_shader {
        if let Some(field_ty) = struct_field_type(resolver, shader, type_name, member) {
            return Some(field_ty);
        }
    }

    // Shader (or composition interface) member.
    if resolver.index().lookup_by_name(type_name).is_some() {
        if let Some((v, _)) = resolver
            .variables_of(type_name)
            .into_iter()
            .find(|(v, _)| v.name == member)
        {
            return Some(v.type_name);
        }
        if let Some((m, _)) = resolver
            .methods_of(type_name)
            .into_iter()
            .find(|(m, _)| m.name == member)
        {
            return Some(m.return_type);
        }
        if let Some((c, _)) = resolver
            .compositions_of(type_name)
            .into_iter()
            .find(|(c, _)| c.name == member)
        {
            return Some(c.type_name);
        }
    }
    None
}

fn struct_field_type(
    resolver: &InheritanceResolver,
    shader: &str,
    struct_name: &str,
    field: &str,
) -> Option<SmolStr> {
    let index = resolver.index();
    let mut owners = vec![SmolStr::new(shader)];
    owners.extend(resolver.resolve_chain(shader).order.iter().cloned());
    for owner in &owners {
        if let Some(decl) = index.get_parsed(owner) {
            if let Some(def) = decl.struct_def(struct_name) {
                return def.field(field).map(|f| f.type_name.clone());
            }
        }
    }
    None
}
