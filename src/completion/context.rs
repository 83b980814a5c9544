//! Cursor context classification.
//!
//! First-match precedence: `base.` → `streams.` → base-list → compose →
//! semantic annotation → member chain → general. Classification is pure
//! text analysis over the buffer; no index access happens here.

use smol_str::SmolStr;

use crate::base::Position;
use crate::base::constants::{BASE_RECEIVER, STREAMS_RECEIVER};

/// What the cursor position wants completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Right after `base.` — members of the inheritance chain.
    BaseMember,
    /// Right after `streams.` — stream variables.
    StreamVariable,
    /// Inside `shader Name : …` — base shader names.
    BaseShaderName,
    /// Inside a `compose` declaration — interface shader types.
    InterfaceType,
    /// After `) :` or `type name :` — semantic annotation names.
    SemanticAnnotation,
    /// After any other dotted identifier chain; carries the full prefix
    /// segments (without the trailing partial word).
    MemberChain(Vec<SmolStr>),
    General,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Classify the cursor context in `buffer` at `position`.
pub fn classify_context(buffer: &str, position: Position) -> CompletionContext {
    let line = buffer.lines().nth(position.line).unwrap_or("");
    let col = line
        .char_indices()
        .map(|(i, _)| i)
        .chain([line.len()])
        .filter(|&i| i <= position.column)
        .max()
        .unwrap_or(0);
    let prefix = &line[..col.min(line.len())];

    // Strip the partial word being typed; the dotted chain (if any) sits
    // before it.
    let without_partial = prefix.trim_end_matches(is_ident_char);
    let chain = trailing_dotted_chain(without_partial);

    if let Some(chain) = &chain {
        if chain.len() == 1 && chain[0] == BASE_RECEIVER {
            return CompletionContext::BaseMember;
        }
        if chain.len() == 1 && chain[0] == STREAMS_RECEIVER {
            return CompletionContext::StreamVariable;
        }
    }

    if chain.is_none() {
        if in_base_list(buffer, position, prefix) {
            return CompletionContext::BaseShaderName;
        }
        if in_compose_decl(prefix) {
            return CompletionContext::InterfaceType;
        }
        if in_semantic_annotation(without_partial) {
            return CompletionContext::SemanticAnnotation;
        }
    }

    match chain {
        Some(chain) => CompletionContext::MemberChain(chain),
        None => CompletionContext::General,
    }
}

/// `a.b.c.` before the cursor → `["a", "b", "c"]`.
fn trailing_dotted_chain(text: &str) -> Option<Vec<SmolStr>> {
    let text = text.trim_end();
    if !text.ends_with('.') {
        return None;
    }
    let mut rest = &text[..text.len() - 1];
    let mut segments: Vec<SmolStr> = Vec::new();
    loop {
        let end = rest.len();
        let start = rest
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_ident_char(*c))
            .map(|(i, _)| i)
            .last()
            .unwrap_or(end);
        if start == end {
            return None; // `.` with no identifier before it
        }
        segments.push(SmolStr::new(&rest[start..end]));
        rest = &rest[..start];
        if rest.ends_with('.') {
            rest = &rest[..rest.len() - 1];
        } else {
            break;
        }
    }
    segments.reverse();
    Some(segments)
}

/// Between a `shader Name :` and its opening `{`, scanning the buffer up
/// to the cursor so multi-line base lists classify too.
fn in_base_list(buffer: &str, position: Position, line_prefix: &str) -> bool {
    let mut before = String::new();
    for (i, line) in buffer.lines().enumerate() {
        match i.cmp(&position.line) {
            std::cmp::Ordering::Less => {
                before.push_str(line);
                before.push('\n');
            }
            std::cmp::Ordering::Equal => before.push_str(line_prefix),
            std::cmp::Ordering::Greater => break,
        }
    }
    let Some(shader_at) = before.rfind("shader") else {
        return false;
    };
    // Keyword boundary: "flatshader" must not match.
    if shader_at > 0
        && before[..shader_at]
            .chars()
            .next_back()
            .map(is_ident_char)
            .unwrap_or(false)
    {
        return false;
    }
    let after = &before[shader_at..];
    after.contains(':') && !after.contains('{') && !after.contains(';')
}

/// `compose <partial type>` — cursor right in the type position.
fn in_compose_decl(prefix: &str) -> bool {
    let mut words = prefix.split_whitespace().rev();
    // The word being typed may already be split off; look at the last one
    // or two words.
    match (words.next(), words.next()) {
        (Some("compose"), _) => true,
        (Some(_), Some("compose")) => !prefix.trim_end().ends_with(|c: char| !is_ident_char(c)),
        _ => false,
    }
}

/// `) : <partial>` after a parameter list, or `type name : <partial>`.
fn in_semantic_annotation(without_partial: &str) -> bool {
    let trimmed = without_partial.trim_end();
    let Some(before_colon) = trimmed.strip_suffix(':') else {
        return false;
    };
    let before_colon = before_colon.trim_end();
    if before_colon.ends_with(')') {
        return true;
    }
    // `type name` — two trailing identifier words.
    let mut words = before_colon.split_whitespace().rev();
    matches!(
        (words.next(), words.next()),
        (Some(a), Some(b))
            if a.chars().all(is_ident_char) && b.chars().all(|c| is_ident_char(c) || c == '<' || c == '>')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(lines: &[&str], line: usize, column: usize) -> CompletionContext {
        classify_context(&lines.join("\n"), Position::new(line, column))
    }

    #[test]
    fn test_base_dot_is_base_member() {
        let ctx = classify(&["shader S : B {", "    float4 M() { return base."], 1, 31);
        assert_eq!(ctx, CompletionContext::BaseMember);
    }

    #[test]
    fn test_base_dot_with_partial_word() {
        let ctx = classify(&["shader S : B {", "    float4 M() { return base.Sh"], 1, 33);
        assert_eq!(ctx, CompletionContext::BaseMember);
    }

    #[test]
    fn test_base_dot_ignores_surrounding_whitespace() {
        let ctx = classify(&["shader S {", "        base."], 1, 13);
        assert_eq!(ctx, CompletionContext::BaseMember);
    }

    #[test]
    fn test_streams_dot_is_stream_context() {
        let ctx = classify(&["shader S {", "    float2 M() { return streams."], 1, 33);
        assert_eq!(ctx, CompletionContext::StreamVariable);
    }

    #[test]
    fn test_base_list_context() {
        let ctx = classify(&["shader Derived : "], 0, 17);
        assert_eq!(ctx, CompletionContext::BaseShaderName);
    }

    #[test]
    fn test_base_list_context_second_base() {
        let ctx = classify(&["shader Derived : First, "], 0, 24);
        assert_eq!(ctx, CompletionContext::BaseShaderName);
    }

    #[test]
    fn test_base_list_multiline() {
        let ctx = classify(&["shader Derived :", "    First,", "    "], 2, 4);
        assert_eq!(ctx, CompletionContext::BaseShaderName);
    }

    #[test]
    fn test_base_list_closed_by_brace_is_general() {
        let ctx = classify(&["shader Derived : First {", "    "], 1, 4);
        assert_eq!(ctx, CompletionContext::General);
    }

    #[test]
    fn test_compose_context() {
        let ctx = classify(&["shader S {", "    compose "], 1, 12);
        assert_eq!(ctx, CompletionContext::InterfaceType);
    }

    #[test]
    fn test_semantic_after_params() {
        let ctx = classify(&["shader S {", "    float4 M(float3 n) : "], 1, 26);
        assert_eq!(ctx, CompletionContext::SemanticAnnotation);
    }

    #[test]
    fn test_semantic_after_field_pattern() {
        let ctx = classify(&["shader S {", "    float4 Position : SV_"], 1, 26);
        assert_eq!(ctx, CompletionContext::SemanticAnnotation);
    }

    #[test]
    fn test_member_chain_carries_prefix() {
        let ctx = classify(&["shader S {", "    void M() { light.color."], 1, 29);
        assert_eq!(
            ctx,
            CompletionContext::MemberChain(vec!["light".into(), "color".into()])
        );
    }

    #[test]
    fn test_unrecognized_dotted_prefix_is_member_chain() {
        let ctx = classify(&["shader S {", "    void M() { foo."], 1, 20);
        assert_eq!(ctx, CompletionContext::MemberChain(vec!["foo".into()]));
    }

    #[test]
    fn test_plain_body_is_general() {
        let ctx = classify(&["shader S {", "    void M() { flo"], 1, 18);
        assert_eq!(ctx, CompletionContext::General);
    }
}
