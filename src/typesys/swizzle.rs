//! Swizzle typing.

use super::types::TypeInfo;

/// The three swizzle alphabets. A swizzle must draw every character from
/// exactly one of them.
const ALPHABETS: [&str; 3] = ["xyzw", "rgba", "stpq"];

/// Infer the type a swizzle produces on `base`, or `None` when invalid.
///
/// Invalid cases: empty or longer than 4; mixed alphabets; any component
/// index at or past the base type's component count; non-numeric or matrix
/// base. A scalar swizzles by repeating its single component, so `f.xxx`
/// is a valid `float3`.
pub fn swizzle_type(base: &TypeInfo, swizzle: &str) -> Option<TypeInfo> {
    if swizzle.is_empty() || swizzle.len() > 4 {
        return None;
    }
    let count = base.component_count();
    if count == 0 || !base.is_numeric() {
        return None;
    }

    let alphabet = ALPHABETS
        .iter()
        .find(|a| swizzle.chars().all(|c| a.contains(c)))?;

    for c in swizzle.chars() {
        let index = alphabet.find(c).unwrap() as u8;
        if index >= count {
            return None;
        }
    }

    if swizzle.len() == 1 {
        Some(TypeInfo::scalar_of(base.scalar))
    } else {
        Some(TypeInfo::vector_of(base.scalar, swizzle.len() as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesys::parse_type;
    use rstest::rstest;

    fn swz(base: &str, swizzle: &str) -> Option<String> {
        swizzle_type(&parse_type(base).unwrap(), swizzle).map(|t| t.name.to_string())
    }

    #[rstest]
    #[case("float4", "xy", "float2")]
    #[case("float4", "xyzw", "float4")]
    #[case("float3", "zyx", "float3")]
    #[case("float2", "y", "float")]
    #[case("int4", "rgb", "int3")]
    #[case("float4", "stpq", "float4")]
    fn test_valid_swizzles(#[case] base: &str, #[case] s: &str, #[case] expected: &str) {
        assert_eq!(swz(base, s).as_deref(), Some(expected));
    }

    #[test]
    fn test_mixed_alphabet_invalid() {
        assert_eq!(swz("float4", "xg"), None);
        assert_eq!(swz("float4", "ra"), Some("float2".into())); // both color
        assert_eq!(swz("float4", "xs"), None);
    }

    #[test]
    fn test_out_of_range_component_invalid() {
        assert_eq!(swz("float3", "xyzw"), None);
        assert_eq!(swz("float2", "z"), None);
        assert_eq!(swz("float", "y"), None);
    }

    #[test]
    fn test_scalar_replication() {
        assert_eq!(swz("float", "x"), Some("float".into()));
        assert_eq!(swz("float", "xxx"), Some("float3".into()));
        assert_eq!(swz("int", "rr"), Some("int2".into()));
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(swz("float4", ""), None);
        assert_eq!(swz("float4", "xyzwx"), None);
    }

    #[test]
    fn test_matrix_has_no_swizzle() {
        assert_eq!(swz("float4x4", "x"), None);
    }
}
