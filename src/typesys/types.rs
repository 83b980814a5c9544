//! Type shapes for the HLSL-like scalar/vector/matrix family.

use smol_str::SmolStr;

/// Scalar rank order. Conversion toward a higher rank is a promotion,
/// toward a lower rank a demotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Half,
    Float,
    Double,
}

impl ScalarKind {
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Half => "half",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(ScalarKind::Bool),
            "int" => Some(ScalarKind::Int),
            "uint" | "dword" => Some(ScalarKind::UInt),
            "half" => Some(ScalarKind::Half),
            "float" => Some(ScalarKind::Float),
            "double" => Some(ScalarKind::Double),
            _ => None,
        }
    }

    /// The two integer ranks cross by signedness, not magnitude.
    pub fn crosses_sign_with(&self, other: &ScalarKind) -> bool {
        matches!(
            (self, other),
            (ScalarKind::Int, ScalarKind::UInt) | (ScalarKind::UInt, ScalarKind::Int)
        )
    }
}

/// Non-numeric object families. These never convert to anything but
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Texture,
    Sampler,
}

/// Shape of a type in the dialect's numeric family.
///
/// Scalars are `rows == 1, cols == 1`; vectors `rows == N, cols == 1`;
/// matrices carry both dimensions and `is_matrix` (a `float1x1` is not a
/// `float`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub name: SmolStr,
    pub scalar: ScalarKind,
    pub rows: u8,
    pub cols: u8,
    pub is_matrix: bool,
    pub object: Option<ObjectClass>,
}

impl TypeInfo {
    pub fn scalar_of(kind: ScalarKind) -> Self {
        Self {
            name: SmolStr::new(kind.name()),
            scalar: kind,
            rows: 1,
            cols: 1,
            is_matrix: false,
            object: None,
        }
    }

    pub fn vector_of(kind: ScalarKind, len: u8) -> Self {
        if len <= 1 {
            return Self::scalar_of(kind);
        }
        Self {
            name: SmolStr::new(format!("{}{}", kind.name(), len)),
            scalar: kind,
            rows: len,
            cols: 1,
            is_matrix: false,
            object: None,
        }
    }

    pub fn matrix_of(kind: ScalarKind, rows: u8, cols: u8) -> Self {
        Self {
            name: SmolStr::new(format!("{}{}x{}", kind.name(), rows, cols)),
            scalar: kind,
            rows,
            cols,
            is_matrix: true,
            object: None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_matrix && self.rows == 1 && self.object.is_none()
    }

    pub fn is_vector(&self) -> bool {
        !self.is_matrix && self.rows > 1 && self.object.is_none()
    }

    pub fn is_numeric(&self) -> bool {
        self.object.is_none()
    }

    /// Component count available to swizzles: vector length, or 1 for a
    /// scalar. Matrices have no swizzlable components.
    pub fn component_count(&self) -> u8 {
        if self.is_matrix { 0 } else { self.rows }
    }
}

/// Parse a type name from the HLSL-like lexical family.
///
/// Recognizes scalars (`float`), vectors (`float3`, `int2`), matrices
/// (`float4x4`, `half3x2`), generic vector/matrix spellings
/// (`vector<float, 3>`, `matrix<float, 4, 4>` are out of scope; the
/// dialect writes the short forms), and texture/sampler object types.
/// Unknown names (user structs, shader types) return `None`.
pub fn parse_type(name: &str) -> Option<TypeInfo> {
    let name = name.trim();
    if name.is_empty() || !name.is_ascii() {
        return None;
    }

    // Object families first: Texture2D, Texture2D<float4>, TextureCube,
    // SamplerState, SamplerComparisonState, sampler...
    let bare = name.split('<').next().unwrap_or(name);
    if bare.starts_with("Texture") || bare.starts_with("texture") || bare == "RWTexture2D" {
        return Some(TypeInfo {
            name: SmolStr::new(name),
            scalar: ScalarKind::Float,
            rows: 1,
            cols: 1,
            is_matrix: false,
            object: Some(ObjectClass::Texture),
        });
    }
    if bare.starts_with("Sampler") || bare.starts_with("sampler") {
        return Some(TypeInfo {
            name: SmolStr::new(name),
            scalar: ScalarKind::Float,
            rows: 1,
            cols: 1,
            is_matrix: false,
            object: Some(ObjectClass::Sampler),
        });
    }

    // Longest scalar prefix: "uint" must win over "int" in "uint3".
    let mut split = None;
    for prefix_len in (1..=name.len()).rev() {
        if let Some(kind) = ScalarKind::from_name(&name[..prefix_len]) {
            split = Some((kind, &name[prefix_len..]));
            break;
        }
    }
    let (scalar, suffix) = split?;

    if suffix.is_empty() {
        return Some(TypeInfo::scalar_of(scalar));
    }

    let mut chars = suffix.chars();
    let first = chars.next()?;
    let rows = first.to_digit(10)? as u8;
    if !(1..=4).contains(&rows) {
        return None;
    }
    match (chars.next(), chars.next(), chars.next()) {
        (None, _, _) => Some(TypeInfo::vector_of(scalar, rows)),
        (Some('x'), Some(c), None) => {
            let cols = c.to_digit(10)? as u8;
            if !(1..=4).contains(&cols) {
                return None;
            }
            Some(TypeInfo::matrix_of(scalar, rows, cols))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("float", ScalarKind::Float, 1, 1, false)]
    #[case("float3", ScalarKind::Float, 3, 1, false)]
    #[case("float4x4", ScalarKind::Float, 4, 4, true)]
    #[case("int2", ScalarKind::Int, 2, 1, false)]
    #[case("uint3", ScalarKind::UInt, 3, 1, false)]
    #[case("half2x3", ScalarKind::Half, 2, 3, true)]
    #[case("bool4", ScalarKind::Bool, 4, 1, false)]
    #[case("double", ScalarKind::Double, 1, 1, false)]
    fn test_parse_numeric(
        #[case] name: &str,
        #[case] scalar: ScalarKind,
        #[case] rows: u8,
        #[case] cols: u8,
        #[case] is_matrix: bool,
    ) {
        let t = parse_type(name).unwrap();
        assert_eq!(t.scalar, scalar);
        assert_eq!(t.rows, rows);
        assert_eq!(t.cols, cols);
        assert_eq!(t.is_matrix, is_matrix);
    }

    #[test]
    fn test_parse_objects() {
        assert_eq!(
            parse_type("Texture2D<float4>").unwrap().object,
            Some(ObjectClass::Texture)
        );
        assert_eq!(
            parse_type("SamplerState").unwrap().object,
            Some(ObjectClass::Sampler)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_type("VSOutput").is_none());
        assert!(parse_type("float5").is_none());
        assert!(parse_type("float4x5").is_none());
        assert!(parse_type("").is_none());
    }

    #[test]
    fn test_rank_order() {
        assert!(ScalarKind::Bool.rank() < ScalarKind::Int.rank());
        assert!(ScalarKind::Int.rank() < ScalarKind::UInt.rank());
        assert!(ScalarKind::UInt.rank() < ScalarKind::Half.rank());
        assert!(ScalarKind::Half.rank() < ScalarKind::Float.rank());
        assert!(ScalarKind::Float.rank() < ScalarKind::Double.rank());
    }
}
