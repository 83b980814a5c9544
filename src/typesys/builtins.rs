//! Built-in registry: intrinsic functions, keywords, built-in type and
//! semantic names.
//!
//! The validator seeds its outermost scope layer from here; the completion
//! engine draws its intrinsic/keyword/built-in-type candidate pools from
//! the same tables so the two features never disagree on what exists.

/// How an intrinsic's return type derives from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRule {
    /// Same type as the given argument (0-indexed).
    SameAsArg(usize),
    /// Scalar of the given argument's scalar kind (e.g. `dot`, `length`).
    ScalarOfArg(usize),
    /// A fixed type name.
    Fixed(&'static str),
    /// Matrix-style multiplication of the two arguments (`mul`).
    MatrixMul,
}

/// One intrinsic function.
#[derive(Debug, Clone, Copy)]
pub struct Intrinsic {
    pub name: &'static str,
    pub rule: ReturnRule,
}

const INTRINSICS: &[Intrinsic] = &[
    Intrinsic { name: "abs", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "acos", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "asin", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "atan", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "atan2", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "ceil", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "clamp", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "cos", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "cross", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "ddx", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "ddy", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "degrees", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "distance", rule: ReturnRule::ScalarOfArg(0) },
    Intrinsic { name: "dot", rule: ReturnRule::ScalarOfArg(0) },
    Intrinsic { name: "exp", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "exp2", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "floor", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "fmod", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "frac", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "length", rule: ReturnRule::ScalarOfArg(0) },
    Intrinsic { name: "lerp", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "log", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "log2", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "max", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "min", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "mul", rule: ReturnRule::MatrixMul },
    Intrinsic { name: "normalize", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "pow", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "radians", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "reflect", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "refract", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "rsqrt", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "saturate", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "sign", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "sin", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "smoothstep", rule: ReturnRule::SameAsArg(2) },
    Intrinsic { name: "sqrt", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "step", rule: ReturnRule::SameAsArg(1) },
    Intrinsic { name: "tan", rule: ReturnRule::SameAsArg(0) },
    Intrinsic { name: "transpose", rule: ReturnRule::SameAsArg(0) },
];

/// Look up an intrinsic by name.
pub fn intrinsic(name: &str) -> Option<&'static Intrinsic> {
    INTRINSICS.iter().find(|i| i.name == name)
}

/// All intrinsics, for completion.
pub fn intrinsics() -> &'static [Intrinsic] {
    INTRINSICS
}

/// Keywords offered in general completion contexts.
pub const KEYWORDS: &[&str] = &[
    "shader", "struct", "compose", "stage", "stream", "override", "abstract", "return", "if",
    "else", "for", "cbuffer",
];

/// Built-in type names offered in completion contexts.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "void", "bool", "int", "int2", "int3", "int4", "uint", "uint2", "uint3", "uint4", "half",
    "half2", "half3", "half4", "float", "float2", "float3", "float4", "float3x3", "float4x3",
    "float4x4", "double", "Texture2D", "Texture3D", "TextureCube", "SamplerState",
    "SamplerComparisonState",
];

/// Semantic names offered after `:` in field and parameter positions.
pub const BUILTIN_SEMANTICS: &[&str] = &[
    "SV_Position", "SV_Target", "SV_Target0", "SV_Target1", "SV_Depth", "SV_VertexID",
    "SV_InstanceID", "SV_IsFrontFace", "POSITION", "NORMAL", "TANGENT", "COLOR", "COLOR0",
    "COLOR1", "TEXCOORD0", "TEXCOORD1", "TEXCOORD2", "TEXCOORD3",
];
