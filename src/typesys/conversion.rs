//! Conversion legality between type shapes.

use super::types::TypeInfo;

/// What a conversion costs, when it is allowed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionWarning {
    /// Demotion to a lower scalar rank.
    PrecisionLoss,
    /// Signed/unsigned integer crossing.
    SignednessChange,
    /// Components dropped (vector shortening, matrix shrinking,
    /// vector-to-scalar collapse).
    Truncation,
}

/// Verdict of [`check_conversion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub allowed: bool,
    pub implicit: bool,
    pub warning: Option<ConversionWarning>,
}

impl Conversion {
    pub const IMPLICIT: Conversion = Conversion {
        allowed: true,
        implicit: true,
        warning: None,
    };

    pub const NOT_ALLOWED: Conversion = Conversion {
        allowed: false,
        implicit: false,
        warning: None,
    };

    fn implicit_with(warning: ConversionWarning) -> Self {
        Conversion {
            allowed: true,
            implicit: true,
            warning: Some(warning),
        }
    }

    fn explicit_with(warning: ConversionWarning) -> Self {
        Conversion {
            allowed: true,
            implicit: false,
            warning: Some(warning),
        }
    }
}

/// Check whether `from` converts to `to`.
///
/// Rules, in order:
/// - identical shapes convert implicitly;
/// - texture/sampler objects convert only to themselves;
/// - scalar sources broadcast to any shape (cost of the scalar step kept);
/// - otherwise rows and cols are compared independently: growth in either
///   dimension is rejected (no implicit extension), shrink in either is a
///   truncation warning; the scalar step contributes its own verdict.
pub fn check_conversion(from: &TypeInfo, to: &TypeInfo) -> Conversion {
    if from == to {
        return Conversion::IMPLICIT;
    }

    match (from.object, to.object) {
        (Some(a), Some(b)) if a == b => return Conversion::IMPLICIT,
        (Some(_), _) | (_, Some(_)) => return Conversion::NOT_ALLOWED,
        (None, None) => {}
    }

    let scalar_step = scalar_conversion(from, to);

    // Scalar source broadcasts to vectors and matrices.
    if from.is_scalar() {
        return scalar_step;
    }

    // No implicit extension in either dimension.
    if to.rows > from.rows || to.cols > from.cols {
        return Conversion::NOT_ALLOWED;
    }

    let truncates = to.rows < from.rows || to.cols < from.cols;
    if truncates {
        if !scalar_step.allowed {
            return Conversion::NOT_ALLOWED;
        }
        // The dimension change dominates the report.
        return Conversion {
            allowed: true,
            implicit: scalar_step.implicit,
            warning: Some(ConversionWarning::Truncation),
        };
    }

    scalar_step
}

/// The scalar-kind step shared by every shape rule.
fn scalar_conversion(from: &TypeInfo, to: &TypeInfo) -> Conversion {
    if from.scalar == to.scalar {
        return Conversion::IMPLICIT;
    }
    if from.scalar.crosses_sign_with(&to.scalar) {
        return Conversion::implicit_with(ConversionWarning::SignednessChange);
    }
    if from.scalar.rank() < to.scalar.rank() {
        return Conversion::IMPLICIT;
    }
    Conversion::explicit_with(ConversionWarning::PrecisionLoss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesys::parse_type;
    use rstest::rstest;

    fn conv(from: &str, to: &str) -> Conversion {
        check_conversion(&parse_type(from).unwrap(), &parse_type(to).unwrap())
    }

    #[rstest]
    #[case("float")]
    #[case("float3")]
    #[case("float4x4")]
    #[case("int")]
    #[case("bool4")]
    #[case("Texture2D")]
    fn test_identity_is_implicit(#[case] name: &str) {
        assert_eq!(conv(name, name), Conversion::IMPLICIT);
    }

    #[test]
    fn test_promotion_is_implicit() {
        assert_eq!(conv("int", "float"), Conversion::IMPLICIT);
        assert_eq!(conv("half", "double"), Conversion::IMPLICIT);
        assert_eq!(conv("bool", "int"), Conversion::IMPLICIT);
    }

    #[test]
    fn test_demotion_warns_and_is_explicit() {
        let c = conv("float", "int");
        assert!(c.allowed);
        assert!(!c.implicit);
        assert_eq!(c.warning, Some(ConversionWarning::PrecisionLoss));
    }

    #[test]
    fn test_sign_crossing_warns() {
        let c = conv("int", "uint");
        assert!(c.allowed);
        assert_eq!(c.warning, Some(ConversionWarning::SignednessChange));
        let c = conv("uint", "int");
        assert!(c.allowed);
        assert_eq!(c.warning, Some(ConversionWarning::SignednessChange));
    }

    #[test]
    fn test_scalar_broadcast() {
        assert_eq!(conv("float", "float3"), Conversion::IMPLICIT);
        assert_eq!(conv("float", "float4x4"), Conversion::IMPLICIT);
        assert_eq!(conv("int", "float3"), Conversion::IMPLICIT);
    }

    #[test]
    fn test_vector_truncation_warns() {
        let c = conv("float4", "float2");
        assert!(c.allowed);
        assert_eq!(c.warning, Some(ConversionWarning::Truncation));
        let c = conv("float3", "float");
        assert!(c.allowed);
        assert_eq!(c.warning, Some(ConversionWarning::Truncation));
    }

    #[test]
    fn test_vector_extension_rejected() {
        assert!(!conv("float2", "float3").allowed);
        assert!(!conv("float3", "float4").allowed);
    }

    #[test]
    fn test_matrix_dimensions_independent() {
        assert!(conv("float4x4", "float3x3").allowed);
        assert_eq!(
            conv("float4x4", "float3x3").warning,
            Some(ConversionWarning::Truncation)
        );
        assert!(!conv("float3x3", "float4x4").allowed);
        assert!(!conv("float2x4", "float4x2").allowed);
    }

    #[test]
    fn test_objects_only_to_self() {
        assert!(conv("Texture2D", "Texture2D").allowed);
        assert!(!conv("Texture2D", "SamplerState").allowed);
        assert!(!conv("Texture2D", "float4").allowed);
        assert!(!conv("float4", "SamplerState").allowed);
    }
}
