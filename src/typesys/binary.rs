//! Result types of binary operators.

use super::types::{ScalarKind, TypeInfo};
use crate::syntax::BinaryOp;

/// Infer the result type of `left op right`, or `None` when the operand
/// shapes do not combine.
///
/// - Comparison and logical operators yield bool, widened to the operands'
///   max vector length when either side is a vector.
/// - Multiplication with a matrix operand composes dimensions as
///   (M×N)·(N×P) = (M×P), collapsing to vector or scalar where a result
///   dimension is 1.
/// - All other arithmetic combines at the minimum shared vector length
///   (no implicit widening), promotes the scalar kind to the higher rank,
///   and lets a scalar operand broadcast against a vector or matrix.
pub fn binary_result_type(left: &TypeInfo, right: &TypeInfo, op: BinaryOp) -> Option<TypeInfo> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }

    if op.yields_bool() {
        let width = left.rows.max(right.rows);
        if left.is_matrix || right.is_matrix {
            return None;
        }
        return Some(if width > 1 {
            TypeInfo::vector_of(ScalarKind::Bool, width)
        } else {
            TypeInfo::scalar_of(ScalarKind::Bool)
        });
    }

    let scalar = if left.scalar.rank() >= right.scalar.rank() {
        left.scalar
    } else {
        right.scalar
    };

    if op == BinaryOp::Mul && (left.is_matrix || right.is_matrix) {
        return matrix_multiply(left, right, scalar);
    }

    // Scalar operands broadcast against anything.
    if left.is_scalar() {
        return Some(reshaped(right, scalar));
    }
    if right.is_scalar() {
        return Some(reshaped(left, scalar));
    }

    if left.is_matrix || right.is_matrix {
        // Componentwise arithmetic on the overlapping block.
        let rows = left.rows.min(right.rows);
        let cols = left.cols.min(right.cols);
        return Some(TypeInfo::matrix_of(scalar, rows, cols));
    }

    // Vector ∘ vector: minimum shared length, no implicit widening.
    let len = left.rows.min(right.rows);
    Some(TypeInfo::vector_of(scalar, len))
}

/// (M×N)·(N×P) = (M×P); vectors participate as a row on the left and a
/// column on the right; scalars scale componentwise.
fn matrix_multiply(left: &TypeInfo, right: &TypeInfo, scalar: ScalarKind) -> Option<TypeInfo> {
    if left.is_scalar() {
        return Some(reshaped(right, scalar));
    }
    if right.is_scalar() {
        return Some(reshaped(left, scalar));
    }

    let (m, n_left) = if left.is_matrix {
        (left.rows, left.cols)
    } else {
        (1, left.rows)
    };
    let (n_right, p) = if right.is_matrix {
        (right.rows, right.cols)
    } else {
        (right.rows, 1)
    };

    if n_left != n_right {
        return None;
    }

    Some(match (m, p) {
        (1, 1) => TypeInfo::scalar_of(scalar),
        (1, len) => TypeInfo::vector_of(scalar, len),
        (len, 1) => TypeInfo::vector_of(scalar, len),
        (rows, cols) => TypeInfo::matrix_of(scalar, rows, cols),
    })
}

/// Same shape as `shape`, with the scalar kind replaced.
fn reshaped(shape: &TypeInfo, scalar: ScalarKind) -> TypeInfo {
    if shape.is_matrix {
        TypeInfo::matrix_of(scalar, shape.rows, shape.cols)
    } else if shape.rows > 1 {
        TypeInfo::vector_of(scalar, shape.rows)
    } else {
        TypeInfo::scalar_of(scalar)
    }
}
