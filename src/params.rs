//! params — structured parameter sets and their flat representation.
//!
//! Purpose
//! -------
//! Models see parameters as a structured [`ParamSet`]: an optional ordered
//! vector, an optional matrix, and optional element names. The optimizers see
//! a single flat `Array1<f64>`. This module owns the bijection between the
//! two: [`ParamSet::pack`] serializes vector-then-matrix (row-major) into a
//! flat vector, and [`ParamSet::unpack`] rebuilds the structure from a flat
//! vector plus a [`ParamShape`].
//!
//! Key behaviors
//! -------------
//! - `pack`/`unpack` are exact inverses for every non-empty shape.
//! - A shape with neither component is rejected ([`MleError::EmptyParamShape`]);
//!   a flat vector of the wrong length is rejected
//!   ([`MleError::PackLengthMismatch`]).
//! - Empty components (zero-length vector, zero rows or columns) are
//!   normalized to `None` on construction, so equality is well defined.
//!
//! Conventions
//! -----------
//! - Matrix entries are laid out row-major in the flat form.
//! - `names` is carried as metadata only; the flat form never encodes it.
//!   The engine re-attaches names to the final estimate.
use ndarray::{Array1, Array2};

use crate::{
    errors::{MleError, MleResult},
    mle::types::Theta,
};

/// Dimensions of a [`ParamSet`]: ordered-vector length plus matrix rows/cols.
///
/// A component is absent when its dimensions are zero. The total flat length
/// is `vector_len + rows * cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamShape {
    pub vector_len: usize,
    pub rows: usize,
    pub cols: usize,
}

impl ParamShape {
    /// Shape of an ordered-vector-only parameter set.
    pub fn vector(len: usize) -> Self {
        ParamShape { vector_len: len, rows: 0, cols: 0 }
    }

    /// Shape of a matrix-only parameter set.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        ParamShape { vector_len: 0, rows, cols }
    }

    /// Total number of free parameters described by this shape.
    pub fn len(&self) -> usize {
        self.vector_len + self.rows * self.cols
    }

    /// True when the shape describes zero parameters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A structured parameter set: optional ordered vector, optional matrix,
/// optional element names.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    pub vector: Option<Array1<f64>>,
    pub matrix: Option<Array2<f64>>,
    pub names: Option<Vec<String>>,
}

impl ParamSet {
    /// Construct a parameter set, normalizing empty components to `None`.
    pub fn new(vector: Option<Array1<f64>>, matrix: Option<Array2<f64>>) -> Self {
        let vector = vector.filter(|v| !v.is_empty());
        let matrix = matrix.filter(|m| m.nrows() > 0 && m.ncols() > 0);
        ParamSet { vector, matrix, names: None }
    }

    /// Convenience constructor for an ordered-vector-only set.
    pub fn from_vector(vector: Array1<f64>) -> Self {
        ParamSet::new(Some(vector), None)
    }

    /// Convenience constructor for a matrix-only set.
    pub fn from_matrix(matrix: Array2<f64>) -> Self {
        ParamSet::new(None, Some(matrix))
    }

    /// Attach element names. Metadata only; never packed.
    pub fn with_names(mut self, names: Option<Vec<String>>) -> Self {
        self.names = names;
        self
    }

    /// The shape of this parameter set.
    pub fn shape(&self) -> ParamShape {
        ParamShape {
            vector_len: self.vector.as_ref().map_or(0, |v| v.len()),
            rows: self.matrix.as_ref().map_or(0, |m| m.nrows()),
            cols: self.matrix.as_ref().map_or(0, |m| m.ncols()),
        }
    }

    /// Borrow the ordered component.
    ///
    /// # Errors
    /// [`MleError::MissingComponent`] when the set has no vector.
    pub fn vector(&self) -> MleResult<&Array1<f64>> {
        self.vector.as_ref().ok_or(MleError::MissingComponent { which: "vector" })
    }

    /// Borrow the matrix component.
    ///
    /// # Errors
    /// [`MleError::MissingComponent`] when the set has no matrix.
    pub fn matrix(&self) -> MleResult<&Array2<f64>> {
        self.matrix.as_ref().ok_or(MleError::MissingComponent { which: "matrix" })
    }

    /// Serialize into the flat optimizer form: ordered component first, then
    /// the matrix row by row.
    ///
    /// # Errors
    /// [`MleError::EmptyParamShape`] when the set has neither component.
    pub fn pack(&self) -> MleResult<Theta> {
        let len = self.shape().len();
        if len == 0 {
            return Err(MleError::EmptyParamShape);
        }
        let mut flat = Vec::with_capacity(len);
        if let Some(v) = &self.vector {
            flat.extend(v.iter().copied());
        }
        if let Some(m) = &self.matrix {
            // ndarray iterates in logical (row-major) order.
            flat.extend(m.iter().copied());
        }
        Ok(Array1::from(flat))
    }

    /// Rebuild a structured set from a flat vector and its shape. Exact
    /// inverse of [`ParamSet::pack`].
    ///
    /// # Errors
    /// - [`MleError::EmptyParamShape`] when the shape has no components.
    /// - [`MleError::PackLengthMismatch`] when `flat.len() != shape.len()`.
    pub fn unpack(flat: &Theta, shape: &ParamShape) -> MleResult<ParamSet> {
        if shape.is_empty() {
            return Err(MleError::EmptyParamShape);
        }
        if flat.len() != shape.len() {
            return Err(MleError::PackLengthMismatch {
                expected: shape.len(),
                found: flat.len(),
            });
        }
        let vector = if shape.vector_len > 0 {
            Some(flat.slice(ndarray::s![..shape.vector_len]).to_owned())
        } else {
            None
        };
        let matrix = if shape.rows > 0 && shape.cols > 0 {
            let tail: Vec<f64> = flat.iter().skip(shape.vector_len).copied().collect();
            // Length already checked against the shape.
            Some(
                Array2::from_shape_vec((shape.rows, shape.cols), tail)
                    .map_err(|_| MleError::PackLengthMismatch {
                        expected: shape.rows * shape.cols,
                        found: flat.len() - shape.vector_len,
                    })?,
            )
        } else {
            None
        };
        Ok(ParamSet { vector, matrix, names: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    // Purpose: a vector-only set survives a pack/unpack round trip.
    // Given: an ordered component of length 3.
    // Expect: unpack(pack(x)) == x.
    #[test]
    fn vector_only_round_trip() {
        let set = ParamSet::from_vector(arr1(&[1.0, -2.0, 3.5]));
        let flat = set.pack().unwrap();
        assert_eq!(flat, arr1(&[1.0, -2.0, 3.5]));
        let back = ParamSet::unpack(&flat, &set.shape()).unwrap();
        assert_eq!(back, set);
    }

    // Purpose: a matrix-only set packs row-major and round-trips.
    // Given: a 2x2 matrix component.
    // Expect: flat form is [a11, a12, a21, a22] and unpack restores the matrix.
    #[test]
    fn matrix_only_round_trip_row_major() {
        let set = ParamSet::from_matrix(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let flat = set.pack().unwrap();
        assert_eq!(flat, arr1(&[1.0, 2.0, 3.0, 4.0]));
        let back = ParamSet::unpack(&flat, &set.shape()).unwrap();
        assert_eq!(back, set);
    }

    // Purpose: vector and matrix together pack vector-first.
    // Given: a length-2 vector and a 2x3 matrix.
    // Expect: flat length 8, vector entries first, and a clean round trip.
    #[test]
    fn mixed_round_trip() {
        let set = ParamSet::new(
            Some(arr1(&[0.5, 1.5])),
            Some(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])),
        );
        let flat = set.pack().unwrap();
        assert_eq!(flat.len(), 8);
        assert_eq!(flat[0], 0.5);
        assert_eq!(flat[2], 1.0);
        let back = ParamSet::unpack(&flat, &set.shape()).unwrap();
        assert_eq!(back, set);
    }

    // Purpose: degenerate components are normalized away.
    // Given: a zero-row matrix alongside a vector.
    // Expect: the set behaves as vector-only and round-trips.
    #[test]
    fn zero_row_matrix_normalizes_to_vector_only() {
        let set = ParamSet::new(Some(arr1(&[7.0])), Some(Array2::zeros((0, 3))));
        assert_eq!(set.shape(), ParamShape::vector(1));
        let flat = set.pack().unwrap();
        let back = ParamSet::unpack(&flat, &set.shape()).unwrap();
        assert_eq!(back, set);
    }

    // Purpose: an empty set cannot be packed.
    // Given: a set with neither component.
    // Expect: EmptyParamShape from pack and from unpack of its shape.
    #[test]
    fn empty_set_is_an_error() {
        let set = ParamSet::new(None, None);
        assert_eq!(set.pack(), Err(MleError::EmptyParamShape));
        let shape = ParamShape { vector_len: 0, rows: 0, cols: 0 };
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(ParamSet::unpack(&empty, &shape), Err(MleError::EmptyParamShape));
    }

    // Purpose: a flat vector of the wrong length is rejected.
    // Given: shape of length 3 and a flat vector of length 2.
    // Expect: PackLengthMismatch with both lengths reported.
    #[test]
    fn length_mismatch_is_rejected() {
        let shape = ParamShape::vector(3);
        let err = ParamSet::unpack(&arr1(&[1.0, 2.0]), &shape).unwrap_err();
        assert_eq!(err, MleError::PackLengthMismatch { expected: 3, found: 2 });
    }

    // Purpose: names are metadata and never enter the flat form.
    // Given: a named vector set.
    // Expect: pack output is numeric only; unpack yields an unnamed set.
    #[test]
    fn names_are_not_packed() {
        let set = ParamSet::from_vector(arr1(&[1.0, 2.0]))
            .with_names(Some(vec!["a".into(), "b".into()]));
        let flat = set.pack().unwrap();
        let back = ParamSet::unpack(&flat, &set.shape()).unwrap();
        assert!(back.names.is_none());
    }
}
