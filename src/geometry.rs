//! Small numeric primitives the k-means engine and the initializations are built from.
//!
//! All functions accept rows as anything that can be viewed as a slice (`Vec<T>`, `&[T]`, arrays),
//! so they work on owned feature matrices as well as on borrowed sample chunks.

use crate::{Error, Primitive, Result};

/// Inclusive value range of a single feature column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRange<T: Primitive> {
    pub min: T,
    pub max: T,
}
impl<T: Primitive> FeatureRange<T> {
    /// Whether **value** lies within `[min, max]`.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Euclidean distance between two equal-length vectors: `sqrt(sum((a_i - b_i)^2))`.
///
/// ## Errors
/// [`Error::DimensionMismatch`] if **a** and **b** differ in length.
pub fn distance<T: Primitive>(a: &[T], b: &[T]) -> Result<T> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch { expected: a.len(), found: b.len() });
    }
    Ok(distance_unchecked(a, b))
}

/// [`distance`] without the length check, for the assignment step.
/// Callers have to validate dimensions up front; a longer vector is silently truncated.
#[inline(always)]
pub(crate) fn distance_unchecked<T: Primitive>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter().cloned()
        .zip(b.iter().cloned())
        .map(|(av, bv)| av - bv)        // <a> - <b>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum::<T>()
        .sqrt()
}

/// Reshape row-major **rows** into column-major form (`result[feature][sample]`).
pub fn transpose<T: Primitive, R: AsRef<[T]>>(rows: &[R]) -> Result<Vec<Vec<T>>> {
    let dims = rows.first().ok_or(Error::EmptyInput)?.as_ref().len();
    let mut columns = vec![Vec::with_capacity(rows.len()); dims];
    for row in rows {
        let row = row.as_ref();
        if row.len() != dims {
            return Err(Error::DimensionMismatch { expected: dims, found: row.len() });
        }
        columns.iter_mut().zip(row.iter().cloned())
            .for_each(|(col, v)| col.push(v));
    }
    Ok(columns)
}

/// Per-feature `(min, max)` over all **rows**.
pub fn feature_range<T: Primitive, R: AsRef<[T]>>(rows: &[R]) -> Result<Vec<FeatureRange<T>>> {
    Ok(transpose(rows)?.into_iter()
        .map(|column| {
            let first = column[0];
            column.into_iter().skip(1).fold(FeatureRange { min: first, max: first }, |r, v| FeatureRange {
                min: if v < r.min { v } else { r.min },
                max: if v > r.max { v } else { r.max },
            })
        })
        .collect())
}

/// Per-column arithmetic mean of **rows**.
pub fn column_mean<T: Primitive, R: AsRef<[T]>>(rows: &[R]) -> Result<Vec<T>> {
    let count = T::from(rows.len()).ok_or(Error::InvalidParameter {
        name: "rows",
        message: "row count not representable in the sample primitive",
    })?;
    Ok(transpose(rows)?.into_iter()
        .map(|column| column.into_iter().sum::<T>() / count)
        .collect())
}

/// Index of the smallest value. Ties resolve to the first occurrence.
pub fn arg_min<T: Primitive>(values: &[T]) -> Result<usize> {
    let (first, rest) = values.split_first().ok_or(Error::EmptyInput)?;
    let (mut best_idx, mut best) = (0, *first);
    for (i, v) in rest.iter().cloned().enumerate() {
        if v < best {
            best = v;
            best_idx = i + 1;
        }
    }
    Ok(best_idx)
}
