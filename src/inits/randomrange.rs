use crate::geometry::FeatureRange;
use crate::{Error, KMeans, KMeansState, KMeansConfig, Primitive, Result};
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)] pub fn calculate<'a, T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
    let ranges = kmean.feature_range()?;
    let mut rnd = config.rnd.borrow_mut();
    for ci in 0..state.k {
        let centroid = random_point(&ranges, rnd.deref_mut())?;
        state.set_centroid_from_iter(ci, centroid.into_iter());
    }
    Ok(())
}

/// Draw one point, every feature uniformly from its `[min, max]` range.
///
/// Fails with [`Error::InvalidParameter`] if the width `max - min` of a range is not finite (non-finite
/// samples, or a span beyond the primitive's maximum), since no uniform distribution exists over it.
pub(crate) fn random_point<T: Primitive, R: Rng + ?Sized>(ranges: &[FeatureRange<T>], rnd: &mut R) -> Result<Vec<T>> {
    ranges.iter()
        .map(|r| match (r.max - r.min).is_finite() {
            true => Ok(rnd.gen_range(r.min..=r.max)),
            false => Err(Error::InvalidParameter { name: "samples", message: "feature range too wide to sample from" }),
        })
        .collect()
}
