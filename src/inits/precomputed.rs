use crate::{KMeans, KMeansState, KMeansConfig, Error, Primitive, Result};

#[inline(always)]
pub fn calculate<T: Primitive>(
    kmean: &KMeans<T>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<()> {
    if computed.len() != state.k * kmean.sample_dims {
        return Err(Error::DimensionMismatch { expected: state.k * kmean.sample_dims, found: computed.len() });
    }
    if computed.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidParameter { name: "centroids", message: "all centroid values have to be finite" });
    }
    computed.chunks_exact(kmean.sample_dims).enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.iter().cloned());
    });
    Ok(())
}
