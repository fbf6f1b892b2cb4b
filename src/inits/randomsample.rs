use crate::{KMeans, KMeansState, KMeansConfig, Error, Primitive, Result};
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)] pub fn calculate<'a, T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
    let chosen = kmean.samples_iter()
        .choose_multiple(config.rnd.borrow_mut().deref_mut(), state.k);
    if chosen.len() != state.k {
        return Err(Error::InvalidClusterCount { requested: state.k, n_items: kmean.sample_cnt });
    }
    chosen.into_iter()
        .enumerate()
        .for_each(|(ci, c)| { // Copy randomly chosen samples into state.centroids
            state.set_centroid_from_iter(ci, c.iter().cloned());
        });
    Ok(())
}
