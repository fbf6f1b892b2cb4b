use crate::geometry::{self, FeatureRange};
use crate::{Error, Primitive, Result};
use std::cell::RefCell;
use rand::prelude::*;

/// Iteration cap used by [`KMeans::fit`].
pub const DEFAULT_MAX_ITER: usize = 300;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, usize);

/// What happens to a centroid that has no samples assigned to it after an assignment step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Remove the centroid from the centroid set. Subsequent iterations run with fewer clusters,
    /// and the remaining centroids are renumbered in their original order.
    #[default]
    Drop,
    /// Replace the centroid with a new one, drawn uniformly from the feature ranges of the input.
    Reseed,
}

/// This is a structure holding various configuration options for a k-means calculation, such as
/// the random number generator to use, the empty-cluster handling, or a couple of callbacks, that can be
/// set to get status information from a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization and the first assignment step
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **changed**: Amount of samples whose assignment changed in this iteration
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// Handling of centroids that lost all of their samples
    pub(crate) empty_cluster: EmptyClusterPolicy,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
    pub fn empty_cluster_policy(&self) -> EmptyClusterPolicy { self.empty_cluster }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("empty_cluster", &self.empty_cluster)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the handling of clusters that become empty during the calculation.
    /// ## Default
    /// [`EmptyClusterPolicy::Drop`]
    pub fn empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster = policy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation, as
/// well as the final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The total sum of squared distances from all samples to their respective centroids
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...].
///   With [`EmptyClusterPolicy::Drop`], this may hold less than **k** centroids.
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest centroid
/// - **centroid_distances**: Vector containing each sample's (euclidean) distance to its centroid
/// - **iterations**: Amount of update/assignment iterations that were run
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub iterations: usize,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![T::zero();sample_dims * k],
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            centroid_distances: vec![T::infinity();sample_cnt],
            iterations: 0,
            sample_dims
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }

    /// Amount of centroids currently in the centroid set.
    pub fn centroid_cnt(&self) -> usize {
        self.centroids.len() / self.sample_dims
    }
    /// Iterate over the centroids, one slice per centroid.
    pub fn centroids_iter(&self) -> impl Iterator<Item = &[T]> {
        self.centroids.chunks_exact(self.sample_dims)
    }
    /// The centroid with index **idx**, if it exists.
    pub fn centroid(&self, idx: usize) -> Option<&[T]> {
        self.centroids_iter().nth(idx)
    }
}




/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Supported initialization methods
/// - Random-Range [`KMeans::init_random_range`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed [`KMeans::init_precomputed`]
#[derive(Clone, Debug)]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    ///
    /// ## Errors
    /// [`Error::EmptyInput`] without samples or dimensions, [`Error::DimensionMismatch`] if **samples**
    /// does not hold `sample_cnt * sample_dims` values and [`Error::InvalidParameter`] for non-finite values
    /// or a shape whose value count does not fit into `usize`.
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        if sample_cnt == 0 || sample_dims == 0 {
            return Err(Error::EmptyInput);
        }
        let expected = sample_cnt.checked_mul(sample_dims)
            .ok_or(Error::InvalidParameter { name: "sample_cnt", message: "sample_cnt * sample_dims overflows" })?;
        if samples.len() != expected {
            return Err(Error::DimensionMismatch { expected, found: samples.len() });
        }
        if samples.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter { name: "samples", message: "all sample values have to be finite" });
        }
        Ok(Self { sample_cnt, sample_dims, samples })
    }

    /// Create a new instance from a feature matrix given as one vector per sample.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let sample_dims = rows.first().ok_or(Error::EmptyInput)?.as_ref().len();
        let mut samples = Vec::with_capacity(rows.len() * sample_dims);
        for row in rows {
            let row = row.as_ref();
            if row.len() != sample_dims {
                return Err(Error::DimensionMismatch { expected: sample_dims, found: row.len() });
            }
            samples.extend_from_slice(row);
        }
        Self::new(samples, rows.len(), sample_dims)
    }

    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Iterate over the samples, one slice per sample.
    pub fn samples_iter(&self) -> impl Iterator<Item = &[T]> {
        self.samples.chunks_exact(self.sample_dims)
    }

    /// Per-feature `(min, max)` over all samples.
    pub fn feature_range(&self) -> Result<Vec<FeatureRange<T>>> {
        let rows: Vec<&[T]> = self.samples_iter().collect();
        geometry::feature_range(&rows)
    }


    /// Assign every sample to its nearest centroid (ties resolve to the lowest centroid index), updating
    /// the assignments, the per-sample distances and the distsum of **state**.
    ///
    /// ## Returns
    /// The amount of samples whose assignment changed, or [`Error::DegenerateClustering`] if the centroid
    /// set of **state** is empty.
    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>) -> Result<usize> {
        if state.centroid_cnt() == 0 {
            return Err(Error::DegenerateClustering);
        }
        let mut dists = vec![T::zero(); state.centroid_cnt()];
        let mut changed = 0;
        let mut distsum = T::zero();

        self.samples.chunks_exact(self.sample_dims)
            .zip(state.assignments.iter_mut())
            .zip(state.centroid_distances.iter_mut())
            .try_for_each(|((s, assignment), centroid_dist)| {
                dists.iter_mut()
                    .zip(state.centroids.chunks_exact(self.sample_dims))
                    .for_each(|(d, c)| *d = geometry::distance_unchecked(s, c));
                let best_idx = geometry::arg_min(&dists)?;
                if *assignment != best_idx {
                    changed += 1;
                    *assignment = best_idx;
                }
                *centroid_dist = dists[best_idx];
                distsum += dists[best_idx] * dists[best_idx];
                Ok::<_, Error>(())
            })?;

        state.distsum = distsum;
        Ok(changed)
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut Vec<usize>, centroid_cnt: usize) -> usize {
        centroid_frequency.clear();
        centroid_frequency.resize(centroid_cnt, 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }

    /// Run a single assignment step against the given **centroids** [row-major], without updating them.
    ///
    /// Applied to the centroids of a converged [`KMeansState`], this reproduces its assignments.
    pub fn assign(&self, centroids: &[T]) -> Result<Vec<usize>> {
        if centroids.is_empty() {
            return Err(Error::EmptyInput);
        }
        if centroids.len() % self.sample_dims != 0 {
            return Err(Error::DimensionMismatch {
                expected: (centroids.len() / self.sample_dims + 1) * self.sample_dims,
                found: centroids.len(),
            });
        }
        let mut state = KMeansState::new(self.sample_cnt, self.sample_dims, centroids.len() / self.sample_dims);
        state.centroids.copy_from_slice(centroids);
        self.update_cluster_assignments(&mut state)?;
        Ok(state.assignments)
    }



    /// Normal K-Means algorithm implementation (Lloyd).
    ///
    /// The centroids are initialized once, then the assignment and update steps alternate until an assignment
    /// step leaves every sample in its cluster.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Limit the maximum amount of iterations
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Errors
    /// - [`Error::InvalidClusterCount`] if `k == 0` or `k > sample_cnt`
    /// - [`Error::InvalidParameter`] if `max_iter == 0`
    /// - [`Error::DegenerateClustering`] if all centroids became empty
    /// - [`Error::NoConvergence`] if the assignments did not stabilize within **max_iter** iterations
    ///
    /// ## Example
    /// ```rust
    /// use iris_kmeans::*;
    /// use rand::prelude::*;
    ///
    /// let samples = vec![0.0f64, 0.0, 0.0, 1.0, 1.0, 0.0, 10.0, 10.0, 10.0, 11.0, 11.0, 10.0];
    /// let kmean = KMeans::new(samples, 6, 2).unwrap();
    /// let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(42)).build();
    /// let result = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();
    ///
    /// println!("Centroids: {:?}", result.centroids);
    /// println!("Cluster-Assignments: {:?}", result.assignments);
    /// println!("Error: {}", result.distsum);
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// Cluster the samples into (at most) **k** clusters and return the cluster index of every sample.
    ///
    /// Uses [`KMeans::init_random_range`] and an iteration cap of [`DEFAULT_MAX_ITER`].
    pub fn fit(&self, k: usize, config: &KMeansConfig<'_, T>) -> Result<Vec<usize>> {
        self.kmeans_lloyd(k, DEFAULT_MAX_ITER, KMeans::init_random_range, config)
            .map(|state| state.assignments)
    }

    /// Random-Range initialization method
    ///
    /// ## Description
    /// Every feature of every centroid is drawn independently and uniformly from the `[min, max]` range
    /// of that feature over all samples.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_range<'a>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
        crate::inits::randomrange::calculate(kmean, state, config)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method randomly selects k distinct samples as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample<'a>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'a, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Uses the given **centroids** [row-major] as initial centroids. There have to be exactly **k** of them.
    pub fn init_precomputed(centroids: Vec<T>) -> impl FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>) -> Result<()> {
        move |kmean, state, config| crate::inits::precomputed::calculate(kmean, state, config, centroids)
    }
}
