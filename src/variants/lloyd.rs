use crate::geometry::{self, FeatureRange};
use crate::inits::randomrange;
use crate::{EmptyClusterPolicy, Error, KMeans, KMeansConfig, KMeansState, Primitive, Result};
use std::ops::DerefMut;
use tracing::{debug, info, warn};

pub(crate) struct Lloyd<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Lloyd<T> {
    /// Replace the centroid set with the means of the current clusters.
    /// Centroids without samples are dropped or reseeded, as configured.
    fn update_centroids(data: &KMeans<T>, state: &mut KMeansState<T>, ranges: &[FeatureRange<T>], config: &KMeansConfig<'_, T>) -> Result<()> {
        let centroid_cnt = state.centroid_cnt();
        let mut groups: Vec<Vec<&[T]>> = vec![Vec::new(); centroid_cnt];
        data.samples_iter()
            .zip(state.assignments.iter().cloned())
            .for_each(|(s, centroid_id)| groups[centroid_id].push(s));

        let mut new_centroids = Vec::with_capacity(state.centroids.len());
        let mut empty_cnt = 0;
        for group in &groups {
            if group.is_empty() {
                empty_cnt += 1;
                if config.empty_cluster == EmptyClusterPolicy::Reseed {
                    let mut rnd = config.rnd.borrow_mut();
                    new_centroids.extend(randomrange::random_point(ranges, rnd.deref_mut())?);
                }
                continue;
            }
            new_centroids.extend(geometry::column_mean(group)?);
        }

        if empty_cnt == centroid_cnt || new_centroids.is_empty() {
            return Err(Error::DegenerateClustering);
        }
        if empty_cnt > 0 {
            match config.empty_cluster {
                EmptyClusterPolicy::Drop => warn!(empty_cnt, remaining = centroid_cnt - empty_cnt, "dropping empty clusters"),
                EmptyClusterPolicy::Reseed => warn!(empty_cnt, "reseeding empty clusters"),
            }
        }
        state.centroids = new_centroids;
        Ok(())
    }

    pub fn calculate<'a, F>(data: &KMeans<T>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 || k > data.sample_cnt {
            return Err(Error::InvalidClusterCount { requested: k, n_items: data.sample_cnt });
        }
        if max_iter == 0 {
            return Err(Error::InvalidParameter { name: "max_iter", message: "at least one iteration is required" });
        }
        let ranges = data.feature_range()?;

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);

        // Initialize clusters, do the first assignment and notify subscriber
        init(data, &mut state, config)?;
        data.update_cluster_assignments(&mut state)?;
        (config.init_done)(&state);
        debug!(k, sample_cnt = data.sample_cnt, sample_dims = data.sample_dims, distsum = %state.distsum, "centroids initialized");

        for i in 1..=max_iter {
            Self::update_centroids(data, &mut state, &ranges, config)?;
            let changed = data.update_cluster_assignments(&mut state)?;
            state.iterations = i;

            // Notify subscriber about finished iteration
            (config.iteration_done)(&state, i, changed);
            debug!(iteration = i, changed, centroids = state.centroid_cnt(), distsum = %state.distsum, "iteration done");

            if changed == 0 {
                let centroid_cnt = state.centroid_cnt();
                let used = data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency, centroid_cnt);
                info!(iterations = i, centroids = centroid_cnt, used, distsum = %state.distsum, "k-means converged");
                return Ok(state);
            }
        }

        warn!(max_iter, "k-means did not converge");
        Err(Error::NoConvergence { iterations: max_iter })
    }
}




#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::assert_same_partition;
    use rand::prelude::*;
    use std::cell::Cell;

    fn two_groups() -> KMeans<f64> {
        KMeans::from_rows(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0], [10.0, 11.0], [11.0, 10.0]]).unwrap()
    }

    #[test]
    fn two_obvious_groups() {
        let kmean = two_groups();
        let conf = KMeansConfig::default();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![1.0, 1.0, 9.0, 9.0]), &conf).unwrap();
        assert_same_partition(&[0, 0, 0, 1, 1, 1], &res.assignments);
        assert_eq!(res.centroid_frequency, vec![3, 3]);
        assert_approx_eq!(res.centroids[0], 1.0 / 3.0);
        assert_approx_eq!(res.centroids[1], 1.0 / 3.0);
        assert_approx_eq!(res.centroids[2], 31.0 / 3.0);
        assert_approx_eq!(res.centroids[3], 31.0 / 3.0);
    }

    #[test]
    fn two_obvious_groups_swapped_init() {
        let kmean = two_groups();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![10.5, 10.5, 0.5, 0.5]), &KMeansConfig::default()).unwrap();
        assert_eq!(res.assignments, vec![1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn converged_assignments_are_a_fixed_point() {
        let mut rnd = StdRng::seed_from_u64(11);
        let samples: Vec<f64> = (0..200 * 4).map(|_| rnd.gen_range(-5.0..5.0)).collect();
        let kmean = KMeans::new(samples, 200, 4).unwrap();
        for seed in 0..10 {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let res = kmean.kmeans_lloyd(3, 1000, KMeans::init_random_range, &conf).unwrap();
            assert_eq!(kmean.assign(&res.centroids).unwrap(), res.assignments);
            assert_eq!(res.assignments.len(), 200);
            assert!(res.assignments.iter().all(|&a| a < res.centroid_cnt()));
            assert_eq!(res.centroid_frequency.iter().sum::<usize>(), 200);
        }
    }

    #[test]
    fn empty_cluster_is_dropped() {
        let kmean = KMeans::from_rows(&[[1.0f64, 0.0], [2.0, 0.0], [3.0, 0.0]]).unwrap();
        // Second centroid is too far away to ever get a sample
        let res = kmean.kmeans_lloyd(2, 10, KMeans::init_precomputed(vec![2.0, 0.0, 1337.0, 0.0]), &KMeansConfig::default()).unwrap();
        assert_eq!(res.k, 2);
        assert_eq!(res.centroid_cnt(), 1);
        assert_eq!(res.centroids, vec![2.0, 0.0]);
        assert_eq!(res.assignments, vec![0, 0, 0]);
        assert_eq!(res.centroid_frequency, vec![3]);
        assert_approx_eq!(res.distsum, 2.0);
    }

    #[test]
    fn dropping_renumbers_remaining_centroids() {
        let kmean = KMeans::from_rows(&[[0.0f64], [1.0], [10.0], [11.0]]).unwrap();
        let res = kmean.kmeans_lloyd(3, 10, KMeans::init_precomputed(vec![-500.0, 0.5, 10.5]), &KMeansConfig::default()).unwrap();
        assert_eq!(res.centroids, vec![0.5, 10.5]);
        assert_eq!(res.assignments, vec![0, 0, 1, 1]);
        assert_eq!(res.iterations, 2);
    }

    #[test]
    fn empty_cluster_is_reseeded() {
        let kmean = KMeans::from_rows(&[[1.0f64, 0.0], [2.0, 0.0], [3.0, 0.0]]).unwrap();
        let conf = KMeansConfig::build()
            .empty_cluster(EmptyClusterPolicy::Reseed)
            .random_generator(StdRng::seed_from_u64(1))
            .build();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![2.0, 0.0, 1337.0, 0.0]), &conf).unwrap();
        assert_eq!(res.centroid_cnt(), 2);
        assert_eq!(res.centroid_frequency.iter().sum::<usize>(), 3);
        let ranges = kmean.feature_range().unwrap();
        for c in res.centroids_iter() {
            assert!(ranges[0].contains(c[0]) && ranges[1].contains(c[1]));
        }
        assert_eq!(kmean.assign(&res.centroids).unwrap(), res.assignments);
    }

    #[test]
    fn reseeding_from_unbounded_range_fails() {
        // Both samples are nearest to the first centroid (every distance overflows), the second one gets reseeded
        let kmean = KMeans::from_rows(&[[-1e308f64], [1e308]]).unwrap();
        let conf = KMeansConfig::build()
            .empty_cluster(EmptyClusterPolicy::Reseed)
            .random_generator(StdRng::seed_from_u64(1))
            .build();
        let err = kmean.kmeans_lloyd(2, 10, KMeans::init_precomputed(vec![0.0, 1e300]), &conf).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "samples", .. }));
    }

    #[test]
    fn invalid_cluster_counts() {
        let kmean = two_groups();
        let conf = KMeansConfig::default();
        assert_eq!(kmean.kmeans_lloyd(0, 10, KMeans::init_random_range, &conf).unwrap_err(),
            Error::InvalidClusterCount { requested: 0, n_items: 6 });
        assert_eq!(kmean.kmeans_lloyd(7, 10, KMeans::init_random_range, &conf).unwrap_err(),
            Error::InvalidClusterCount { requested: 7, n_items: 6 });
        assert!(matches!(kmean.kmeans_lloyd(2, 0, KMeans::init_random_range, &conf),
            Err(Error::InvalidParameter { name: "max_iter", .. })));
    }

    #[test]
    fn iteration_cap_surfaces_no_convergence() {
        // Centroids start far off to the side, so the first update necessarily moves samples between clusters
        let kmean = KMeans::from_rows(&[[0.0f64], [1.0], [2.0], [3.0], [10.0], [11.0], [12.0], [13.0]]).unwrap();
        let err = kmean.kmeans_lloyd(2, 1, KMeans::init_precomputed(vec![-100.0, 0.0]), &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, Error::NoConvergence { iterations: 1 });
    }

    #[test]
    fn status_callbacks() {
        let kmean = two_groups();
        let init_calls = Cell::new(0);
        let last_iteration = Cell::new(0);
        let last_changed = Cell::new(usize::MAX);
        let init_cb = |_: &KMeansState<f64>| init_calls.set(init_calls.get() + 1);
        let iter_cb = |_: &KMeansState<f64>, nr: usize, changed: usize| {
            last_iteration.set(nr);
            last_changed.set(changed);
        };
        let conf = KMeansConfig::build()
            .init_done(&init_cb)
            .iteration_done(&iter_cb)
            .build();
        let res = kmean.kmeans_lloyd(2, 100, KMeans::init_precomputed(vec![0.0, 0.0, 0.0, 1.0]), &conf).unwrap();
        assert_eq!(init_calls.get(), 1);
        assert_eq!(last_iteration.get(), res.iterations);
        assert_eq!(last_changed.get(), 0);
        assert_same_partition(&[0, 0, 0, 1, 1, 1], &res.assignments);
    }

    #[test]
    fn iris_petals_f64() {
        let samples = vec![1.4f64, 0.2, 1.4, 0.2, 1.3, 0.2, 1.5, 0.2, 1.4, 0.2, 1.7, 0.4, 1.4, 0.3, 1.5, 0.2, 1.4, 0.2, 1.5, 0.1, 1.5, 0.2, 1.6, 0.2, 1.4, 0.1, 1.1, 0.1, 1.2, 0.2, 1.5, 0.4, 1.3, 0.4, 1.4, 0.3, 1.7, 0.3, 1.5, 0.3, 1.7, 0.2, 1.5, 0.4, 1.0, 0.2, 1.7, 0.5, 1.9, 0.2, 1.6, 0.2, 1.6, 0.4, 1.5, 0.2, 1.4, 0.2, 1.6, 0.2, 1.6, 0.2, 1.5, 0.4, 1.5, 0.1, 1.4, 0.2, 1.5, 0.2, 1.2, 0.2, 1.3, 0.2, 1.4, 0.1, 1.3, 0.2, 1.5, 0.2, 1.3, 0.3, 1.3, 0.3, 1.3, 0.2, 1.6, 0.6, 1.9, 0.4, 1.4, 0.3, 1.6, 0.2, 1.4, 0.2, 1.5, 0.2, 1.4, 0.2, 4.7, 1.4, 4.5, 1.5, 4.9, 1.5, 4.0, 1.3, 4.6, 1.5, 4.5, 1.3, 4.7, 1.6, 3.3, 1.0, 4.6, 1.3, 3.9, 1.4, 3.5, 1.0, 4.2, 1.5, 4.0, 1.0, 4.7, 1.4, 3.6, 1.3, 4.4, 1.4, 4.5, 1.5, 4.1, 1.0, 4.5, 1.5, 3.9, 1.1, 4.8, 1.8, 4.0, 1.3, 4.9, 1.5, 4.7, 1.2, 4.3, 1.3, 4.4, 1.4, 4.8, 1.4, 5.0, 1.7, 4.5, 1.5, 3.5, 1.0, 3.8, 1.1, 3.7, 1.0, 3.9, 1.2, 5.1, 1.6, 4.5, 1.5, 4.5, 1.6, 4.7, 1.5, 4.4, 1.3, 4.1, 1.3, 4.0, 1.3, 4.4, 1.2, 4.6, 1.4, 4.0, 1.2, 3.3, 1.0, 4.2, 1.3, 4.2, 1.2, 4.2, 1.3, 4.3, 1.3, 3.0, 1.1, 4.1, 1.3, 6.0, 2.5, 5.1, 1.9, 5.9, 2.1, 5.6, 1.8, 5.8, 2.2, 6.6, 2.1, 4.5, 1.7, 6.3, 1.8, 5.8, 1.8, 6.1, 2.5, 5.1, 2.0, 5.3, 1.9, 5.5, 2.1, 5.0, 2.0, 5.1, 2.4, 5.3, 2.3, 5.5, 1.8, 6.7, 2.2, 6.9, 2.3, 5.0, 1.5, 5.7, 2.3, 4.9, 2.0, 6.7, 2.0, 4.9, 1.8, 5.7, 2.1, 6.0, 1.8, 4.8, 1.8, 4.9, 1.8, 5.6, 2.1, 5.8, 1.6, 6.1, 1.9, 6.4, 2.0, 5.6, 2.2, 5.1, 1.5, 5.6, 1.4, 6.1, 2.3, 5.6, 2.4, 5.5, 1.8, 4.8, 1.8, 5.4, 2.1, 5.6, 2.4, 5.1, 2.3, 5.1, 1.9, 5.9, 2.3, 5.7, 2.5, 5.2, 2.3, 5.0, 1.9, 5.2, 2.0, 5.4, 2.3, 5.1, 1.8];

        let kmean = KMeans::new(samples, 150, 2).unwrap();
        // One starting centroid per species
        let res = kmean.kmeans_lloyd(3, 100, KMeans::init_precomputed(vec![1.4, 0.2, 4.5, 1.5, 6.0, 2.5]), &KMeansConfig::default()).unwrap();

        assert_eq!(res.centroid_cnt(), 3);
        assert_eq!(kmean.assign(&res.centroids).unwrap(), res.assignments);
        // Setosa petals are far apart from both other species
        assert!(res.assignments[..50].iter().all(|&a| a == 0));
        assert!(res.assignments[50..].iter().all(|&a| a != 0));
        assert_eq!(res.centroid_frequency[0], 50);
        assert_approx_eq!(res.centroids[0], 1.462, 1e-9);
        assert_approx_eq!(res.centroids[1], 0.246, 1e-9);
    }
}
