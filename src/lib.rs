//! # iris_kmeans - API documentation
//!
//! iris_kmeans is a small rust library that clusters labeled measurements (such as the classic iris flower
//! dataset) with Lloyd's k-means algorithm, and then scores the unsupervised result against the known labels.
//!
//! ## Algorithm
//! The centroids are initialized once (by default, every feature of every centroid is drawn uniformly from
//! the range that feature spans in the input). Then, the assignment step (every sample goes to its nearest
//! centroid) and the update step (every centroid moves to the mean of its samples) alternate, until an
//! assignment step does not move any sample anymore.
//!
//! Centroids that lose all of their samples are dropped by default, so a result may hold less than **k**
//! clusters. See [`EmptyClusterPolicy`] for the alternative.
//!
//! ## Evaluation
//! The [`evaluation`] module maps every cluster to the ground-truth label that holds the majority within it,
//! and computes the percentage of samples whose cluster label matches their own label.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use iris_kmeans::*;
//! use iris_kmeans::evaluation::{evaluate, LabelSet};
//! use rand::prelude::*;
//!
//! let samples = vec![
//!     [5.1f64, 3.5, 1.4, 0.2], [4.9, 3.0, 1.4, 0.2], [4.7, 3.2, 1.3, 0.2],
//!     [7.0, 3.2, 4.7, 1.4], [6.4, 3.2, 4.5, 1.5], [6.9, 3.1, 4.9, 1.5],
//! ];
//! let labels = ["Iris-setosa", "Iris-setosa", "Iris-setosa",
//!               "Iris-versicolor", "Iris-versicolor", "Iris-versicolor"];
//!
//! let kmean = KMeans::from_rows(&samples).unwrap();
//! let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(1)).build();
//! let assignments = kmean.fit(2, &conf).unwrap();
//!
//! let result = evaluate(&assignments, &labels, &LabelSet::iris()).unwrap();
//! println!("{}", result);
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use iris_kmeans::*;
//!
//! let (sample_cnt, sample_dims, k, max_iter) = (2000, 4, 3, 500);
//!
//! // Generate some random data
//! let mut samples = vec![0.0f64;sample_cnt * sample_dims];
//! samples.iter_mut().for_each(|v| *v = rand::random());
//!
//! let conf = KMeansConfig::build()
//!     .init_done(&|s| println!("Initialization completed. Error: {:.2}", s.distsum))
//!     .iteration_done(&|s, nr, changed|
//!         println!("Iteration {} - Error: {:.2} | Moved samples: {}", nr, s.distsum, changed))
//!     .build();
//!
//! let kmean = KMeans::new(samples, sample_cnt, sample_dims).unwrap();
//! match kmean.kmeans_lloyd(k, max_iter, KMeans::init_random_range, &conf) {
//!     Ok(result) => println!("Centroids: {:?}", result.centroids),
//!     Err(e) => println!("Clustering failed: {}", e),
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use KMeans, an instance of this struct is created, taking
//! over the sample data into its ownership.
//!
//! The [`KMeans::kmeans_lloyd`] method takes the chosen centroid initialization method as argument. These
//! initialization-method implementations are static methods within the [`KMeans`] struct, which are simply
//! passed in as reference. Calling it does not mutate the [`KMeans`] instance; internally, a new instance of
//! [`KMeansState`] is used to store the state (and finally the result) of the calculation.
//! [`KMeans::fit`] is the short form, returning only the cluster index of every sample.

#[macro_use] mod helpers;
mod error;
mod primitive;
mod api;
mod variants;
mod inits;
pub mod geometry;
pub mod evaluation;

pub use api::{EmptyClusterPolicy, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState, DEFAULT_MAX_ITER};
pub use api::{InitDoneCallbackFn, IterationDoneCallbackFn};
pub use error::{Error, Result};
pub use primitive::Primitive;
