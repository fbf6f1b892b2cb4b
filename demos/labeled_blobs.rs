use iris_kmeans::evaluation::{evaluate, LabelSet, IRIS_LABELS};
use iris_kmeans::*;
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (per_species, k) = (50, 3);
    // Rough per-species feature means (sepal length/width, petal length/width)
    let species_means = [[5.0, 3.4, 1.5, 0.2], [5.9, 2.8, 4.3, 1.3], [6.6, 3.0, 5.6, 2.0]];

    // Generate some labeled data around the species means
    let mut rnd = StdRng::seed_from_u64(4);
    let mut rows: Vec<[f64; 4]> = Vec::new();
    let mut labels: Vec<&str> = Vec::new();
    for (means, label) in species_means.iter().zip(IRIS_LABELS.iter()) {
        for _ in 0..per_species {
            let mut row = *means;
            row.iter_mut().for_each(|v| *v += rnd.gen_range(-0.4..0.4));
            rows.push(row);
            labels.push(*label);
        }
    }

    let conf = KMeansConfig::build()
        .random_generator(StdRng::seed_from_u64(rand::random()))
        .iteration_done(&|s, nr, changed|
            println!("Iteration {} - Error: {:.4} | Moved samples: {}", nr, s.distsum, changed))
        .build();

    let kmean = KMeans::from_rows(&rows).expect("valid feature matrix");
    let assignments = match kmean.fit(k, &conf) {
        Ok(assignments) => assignments,
        Err(e) => {
            eprintln!("Clustering failed: {}", e);
            std::process::exit(1);
        }
    };

    let result = evaluate(&assignments, &labels, &LabelSet::iris()).expect("labels aligned with samples");
    println!("{}", result);
}
