//! Scoring of a clustering against known ground-truth labels.
//!
//! Every recognized label is mapped to the cluster holding most of its samples (majority vote); the
//! predicted label of a sample is then the label of its cluster, and accuracy is the percentage of
//! samples whose predicted label matches their ground truth.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Species names of the iris flower dataset.
pub const IRIS_LABELS: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// The ground-truth labels that take part in the majority vote, in voting order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}
impl LabelSet {
    /// Create a label set. Labels have to be unique and there has to be at least one.
    pub fn new<I, S>(labels: I) -> Result<Self> where I: IntoIterator<Item = S>, S: Into<String> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::EmptyInput);
        }
        if labels.iter().enumerate().any(|(i, l)| labels[..i].contains(l)) {
            return Err(Error::InvalidParameter { name: "labels", message: "labels have to be unique" });
        }
        Ok(Self { labels })
    }

    /// The three iris species.
    pub fn iris() -> Self {
        Self { labels: IRIS_LABELS.iter().map(|l| l.to_string()).collect() }
    }

    pub fn labels(&self) -> &[String] { &self.labels }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
impl Default for LabelSet {
    fn default() -> Self { Self::iris() }
}


/// Mapping from cluster index to the ground-truth label that won its majority vote.
/// Clusters no label was assigned to are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterLabelMap {
    map: BTreeMap<usize, String>,
}
impl ClusterLabelMap {
    pub fn get(&self, cluster: usize) -> Option<&str> {
        self.map.get(&cluster).map(String::as_str)
    }
    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
    /// Iterate over `(cluster, label)` pairs in ascending cluster order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.map.iter().map(|(c, l)| (*c, l.as_str()))
    }
}
impl fmt::Display for ClusterLabelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (cluster, label)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", cluster, label)?;
        }
        write!(f, "}}")
    }
}


fn check_aligned<S>(assignments: &[usize], labels: &[S]) -> Result<()> {
    if assignments.is_empty() {
        return Err(Error::EmptyInput);
    }
    if assignments.len() != labels.len() {
        return Err(Error::DimensionMismatch { expected: assignments.len(), found: labels.len() });
    }
    Ok(())
}

/// Build the [`ClusterLabelMap`] by majority vote.
///
/// For every label of **label_set**, the cluster holding most samples of that label is chosen (ties go to the
/// lowest cluster index). Labels without any sample take no part. When several labels choose the same
/// cluster, the one with the higher count gets it, with equal counts the lexically smaller label wins. The
/// losing labels stay unmapped.
pub fn majority_vote<S: AsRef<str>>(assignments: &[usize], labels: &[S], label_set: &LabelSet) -> Result<ClusterLabelMap> {
    check_aligned(assignments, labels)?;
    let labels: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();

    // cluster -> (count, label)
    let mut winners: BTreeMap<usize, (usize, &str)> = BTreeMap::new();
    for label in label_set.labels() {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        assignments.iter().zip(labels.iter())
            .filter(|(_, l)| **l == label.as_str())
            .for_each(|(&cluster, _)| *counts.entry(cluster).or_insert(0) += 1);

        let mut best: Option<(usize, usize)> = None;
        for (&cluster, &count) in &counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((cluster, count));
            }
        }
        let Some((cluster, count)) = best else {
            debug!(label = label.as_str(), "label has no samples");
            continue;
        };

        match winners.get(&cluster) {
            Some(&(held_count, held_label)) => {
                let takes_over = count > held_count || (count == held_count && label.as_str() < held_label);
                warn!(cluster, label = label.as_str(), count, held_label, held_count, takes_over, "labels compete for the same cluster");
                if takes_over {
                    winners.insert(cluster, (count, label.as_str()));
                }
            }
            None => {
                winners.insert(cluster, (count, label.as_str()));
            }
        }
    }

    Ok(ClusterLabelMap {
        map: winners.into_iter().map(|(c, (_, l))| (c, l.to_string())).collect(),
    })
}

/// Predicted label of every sample, `None` for samples in clusters without a label.
pub fn predict<'m>(assignments: &[usize], map: &'m ClusterLabelMap) -> Vec<Option<&'m str>> {
    assignments.iter().map(|&c| map.get(c)).collect()
}

/// Percentage of samples whose predicted label equals their ground-truth label.
pub fn accuracy<S: AsRef<str>>(assignments: &[usize], labels: &[S], map: &ClusterLabelMap) -> Result<f64> {
    check_aligned(assignments, labels)?;
    let correct = count_correct(assignments, labels, map);
    Ok(correct as f64 / labels.len() as f64 * 100.0)
}

fn count_correct<S: AsRef<str>>(assignments: &[usize], labels: &[S], map: &ClusterLabelMap) -> usize {
    predict(assignments, map).into_iter().zip(labels.iter())
        .filter(|(predicted, truth)| *predicted == Some(AsRef::<str>::as_ref(*truth)))
        .count()
}


/// Outcome of [`evaluate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub mapping: ClusterLabelMap,
    /// Accuracy in percent
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}
impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.mapping)?;
        write!(f, "{:.6}%", self.accuracy)
    }
}

/// Majority-vote mapping plus accuracy in one go.
pub fn evaluate<S: AsRef<str>>(assignments: &[usize], labels: &[S], label_set: &LabelSet) -> Result<Evaluation> {
    let mapping = majority_vote(assignments, labels, label_set)?;
    let correct = count_correct(assignments, labels, &mapping);
    let total = labels.len();
    Ok(Evaluation {
        accuracy: correct as f64 / total as f64 * 100.0,
        mapping,
        correct,
        total,
    })
}
