//! Tree ensembles: boosted (summed log-odds) or bagged (averaged probabilities).

use serde::{Deserialize, Serialize};

use crate::ports::{BinaryClassifier, ClassifierError};

use super::logistic::sigmoid;

/// One node of a flattened decision tree. Index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go left when `inputs[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// A single decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walks the tree to a leaf.
    ///
    /// # Errors
    ///
    /// `Malformed` for an empty tree, a dangling child index, or a cycle;
    /// `WidthMismatch` if a split reads past the input.
    pub fn evaluate(&self, inputs: &[f64]) -> Result<f64, ClassifierError> {
        let mut index = 0usize;
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| ClassifierError::Malformed(format!("node {} does not exist", index)))?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = inputs.get(*feature).ok_or(ClassifierError::WidthMismatch {
                        expected: feature + 1,
                        actual: inputs.len(),
                    })?;
                    index = if *x <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ClassifierError::Malformed("tree contains a cycle".to_string()))
    }
}

/// How tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregation {
    /// `sigmoid(base_score + sum(leaf values))`.
    Boosted {
        #[serde(default)]
        base_score: f64,
    },
    /// Mean of leaf probabilities.
    Bagged,
}

/// Gradient-boosted or bagged tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    pub trees: Vec<DecisionTree>,
    pub aggregation: Aggregation,
    /// Expected input width, if recorded at training time.
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl TreeEnsembleModel {
    pub fn boosted(trees: Vec<DecisionTree>, base_score: f64) -> Self {
        Self {
            trees,
            aggregation: Aggregation::Boosted { base_score },
            n_features: None,
        }
    }

    pub fn bagged(trees: Vec<DecisionTree>) -> Self {
        Self {
            trees,
            aggregation: Aggregation::Bagged,
            n_features: None,
        }
    }
}

impl BinaryClassifier for TreeEnsembleModel {
    fn predict_probability(&self, inputs: &[f64]) -> Result<f64, ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::Malformed("ensemble has no trees".to_string()));
        }
        if let Some(width) = self.n_features {
            if inputs.len() != width {
                return Err(ClassifierError::WidthMismatch {
                    expected: width,
                    actual: inputs.len(),
                });
            }
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(inputs)?;
        }

        let p = match self.aggregation {
            Aggregation::Boosted { base_score } => sigmoid(base_score + total),
            Aggregation::Bagged => total / self.trees.len() as f64,
        };
        if p.is_finite() && (0.0..=1.0).contains(&p) {
            Ok(p)
        } else {
            Err(ClassifierError::InvalidOutput(p))
        }
    }

    fn input_width(&self) -> Option<usize> {
        self.n_features
    }

    fn family(&self) -> &'static str {
        match self.aggregation {
            Aggregation::Boosted { .. } => "boosted_trees",
            Aggregation::Bagged => "bagged_trees",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split { feature, threshold, left: 1, right: 2 },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn bagged_averages_leaves() {
        let model = TreeEnsembleModel::bagged(vec![stump(0, 1.0, 0.2, 0.8), stump(1, 5.0, 0.4, 0.6)]);
        let p = model.predict_probability(&[2.0, 1.0]).unwrap();
        assert!((p - 0.6).abs() < 1e-12);
    }

    #[test]
    fn boosted_sums_log_odds() {
        let model = TreeEnsembleModel::boosted(vec![stump(0, 1.0, -1.0, 1.0), stump(0, 3.0, 0.5, 2.0)], 0.0);
        let p = model.predict_probability(&[2.0]).unwrap();
        assert!((p - sigmoid(1.5)).abs() < 1e-12);
    }

    #[test]
    fn split_goes_left_on_equal() {
        assert_eq!(stump(0, 1.0, 0.1, 0.9).evaluate(&[1.0]).unwrap(), 0.1);
    }

    #[test]
    fn cycles_are_malformed() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 0 }],
        };
        assert!(matches!(tree.evaluate(&[1.0]), Err(ClassifierError::Malformed(_))));
    }

    #[test]
    fn short_input_is_rejected() {
        let model = TreeEnsembleModel::bagged(vec![stump(3, 1.0, 0.2, 0.8)]);
        assert!(matches!(
            model.predict_probability(&[1.0]),
            Err(ClassifierError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn deserializes_from_json() {
        let raw = r#"{
            "aggregation": {"kind": "bagged"},
            "trees": [{"nodes": [{"leaf": {"value": 0.7}}]}]
        }"#;
        let model: TreeEnsembleModel = serde_json::from_str(raw).unwrap();
        assert_eq!(model.predict_probability(&[]).unwrap(), 0.7);
    }
}
