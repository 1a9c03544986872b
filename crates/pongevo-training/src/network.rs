//! Fixed-topology feed-forward network used as an evolvable paddle controller.
//!
//! The network has three inputs (the [`Observation`]), one hidden layer with
//! `tanh` activation and three linear outputs (the stay / up / down scores).
//! All parameters live in one flat genome so the genetic operators in
//! [`crate::weights`] can work on it directly. The genome layout is:
//!
//! ```text
//! [ input→hidden weights (hidden × 3) | hidden biases (hidden)
//! | hidden→output weights (3 × hidden) | output biases (3) ]
//! ```

use pongevo_evaluator::controller::{Controller, Observation};
use serde::{Deserialize, Serialize};

pub const INPUT_COUNT: usize = 3;
pub const OUTPUT_COUNT: usize = 3;

/// Observations are in pixels; scaling keeps `tanh` out of saturation.
pub const INPUT_SCALE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("hidden layer must have at least one neuron")]
    EmptyHiddenLayer,
    #[display("genome length {actual} does not match {expected} for hidden layer width {hidden}")]
    GenomeLength {
        hidden: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord")]
pub struct Network {
    hidden: usize,
    genome: Vec<f64>,
}

/// Unchecked serialized form, validated on the way in.
#[derive(Deserialize)]
struct NetworkRecord {
    hidden: usize,
    genome: Vec<f64>,
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NetworkError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        Self::new(record.hidden, record.genome)
    }
}

impl Network {
    /// Number of parameters of a network with `hidden` hidden neurons.
    #[must_use]
    pub const fn genome_len(hidden: usize) -> usize {
        hidden * INPUT_COUNT + hidden + OUTPUT_COUNT * hidden + OUTPUT_COUNT
    }

    pub fn new(hidden: usize, genome: Vec<f64>) -> Result<Self, NetworkError> {
        if hidden == 0 {
            return Err(NetworkError::EmptyHiddenLayer);
        }
        let expected = Self::genome_len(hidden);
        if genome.len() != expected {
            return Err(NetworkError::GenomeLength {
                hidden,
                expected,
                actual: genome.len(),
            });
        }
        Ok(Self { hidden, genome })
    }

    /// Builds a network from a genome derived from a network of the same width.
    pub(crate) fn from_parent_genome(hidden: usize, genome: Vec<f64>) -> Self {
        debug_assert_eq!(genome.len(), Self::genome_len(hidden));
        Self { hidden, genome }
    }

    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    #[must_use]
    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    #[must_use]
    pub fn forward(&self, inputs: [f64; INPUT_COUNT]) -> [f64; OUTPUT_COUNT] {
        let (input_weights, rest) = self.genome.split_at(self.hidden * INPUT_COUNT);
        let (hidden_biases, rest) = rest.split_at(self.hidden);
        let (output_weights, output_biases) = rest.split_at(OUTPUT_COUNT * self.hidden);

        let hidden = input_weights
            .chunks_exact(INPUT_COUNT)
            .zip(hidden_biases)
            .map(|(weights, bias)| {
                let sum = weights
                    .iter()
                    .zip(&inputs)
                    .map(|(w, x)| w * x * INPUT_SCALE)
                    .sum::<f64>();
                (sum + bias).tanh()
            })
            .collect::<Vec<_>>();

        let mut outputs = [0.0; OUTPUT_COUNT];
        for ((output, weights), bias) in outputs
            .iter_mut()
            .zip(output_weights.chunks_exact(self.hidden))
            .zip(output_biases)
        {
            *output = weights.iter().zip(&hidden).map(|(w, h)| w * h).sum::<f64>() + bias;
        }
        outputs
    }
}

impl Controller for Network {
    fn decide(&self, observation: &Observation) -> [f64; 3] {
        self.forward(observation.to_array())
    }
}

#[cfg(test)]
mod tests {
    use pongevo_evaluator::controller::Decision;

    use super::*;

    #[test]
    fn test_genome_length_is_checked() {
        assert_eq!(Network::genome_len(4), 4 * 3 + 4 + 3 * 4 + 3);
        assert_eq!(
            Network::new(0, vec![]),
            Err(NetworkError::EmptyHiddenLayer)
        );
        assert_eq!(
            Network::new(2, vec![0.0; 5]),
            Err(NetworkError::GenomeLength {
                hidden: 2,
                expected: 17,
                actual: 5
            })
        );
    }

    #[test]
    fn test_output_biases_pass_through_a_zero_network() {
        let mut genome = vec![0.0; Network::genome_len(2)];
        let len = genome.len();
        genome[len - 3..].copy_from_slice(&[0.1, 0.9, -0.5]);
        let network = Network::new(2, genome).unwrap();
        assert_eq!(network.forward([200.0, 340.0, 250.0]), [0.1, 0.9, -0.5]);
    }

    #[test]
    fn test_hidden_layer_feeds_outputs() {
        // One hidden neuron reading only ball_y, wired to the "down" output.
        let genome = vec![
            0.0, 0.0, 1.0, // input -> hidden
            0.0, // hidden bias
            0.0, 0.0, 1.0, // hidden -> outputs
            0.0, 0.0, 0.0, // output biases
        ];
        let network = Network::new(1, genome).unwrap();
        let observation = Observation {
            paddle_y: 200.0,
            ball_distance_x: 100.0,
            ball_y: 100.0,
        };
        let scores = network.decide(&observation);
        assert!((scores[2] - 1.0_f64.tanh()).abs() < 1e-12);
        assert_eq!(Decision::from_scores(scores), Decision::Down);
    }

    #[test]
    fn test_deserialization_rejects_bad_genome() {
        let json = r#"{"hidden":2,"genome":[0.0,1.0]}"#;
        assert!(serde_json::from_str::<Network>(json).is_err());

        let network = Network::new(1, vec![0.5; Network::genome_len(1)]).unwrap();
        let json = serde_json::to_string(&network).unwrap();
        assert_eq!(serde_json::from_str::<Network>(&json).unwrap(), network);
    }
}
