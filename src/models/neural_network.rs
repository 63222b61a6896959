//! Feedforward neural network for binary classification
//!
//! ReLU hidden layers, a single sigmoid output unit, minibatch SGD with
//! momentum on the log loss.

use crate::error::{CardioError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    pub momentum: f64,
    pub random_state: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![100],
            learning_rate: 0.01,
            max_epochs: 200,
            batch_size: 32,
            momentum: 0.9,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    config: MlpConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    is_fitted: bool,
}

impl Default for MlpClassifier {
    fn default() -> Self {
        Self::new(MlpConfig::default())
    }
}

impl MlpClassifier {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(CardioError::FitFailure(format!(
                "feature rows ({}) and labels ({}) disagree",
                n_samples,
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(CardioError::FitFailure("empty training set".to_string()));
        }

        self.n_features = x.ncols();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        self.initialize_weights(&mut rng);

        let mut velocities_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.raw_dim()))
            .collect();
        let mut velocities_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.len()))
            .collect();

        let batch_size = self.config.batch_size.max(1);
        let mut indices: Vec<usize> = (0..n_samples).collect();

        for _epoch in 0..self.config.max_epochs {
            indices.shuffle(&mut rng);

            for batch in indices.chunks(batch_size) {
                let x_batch = x.select(Axis(0), batch);
                let y_batch: Array1<f64> = Array1::from_iter(batch.iter().map(|&i| y[i]));
                self.train_batch(&x_batch, &y_batch, &mut velocities_w, &mut velocities_b);
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    fn initialize_weights(&mut self, rng: &mut Xoshiro256PlusPlus) {
        self.weights.clear();
        self.biases.clear();

        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(1);

        for pair in layer_sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);
            // Xavier/Glorot
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();
            self.weights
                .push(Array2::from_shape_vec((n_in, n_out), weights).unwrap());
            self.biases.push(Array1::zeros(n_out));
        }
    }

    fn train_batch(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        velocities_w: &mut [Array2<f64>],
        velocities_b: &mut [Array1<f64>],
    ) {
        let n = x.nrows() as f64;
        let n_layers = self.weights.len();

        // forward, keeping pre-activations and activations
        let mut activations: Vec<Array2<f64>> = vec![x.clone()];
        let mut zs: Vec<Array2<f64>> = Vec::with_capacity(n_layers);

        for (l, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations[l].dot(w) + b;
            let a = if l == n_layers - 1 {
                z.mapv(sigmoid)
            } else {
                z.mapv(|v| v.max(0.0))
            };
            zs.push(z);
            activations.push(a);
        }

        // backward: output delta for sigmoid + log loss is (p - y)
        let output = &activations[n_layers];
        let mut delta: Array2<f64> = output.clone();
        for (i, &yi) in y.iter().enumerate() {
            delta[[i, 0]] -= yi;
        }
        delta /= n;

        for l in (0..n_layers).rev() {
            let dw = activations[l].t().dot(&delta);
            let db = delta.sum_axis(Axis(0));

            if l > 0 {
                let relu_grad = zs[l - 1].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                delta = delta.dot(&self.weights[l].t()) * relu_grad;
            }

            let vw = self.config.momentum * &velocities_w[l] - self.config.learning_rate * &dw;
            let vb = self.config.momentum * &velocities_b[l] - self.config.learning_rate * &db;
            let w_next = &self.weights[l] + &vw;
            let b_next = &self.biases[l] + &vb;
            velocities_w[l] = vw;
            velocities_b[l] = vb;
            self.weights[l] = w_next;
            self.biases[l] = b_next;
        }
    }

    fn forward(&self, x: &Array2<f64>) -> Array1<f64> {
        let n_layers = self.weights.len();
        let mut a = x.clone();
        for (l, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = a.dot(w) + b;
            a = if l == n_layers - 1 {
                z.mapv(sigmoid)
            } else {
                z.mapv(|v| v.max(0.0))
            };
        }
        a.index_axis(Axis(1), 0).to_owned()
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(CardioError::NotFitted);
        }
        Ok(self.forward(x))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}
