//! Stacked-LSTM regression model loaded from exported weights
//!
//! The weights file is a JSON document produced from the trained network:
//!
//! ```json
//! {
//!   "window": 100,
//!   "layers": [
//!     { "type": "lstm", "units": 128, "kernel": [[...]], "recurrent_kernel": [[...]], "bias": [...] },
//!     { "type": "lstm", "units": 64, "kernel": [[...]], "recurrent_kernel": [[...]], "bias": [...] },
//!     { "type": "dense", "kernel": [[...]], "bias": [...] },
//!     { "type": "dense", "kernel": [[...]], "bias": [...], "activation": "linear" }
//!   ]
//! }
//! ```
//!
//! LSTM matrices use the Keras layout: `kernel` is `inputs x 4*units`,
//! `recurrent_kernel` is `units x 4*units` and gates are ordered
//! input, forget, cell, output.

use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Activation of a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => sigmoid(x),
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Serialized layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerSpec {
    Lstm {
        units: usize,
        kernel: Vec<Vec<f32>>,
        recurrent_kernel: Vec<Vec<f32>>,
        bias: Vec<f32>,
    },
    Dense {
        kernel: Vec<Vec<f32>>,
        bias: Vec<f32>,
        #[serde(default)]
        activation: Activation,
    },
}

/// Serialized model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Closes per input window
    pub window: usize,
    pub layers: Vec<LayerSpec>,
}

fn load_err(msg: impl Into<String>) -> DashboardError {
    DashboardError::ModelLoad(msg.into())
}

fn to_matrix(name: &str, rows: Vec<Vec<f32>>, expected: (usize, usize)) -> Result<Array2<f32>> {
    if rows.len() != expected.0 || rows.iter().any(|r| r.len() != expected.1) {
        return Err(load_err(format!(
            "{name} has shape {}x{}, expected {}x{}",
            rows.len(),
            rows.first().map_or(0, Vec::len),
            expected.0,
            expected.1
        )));
    }

    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec(expected, flat).map_err(|e| load_err(format!("{name}: {e}")))
}

fn to_vector(name: &str, values: Vec<f32>, expected: usize) -> Result<Array1<f32>> {
    if values.len() != expected {
        return Err(load_err(format!(
            "{name} has length {}, expected {expected}",
            values.len()
        )));
    }
    Ok(Array1::from(values))
}

#[derive(Debug, Clone)]
struct LstmLayer {
    units: usize,
    kernel: Array2<f32>,
    recurrent_kernel: Array2<f32>,
    bias: Array1<f32>,
}

impl LstmLayer {
    /// Advance one time step for the whole batch
    fn step(&self, x: &Array2<f32>, h: &Array2<f32>, c: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
        let u = self.units;
        let z = x.dot(&self.kernel) + h.dot(&self.recurrent_kernel) + &self.bias;

        let input_gate = z.slice(s![.., 0..u]).mapv(sigmoid);
        let forget_gate = z.slice(s![.., u..2 * u]).mapv(sigmoid);
        let candidate = z.slice(s![.., 2 * u..3 * u]).mapv(f32::tanh);
        let output_gate = z.slice(s![.., 3 * u..]).mapv(sigmoid);

        let c_next = &forget_gate * c + &input_gate * &candidate;
        let h_next = &output_gate * &c_next.mapv(f32::tanh);
        (h_next, c_next)
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    kernel: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        let activation = self.activation;
        (x.dot(&self.kernel) + &self.bias).mapv(|v| activation.apply(v))
    }
}

/// Pre-trained next-close regressor
#[derive(Debug, Clone)]
pub struct SequenceModel {
    window: usize,
    lstm_layers: Vec<LstmLayer>,
    dense_layers: Vec<DenseLayer>,
}

impl SequenceModel {
    /// Load a weights file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| load_err(format!("{}: {e}", path.display())))?;
        let spec: ModelSpec =
            serde_json::from_str(&raw).map_err(|e| load_err(format!("{}: {e}", path.display())))?;

        let model = Self::from_spec(spec)?;
        tracing::info!(
            path = %path.display(),
            window = model.window,
            lstm_layers = model.lstm_layers.len(),
            dense_layers = model.dense_layers.len(),
            "loaded forecast model"
        );
        Ok(model)
    }

    /// Build a model, checking that every layer's shapes chain together
    ///
    /// The architecture is one or more LSTM layers followed by one or more
    /// dense layers, taking one feature per step and producing one value.
    pub fn from_spec(spec: ModelSpec) -> Result<Self> {
        if spec.window == 0 {
            return Err(load_err("window must be greater than 0"));
        }

        let mut lstm_layers = Vec::new();
        let mut dense_layers = Vec::new();
        let mut width = 1;

        for (index, layer) in spec.layers.into_iter().enumerate() {
            match layer {
                LayerSpec::Lstm {
                    units,
                    kernel,
                    recurrent_kernel,
                    bias,
                } => {
                    if !dense_layers.is_empty() {
                        return Err(load_err(format!(
                            "layer {index}: LSTM layers must come before dense layers"
                        )));
                    }
                    if units == 0 {
                        return Err(load_err(format!("layer {index}: LSTM units must be > 0")));
                    }
                    let name = format!("layer {index} ");
                    lstm_layers.push(LstmLayer {
                        units,
                        kernel: to_matrix(&(name.clone() + "kernel"), kernel, (width, 4 * units))?,
                        recurrent_kernel: to_matrix(
                            &(name.clone() + "recurrent_kernel"),
                            recurrent_kernel,
                            (units, 4 * units),
                        )?,
                        bias: to_vector(&(name + "bias"), bias, 4 * units)?,
                    });
                    width = units;
                }
                LayerSpec::Dense {
                    kernel,
                    bias,
                    activation,
                } => {
                    if lstm_layers.is_empty() {
                        return Err(load_err(format!(
                            "layer {index}: model must start with an LSTM layer"
                        )));
                    }
                    let outputs = bias.len();
                    if outputs == 0 {
                        return Err(load_err(format!("layer {index}: dense layer has no outputs")));
                    }
                    let name = format!("layer {index} ");
                    dense_layers.push(DenseLayer {
                        kernel: to_matrix(&(name.clone() + "kernel"), kernel, (width, outputs))?,
                        bias: to_vector(&(name + "bias"), bias, outputs)?,
                        activation,
                    });
                    width = outputs;
                }
            }
        }

        if lstm_layers.is_empty() || dense_layers.is_empty() {
            return Err(load_err(
                "model needs at least one LSTM layer followed by a dense layer",
            ));
        }
        if width != 1 {
            return Err(load_err(format!("model produces {width} outputs, expected 1")));
        }

        Ok(Self {
            window: spec.window,
            lstm_layers,
            dense_layers,
        })
    }

    /// Closes per input window
    pub fn window(&self) -> usize {
        self.window
    }

    fn forward(&self, batch: ArrayView2<'_, f32>) -> Array2<f32> {
        let rows = batch.nrows();
        let mut sequence: Vec<Array2<f32>> = (0..batch.ncols())
            .map(|t| batch.slice(s![.., t..=t]).to_owned())
            .collect();

        for lstm in &self.lstm_layers {
            let mut h = Array2::zeros((rows, lstm.units));
            let mut c = Array2::zeros((rows, lstm.units));
            let mut outputs = Vec::with_capacity(sequence.len());
            for x in &sequence {
                let (h_next, c_next) = lstm.step(x, &h, &c);
                h = h_next;
                c = c_next;
                outputs.push(h.clone());
            }
            sequence = outputs;
        }

        let mut out = sequence
            .pop()
            .unwrap_or_else(|| Array2::zeros((rows, self.lstm_layers.last().map_or(1, |l| l.units))));
        for dense in &self.dense_layers {
            out = dense.forward(&out);
        }
        out
    }

    /// Predict the next scaled close for every window, `batch_size` windows at a time
    pub fn predict(&self, inputs: &Array2<f32>, batch_size: usize) -> Result<Vec<f32>> {
        if inputs.ncols() != self.window {
            return Err(DashboardError::Prediction(format!(
                "input windows have {} steps, model expects {}",
                inputs.ncols(),
                self.window
            )));
        }
        if batch_size == 0 {
            return Err(DashboardError::Prediction(
                "batch size must be greater than 0".to_string(),
            ));
        }

        let mut predictions = Vec::with_capacity(inputs.nrows());
        for (i, batch) in inputs.axis_chunks_iter(Axis(0), batch_size).enumerate() {
            let out = self.forward(batch);
            predictions.extend(out.column(0).iter().copied());
            tracing::trace!(batch = i, done = predictions.len(), "inference batch finished");
        }

        if let Some(pos) = predictions.iter().position(|p| !p.is_finite()) {
            return Err(DashboardError::Prediction(format!(
                "model produced a non-finite value for window {pos}"
            )));
        }

        Ok(predictions)
    }
}
