//! GRU cell.
//!
//! A single-layer gated recurrent unit with PyTorch parameter layout
//! (`weight_ih`, `weight_hh`, `bias_ih`, `bias_hh`, gates stacked as
//! reset | update | new).
//!
//! ## Update
//!
//! ```text
//! r  = σ(W_ir x + b_ir + W_hr h + b_hr)
//! z  = σ(W_iz x + b_iz + W_hz h + b_hz)
//! n  = tanh(W_in x + b_in + r ⊙ (W_hn h + b_hn))
//! h' = (1 - z) ⊙ n + z ⊙ h
//! ```

use candle_core::{DType, Device, Module, Result, Tensor, D};
use candle_nn::{Init, Linear, VarBuilder};

/// Single-step GRU cell.
#[derive(Debug, Clone)]
pub struct GruCell {
    /// Input projection [input_size] -> [3 * hidden_size].
    input_proj: Linear,
    /// Recurrent projection [hidden_size] -> [3 * hidden_size].
    hidden_proj: Linear,
    /// Hidden dimension.
    hidden_size: usize,
}

impl GruCell {
    /// Creates a new GruCell from a VarBuilder.
    ///
    /// Parameters missing from the builder are initialised uniformly in
    /// `[-1/sqrt(hidden), 1/sqrt(hidden)]`.
    pub fn new(input_size: usize, hidden_size: usize, vb: VarBuilder) -> Result<Self> {
        let k = 1.0 / (hidden_size as f64).sqrt();
        let init = Init::Uniform { lo: -k, up: k };
        let gates = 3 * hidden_size;

        let weight_ih = vb.get_with_hints((gates, input_size), "weight_ih", init)?;
        let weight_hh = vb.get_with_hints((gates, hidden_size), "weight_hh", init)?;
        let bias_ih = vb.get_with_hints(gates, "bias_ih", init)?;
        let bias_hh = vb.get_with_hints(gates, "bias_hh", init)?;

        Ok(Self {
            input_proj: Linear::new(weight_ih, Some(bias_ih)),
            hidden_proj: Linear::new(weight_hh, Some(bias_hh)),
            hidden_size,
        })
    }

    /// Creates a new GruCell with random weights for testing.
    pub fn new_random(
        input_size: usize,
        hidden_size: usize,
        dtype: DType,
        device: &Device,
    ) -> Result<Self> {
        let scale = 0.1;
        let gates = 3 * hidden_size;

        let weight_ih =
            Tensor::randn(0.0f32, scale, (gates, input_size), device)?.to_dtype(dtype)?;
        let weight_hh =
            Tensor::randn(0.0f32, scale, (gates, hidden_size), device)?.to_dtype(dtype)?;
        let bias_ih = Tensor::zeros(gates, dtype, device)?;
        let bias_hh = Tensor::zeros(gates, dtype, device)?;

        Ok(Self {
            input_proj: Linear::new(weight_ih, Some(bias_ih)),
            hidden_proj: Linear::new(weight_hh, Some(bias_hh)),
            hidden_size,
        })
    }

    /// Returns the hidden size.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Zero initial state of shape [batch, hidden_size].
    pub fn zero_state(&self, batch: usize, dtype: DType, device: &Device) -> Result<Tensor> {
        Tensor::zeros((batch, self.hidden_size), dtype, device)
    }

    /// Advances the state by one step.
    ///
    /// # Arguments
    ///
    /// * `x` - Input [batch, input_size]
    /// * `h` - Previous state [batch, hidden_size]
    ///
    /// # Returns
    ///
    /// New state [batch, hidden_size]
    pub fn step(&self, x: &Tensor, h: &Tensor) -> Result<Tensor> {
        let gi = self.input_proj.forward(x)?.chunk(3, D::Minus1)?;
        let gh = self.hidden_proj.forward(h)?.chunk(3, D::Minus1)?;

        let reset = candle_nn::ops::sigmoid(&(&gi[0] + &gh[0])?)?;
        let update = candle_nn::ops::sigmoid(&(&gi[1] + &gh[1])?)?;
        let candidate = (&gi[2] + reset.mul(&gh[2])?)?.tanh()?;

        // (1 - z) * n + z * h
        let keep_new = update.affine(-1.0, 1.0)?;
        keep_new.mul(&candidate)? + update.mul(h)?
    }
}
