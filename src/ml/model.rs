use burn::{
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize;
// deriving them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct DelayClassifierConfig {
    /// Encoded feature width (1 + Σ|V_i|)
    pub input_size:  usize,
    #[config(default = 16)]
    pub hidden_size: usize,
}

impl DelayClassifierConfig {
    /// input → dense(hidden, ReLU) → dense(hidden, ReLU) → dense(1)
    pub fn init<B: Backend>(&self, device: &B::Device) -> DelayClassifier<B> {
        DelayClassifier {
            hidden1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            hidden2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            output:  LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct DelayClassifier<B: Backend> {
    pub hidden1: Linear<B>,
    pub hidden2: Linear<B>,
    pub output:  Linear<B>,
}

impl<B: Backend> DelayClassifier<B> {
    /// features: [batch, width] → logits: [batch]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 1> {
        let x = relu(self.hidden1.forward(features));
        let x = relu(self.hidden2.forward(x));
        self.output.forward(x).flatten::<1>(0, 1)
    }

    /// Mean binary cross-entropy on logits (sigmoid applied inside the loss).
    pub fn loss(&self, logits: Tensor<B, 1>, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device())
            .forward(logits, labels)
    }

    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        labels:   Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let logits = self.forward(features);
        let loss   = self.loss(logits.clone(), labels);
        (loss, logits)
    }
}

/// Number of predictions that match the labels.
/// logit > 0 ⇔ sigmoid(logit) > 0.5 ⇔ predicted delayed.
pub fn count_correct<B: Backend>(logits: Tensor<B, 1>, labels: Tensor<B, 1, Int>) -> usize {
    let correct: i64 = logits
        .greater_elem(0.0)
        .int()
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as usize
}

/// Delay probabilities for a batch of logits.
pub fn probabilities<B: Backend>(logits: Tensor<B, 1>) -> Vec<f32> {
    burn::tensor::activation::sigmoid(logits)
        .into_data()
        .iter::<f32>()
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_forward_shape() {
        let _rng = crate::ml::backend_rng_guard();
        let device = Default::default();
        let model: DelayClassifier<TestBackend> = DelayClassifierConfig::new(11).init(&device);
        let x = Tensor::<TestBackend, 2>::zeros([4, 11], &device);
        assert_eq!(model.forward(x).dims(), [4]);
    }

    #[test]
    fn test_default_hidden_size() {
        let cfg = DelayClassifierConfig::new(7);
        assert_eq!(cfg.hidden_size, 16);
    }

    #[test]
    fn test_loss_is_finite_scalar() {
        let _rng = crate::ml::backend_rng_guard();
        let device = Default::default();
        let model: DelayClassifier<TestBackend> = DelayClassifierConfig::new(3).init(&device);
        let x = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0, 2500.0, 0.0, 1.0, 100.0], &device)
            .reshape([2, 3]);
        let y = Tensor::<TestBackend, 1, Int>::from_ints([1, 0], &device);

        let (loss, logits) = model.forward_loss(x, y);
        assert_eq!(loss.dims(), [1]);
        assert_eq!(logits.dims(), [2]);
        assert!(loss.into_scalar().elem::<f64>().is_finite());
    }

    #[test]
    fn test_count_correct_thresholds_at_zero() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 1>::from_floats([2.0, -1.0, 0.5, -3.0], &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 0, 0, 1], &device);
        assert_eq!(count_correct(logits, labels), 2);
    }

    #[test]
    fn test_probabilities() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 1>::from_floats([0.0, 100.0], &device);
        let p = probabilities(logits);
        assert!((p[0] - 0.5).abs() < 1e-6);
        assert!(p[1] > 0.99);
    }
}
