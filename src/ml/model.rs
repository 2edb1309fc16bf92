use burn::{
    nn::{
        loss::{CrossEntropyLossConfig, MseLoss, Reduction},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

// Loss weights of the three heads.
pub const PRIMARY_LOSS_WEIGHT:       f64 = 1.0;
pub const CONTRIBUTIONS_LOSS_WEIGHT: f64 = 0.5;
pub const COMPLEXITY_LOSS_WEIGHT:    f64 = 0.5;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
// Deriving them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct TextBranchConfig {
    pub vocab_size: usize,
    pub seq_len:    usize,
    #[config(default = 8)]
    pub embed_dim:  usize,
}

#[derive(Config, Debug)]
pub struct EngModelConfig {
    pub numeric_features:  usize,
    pub num_classes:       usize,
    pub num_contributions: usize,
    /// Present for the text variant, absent for numeric-only.
    #[config(default = "None")]
    pub text:              Option<TextBranchConfig>,
    #[config(default = 64)]
    pub hidden_1:          usize,
    #[config(default = 32)]
    pub hidden_2:          usize,
    #[config(default = 0.3)]
    pub dropout:           f64,
}

impl EngModelConfig {
    /// Two architectures share this struct:
    ///
    /// numeric:  bn → dense(64) → dropout → dense(32) → heads
    /// text:     [embed → dropout → mean-pool] ⧺ numeric
    ///           → bn → dense(64) → dense(32) → dropout → dense(32) → heads
    pub fn init<B: Backend>(&self, device: &B::Device) -> EngModel<B> {
        let text = self.text.as_ref().map(|t| TextBranch {
            embedding: EmbeddingConfig::new(t.vocab_size, t.embed_dim).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        });

        let trunk_in = self.numeric_features + self.text.as_ref().map_or(0, |t| t.embed_dim);
        let dense_3  = self.text
            .as_ref()
            .map(|_| LinearConfig::new(self.hidden_2, self.hidden_2).init(device));

        EngModel {
            text,
            batch_norm:         BatchNormConfig::new(trunk_in).init(device),
            dense_1:            LinearConfig::new(trunk_in, self.hidden_1).init(device),
            dense_2:            LinearConfig::new(self.hidden_1, self.hidden_2).init(device),
            dense_3,
            dropout:            DropoutConfig::new(self.dropout).init(),
            primary_head:       LinearConfig::new(self.hidden_2, self.num_classes).init(device),
            contributions_head: LinearConfig::new(self.hidden_2, self.num_contributions).init(device),
            complexity_head:    LinearConfig::new(self.hidden_2, 1).init(device),
        }
    }

    pub fn uses_text(&self) -> bool {
        self.text.is_some()
    }
}

/// Token ids → embeddings → dropout → average over the sequence.
#[derive(Module, Debug)]
pub struct TextBranch<B: Backend> {
    pub embedding: Embedding<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> TextBranch<B> {
    /// tokens: [batch, seq_len] → [batch, embed_dim]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, _] = tokens.dims();
        let x = self.dropout.forward(self.embedding.forward(tokens)); // [batch, seq, d]
        let [_, _, d] = x.dims();
        // Padding positions are averaged in as well
        x.mean_dim(1).reshape([batch_size, d])
    }
}

#[derive(Module, Debug)]
pub struct EngModel<B: Backend> {
    pub text:               Option<TextBranch<B>>,
    pub batch_norm:         BatchNorm<B, 0>,
    pub dense_1:            Linear<B>,
    pub dense_2:            Linear<B>,
    /// Only the text variant has a third hidden layer.
    pub dense_3:            Option<Linear<B>>,
    pub dropout:            Dropout,
    pub primary_head:       Linear<B>,
    pub contributions_head: Linear<B>,
    pub complexity_head:    Linear<B>,
}

pub struct EngModelOutput<B: Backend> {
    /// [batch, num_classes], pre-softmax
    pub primary_logits: Tensor<B, 2>,
    /// [batch, num_contributions]
    pub contributions:  Tensor<B, 2>,
    /// [batch, 1]
    pub complexity:     Tensor<B, 2>,
}

/// The combined loss and its three components.
pub struct EngLoss<B: Backend> {
    pub total:         Tensor<B, 1>,
    pub primary:       Tensor<B, 1>,
    pub contributions: Tensor<B, 1>,
    pub complexity:    Tensor<B, 1>,
}

impl<B: Backend> EngModel<B> {
    /// numeric: [batch, numeric_features] (already standardised)
    /// tokens:  [batch, seq_len], required iff the model has a text branch
    ///
    /// # Panics
    /// If `tokens` is present for a numeric model or absent for a text
    /// model. Check with [`EngModel::accepts`] first when the inputs do
    /// not come from the Featurizer the model was trained with.
    pub fn forward(&self, numeric: Tensor<B, 2>, tokens: Option<Tensor<B, 2, Int>>) -> EngModelOutput<B> {
        let x = match (&self.text, tokens) {
            (Some(branch), Some(ids)) => Tensor::cat(vec![branch.forward(ids), numeric], 1),
            (None, None)              => numeric,
            (Some(_), None)           => panic!("text model called without token ids"),
            (None, Some(_))           => panic!("numeric model called with token ids"),
        };
        let x = self.batch_norm.forward(x);

        let x = match &self.dense_3 {
            Some(dense_3) => {
                let x = relu(self.dense_1.forward(x));
                let x = self.dropout.forward(relu(self.dense_2.forward(x)));
                relu(dense_3.forward(x))
            }
            None => {
                let x = self.dropout.forward(relu(self.dense_1.forward(x)));
                relu(self.dense_2.forward(x))
            }
        };

        EngModelOutput {
            primary_logits: self.primary_head.forward(x.clone()),
            contributions:  self.contributions_head.forward(x.clone()),
            complexity:     self.complexity_head.forward(x),
        }
    }

    pub fn uses_text(&self) -> bool {
        self.text.is_some()
    }

    /// Whether `forward` accepts an input with (or without) token ids.
    pub fn accepts(&self, has_tokens: bool) -> bool {
        self.uses_text() == has_tokens
    }
}

impl<B: Backend> EngModelOutput<B> {
    /// Weighted sum of cross-entropy on the primary field and MSE on
    /// the two regression heads.
    pub fn loss(
        &self,
        primary_field: Tensor<B, 1, Int>,
        contributions: Tensor<B, 2>,
        complexity:    Tensor<B, 2>,
    ) -> EngLoss<B> {
        let device = self.primary_logits.device();
        let ce     = CrossEntropyLossConfig::new().init(&device);
        let mse    = MseLoss::new();

        let primary = ce.forward(self.primary_logits.clone(), primary_field);
        let contrib = mse.forward(self.contributions.clone(), contributions, Reduction::Mean);
        let complex = mse.forward(self.complexity.clone(), complexity, Reduction::Mean);

        let total = primary.clone() * PRIMARY_LOSS_WEIGHT
            + contrib.clone() * CONTRIBUTIONS_LOSS_WEIGHT
            + complex.clone() * COMPLEXITY_LOSS_WEIGHT;

        EngLoss { total, primary, contributions: contrib, complexity: complex }
    }
}
