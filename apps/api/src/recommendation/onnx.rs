//! ONNX Runtime backends (feature `onnx`).
//!
//! `OnnxEmbedder` mean-pools a sentence-transformers model (`model.onnx`).
//! `OnnxClassifier` runs the exported classification head (`classifier.onnx`)
//! and returns softmax probabilities. Both share `tokenizer.json`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::recommendation::centroid::softmax;
use crate::recommendation::model::{Classifier, Embedder};
use crate::recommendation::similarity::l2_normalize;

pub const EMBEDDER_MODEL_FILE: &str = "model.onnx";
pub const CLASSIFIER_MODEL_FILE: &str = "classifier.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

const EMBEDDER_MAX_LENGTH: usize = 256;
const CLASSIFIER_MAX_LENGTH: usize = 128;

struct Encoded {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

fn load_tokenizer(model_dir: &Path, max_length: usize) -> anyhow::Result<Tokenizer> {
    let tokenizer_path = model_dir.join(TOKENIZER_FILE);
    anyhow::ensure!(
        tokenizer_path.exists(),
        "{TOKENIZER_FILE} not found in {model_dir:?}"
    );
    let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
    tokenizer
        .with_truncation(Some(tokenizers::TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
    Ok(tokenizer)
}

fn encode(tokenizer: &Tokenizer, text: &str) -> anyhow::Result<Encoded> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
    Ok(Encoded {
        input_ids: encoding.get_ids().iter().map(|&id| id as i64).collect(),
        attention_mask: encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect(),
        token_type_ids: encoding.get_type_ids().iter().map(|&t| t as i64).collect(),
    })
}

fn load_session(path: &Path) -> anyhow::Result<Session> {
    anyhow::ensure!(path.exists(), "{} not found", path.display());
    Ok(Session::builder()?.commit_from_file(path)?)
}

pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dim: usize,
}

impl OnnxEmbedder {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join(EMBEDDER_MODEL_FILE);
        let session = load_session(&model_path)?;
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);
        let tokenizer = load_tokenizer(model_dir, EMBEDDER_MAX_LENGTH)?;

        info!(dim, model = %model_path.display(), "loaded ONNX embedding model");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim,
        })
    }
}

impl Embedder for OnnxEmbedder {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoded = encode(&self.tokenizer, text)?;
        let seq_len = encoded.input_ids.len();
        let shape = [1i64, seq_len as i64];

        let ids_tensor = Tensor::from_array((shape, encoded.input_ids.into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array((shape, encoded.attention_mask.clone().into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, encoded.token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("embedding session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // [1, seq_len, dim]
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1 && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [1, {seq_len}, {}]",
            self.dim
        );
        let actual_seq_len = dims[1] as usize;

        let mut pooled = vec![0.0f32; self.dim];
        let mut token_count = 0.0f32;
        for j in 0..actual_seq_len.min(encoded.attention_mask.len()) {
            let mask_val = encoded.attention_mask[j] as f32;
            if mask_val > 0.0 {
                let offset = j * self.dim;
                for (d, p) in pooled.iter_mut().enumerate() {
                    *p += output_data[offset + d] * mask_val;
                }
                token_count += mask_val;
            }
        }
        if token_count > 0.0 {
            for p in &mut pooled {
                *p /= token_count;
            }
        }
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

pub struct OnnxClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxClassifier {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join(CLASSIFIER_MODEL_FILE);
        let session = load_session(&model_path)?;
        let tokenizer = load_tokenizer(model_dir, CLASSIFIER_MAX_LENGTH)?;

        info!(model = %model_path.display(), "loaded ONNX classifier");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn classify(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let encoded = encode(&self.tokenizer, text)?;
        let shape = [1i64, encoded.input_ids.len() as i64];

        let ids_tensor = Tensor::from_array((shape, encoded.input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, encoded.attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
        ])?;

        // [1, num_classes] logits
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] == 1,
            "unexpected classifier output shape: {dims:?}"
        );
        Ok(softmax(logits))
    }
}

/// Last dimension of the model's first output, if static.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
