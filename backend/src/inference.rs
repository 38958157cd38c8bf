use std::path::Path;
use std::sync::Arc;

use tract_onnx::prelude::tract_ndarray::Array4;
use tract_onnx::prelude::*;

use crate::preprocess::{INPUT_CHANNELS, INPUT_SIZE};

/// A loaded classifier: takes a `[1, H, W, C]` batch, returns the flattened class scores.
pub trait ImageClassifier: Send + Sync {
    fn scores(&self, input: &Array4<f32>) -> anyhow::Result<Vec<f32>>;
}

/// Builds classifier handles from artifacts on disk.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> anyhow::Result<Arc<dyn ImageClassifier>>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct TractClassifier {
    model: OnnxPlan,
}

impl TractClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P) -> TractResult<Self> {
        let side = INPUT_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, side, side, INPUT_CHANNELS)),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model })
    }
}

impl ImageClassifier for TractClassifier {
    fn scores(&self, input: &Array4<f32>) -> anyhow::Result<Vec<f32>> {
        let tensor: Tensor = input.clone().into();
        let outputs = self.model.run(tvec!(tensor.into()))?;
        let first = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model produced no output"))?;

        Ok(first.to_array_view::<f32>()?.iter().copied().collect())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TractLoader;

impl ModelLoader for TractLoader {
    fn load(&self, path: &Path) -> anyhow::Result<Arc<dyn ImageClassifier>> {
        Ok(Arc::new(TractClassifier::load(path)?))
    }
}

#[derive(Debug)]
pub struct NodeSummary {
    pub id: usize,
    pub name: String,
    pub op: String,
}

/// Static description of an ONNX artifact, as declared in the file.
#[derive(Debug)]
pub struct ModelSummary {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub nodes: Vec<NodeSummary>,
}

pub fn inspect_model<P: AsRef<Path>>(model_path: P) -> TractResult<ModelSummary> {
    let model = tract_onnx::onnx().model_for_path(model_path)?;

    let describe = |outlets: &[OutletId]| -> TractResult<Vec<String>> {
        outlets
            .iter()
            .map(|&outlet| {
                let name = &model.node(outlet.node).name;
                Ok(format!("{} {:?}", name, model.outlet_fact(outlet)?))
            })
            .collect()
    };

    let inputs = describe(model.input_outlets()?)?;
    let outputs = describe(model.output_outlets()?)?;
    let nodes = model
        .nodes()
        .iter()
        .map(|node| NodeSummary {
            id: node.id,
            name: node.name.clone(),
            op: format!("{:?}", node.op),
        })
        .collect();

    Ok(ModelSummary {
        inputs,
        outputs,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_a_missing_artifact_fails() {
        let result = TractLoader.load(Path::new("does/not/exist.onnx"));
        assert!(result.is_err());
    }

    #[test]
    fn inspecting_a_missing_artifact_fails() {
        assert!(inspect_model("does/not/exist.onnx").is_err());
    }

    #[test]
    fn garbage_artifact_is_not_a_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"HDF\x89 not onnx at all").unwrap();
        assert!(TractLoader.load(file.path()).is_err());
    }
}
