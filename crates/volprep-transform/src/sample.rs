//! Whole-sample wrappers: one operation over every named tensor.

use indexmap::IndexMap;
use volprep_augment::apply;
use volprep_core::{FlipRule, Result, Tensor};

use crate::registry::{Registry, TransformSpec};

/// Named tensors of one training example (e.g. `"input"`, `"label"`), in
/// insertion order.
pub type Sample = IndexMap<String, Tensor<f32>>;

/// Apply `spec` through `registry` to every tensor of `sample`.
///
/// # Errors
///
/// The first error raised by any entry; no partial sample is returned.
pub fn transform_sample(
    registry: &Registry,
    spec: &TransformSpec,
    sample: &Sample,
) -> Result<Sample> {
    sample
        .iter()
        .map(|(key, tensor)| Ok((key.clone(), registry.apply(spec, tensor.view())?)))
        .collect()
}

/// Flip every tensor of `sample` under one shared `rule`.
pub fn augment_sample(sample: &Sample, rule: FlipRule) -> Sample {
    sample
        .iter()
        .map(|(key, tensor)| (key.clone(), apply(tensor.view(), rule)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{registry, OpKind};
    use volprep_augment::revert;
    use volprep_core::{lift, VolumeError};
    use volprep_test_utils::{random_intensities, random_labels};

    fn sample() -> Sample {
        let mut s = Sample::new();
        s.insert("input".to_string(), lift(random_intensities((3, 4, 4), 1)));
        s.insert(
            "label".to_string(),
            lift(random_labels((3, 4, 4), 3, 2).mapv(|l| l as f32)),
        );
        s
    }

    #[test]
    fn transform_keeps_keys_and_order() {
        let out = transform_sample(registry(), &TransformSpec::Binarize, &sample()).unwrap();
        let keys: Vec<_> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["input", "label"]);
        assert!(out.values().all(|t| t.iter().all(|&v| v == 0.0 || v == 1.0)));
    }

    #[test]
    fn transform_fails_as_a_whole() {
        let mut s = sample();
        s.insert("tiny".to_string(), lift(random_intensities((1, 1, 1), 3)));
        let spec = TransformSpec::defaults(OpKind::Affinity3);
        assert!(matches!(
            transform_sample(registry(), &spec, &s),
            Err(VolumeError::Offset { .. })
        ));
    }

    #[test]
    fn augment_uses_one_rule_for_all_entries() {
        let s = sample();
        let rule = FlipRule::new(true, false, true, true);
        let out = augment_sample(&s, rule);
        for (key, tensor) in &out {
            assert_eq!(tensor, &apply(s[key].view(), rule));
            assert_eq!(revert(tensor.view(), rule, None).unwrap(), s[key]);
        }
    }
}
