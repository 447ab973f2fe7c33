//! Scenario file loading
//!
//! A scenario YAML names a hardware profile and an ordered layer stack.
//! Both the hardware block and each layer's config may be given inline or as
//! a string path relative to the scenario file; an `overrides` mapping on a
//! layer entry is shallow-merged over its referenced config. Layer shape
//! mappings use the checkpoint-config sub-map schema (`attn_config`,
//! `ffn_config`, `moe_config`, `comm_config`) with the field aliases the
//! shape types accept, so real model configs drop in unchanged.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use latenso_core::{HardwareSpec, LayerConfig, LayerKind};

/// A fully-resolved scenario ready to simulate
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub hardware: HardwareSpec,
    pub layers: Vec<LayerConfig>,
}

const REQUIRED_HARDWARE_KEYS: [&str; 5] = [
    "name",
    "peak_tflops",
    "memory_bandwidth_gbps",
    "hbm_gb",
    "interconnect_gbps",
];

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    name: Option<String>,
    hardware: Option<Value>,
    #[serde(default)]
    layers: Vec<Value>,
}

/// Load and resolve a scenario file.
///
/// File references inside the scenario resolve relative to the scenario's
/// own directory. Every layer shape is validated before the scenario is
/// returned, so a loaded scenario always simulates cleanly on valid
/// hardware.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let file: ScenarioFile = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let hardware_value = file
        .hardware
        .with_context(|| format!("scenario {} has no `hardware` block or reference", path.display()))?;
    let hardware_value = maybe_load_reference(&base_dir, hardware_value)?;
    let hardware = hardware_from_value(hardware_value)
        .with_context(|| format!("invalid hardware in scenario {}", path.display()))?;

    if file.layers.is_empty() {
        bail!("scenario {} must include at least one layer entry", path.display());
    }
    let layers = file
        .layers
        .iter()
        .enumerate()
        .map(|(index, entry)| layer_from_entry(index, entry, &base_dir))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid layer in scenario {}", path.display()))?;

    let name = file.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string())
    });

    debug!(
        scenario = name.as_str(),
        hardware = hardware.name.as_str(),
        layers = layers.len(),
        "loaded scenario"
    );
    Ok(Scenario {
        name,
        hardware,
        layers,
    })
}

/// Resolve a value that is either inline data or a relative file path.
fn maybe_load_reference(base_dir: &Path, value: Value) -> Result<Value> {
    match value {
        Value::String(relative) => {
            let target = base_dir.join(&relative);
            let text = fs::read_to_string(&target)
                .with_context(|| format!("failed to read referenced file {}", target.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse referenced file {}", target.display()))
        }
        other => Ok(other),
    }
}

fn hardware_from_value(value: Value) -> Result<HardwareSpec> {
    let Value::Mapping(mapping) = value else {
        bail!("hardware must be a mapping or a file reference");
    };
    let missing: Vec<&str> = REQUIRED_HARDWARE_KEYS
        .iter()
        .copied()
        .filter(|key| !mapping.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        bail!("hardware config missing keys: {}", missing.join(", "));
    }
    serde_yaml::from_value(Value::Mapping(mapping)).context("malformed hardware config")
}

fn layer_from_entry(index: usize, entry: &Value, base_dir: &Path) -> Result<LayerConfig> {
    let Value::Mapping(entry) = entry else {
        bail!("layer entry #{index} must be a mapping");
    };
    let alias = entry
        .get("type")
        .and_then(Value::as_str)
        .with_context(|| format!("layer entry #{index} is missing `type`"))?;
    let kind = kind_for_alias(alias)
        .with_context(|| format!("layer entry #{index} has unsupported type `{alias}`"))?;

    // The entry itself is the config unless an explicit `config` points
    // elsewhere; overrides always win over whichever base was chosen.
    let config_value = match entry.get("config") {
        Some(reference) => maybe_load_reference(base_dir, reference.clone())?,
        None => Value::Mapping(entry.clone()),
    };
    let mut merged = match config_value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => bail!("layer entry #{index}: config must be a mapping"),
    };
    if let Some(overrides) = entry.get("overrides") {
        let overrides = overrides
            .as_mapping()
            .with_context(|| format!("layer entry #{index}: overrides must be a mapping"))?;
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }

    let name = merged
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            entry
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("{kind}_{index}"));

    let layer = build_layer(kind, name, index as u32, &merged)
        .with_context(|| format!("layer entry #{index}: invalid {kind} config"))?;
    layer
        .validate()
        .with_context(|| format!("layer entry #{index} (`{}`) failed validation", layer.name()))?;
    Ok(layer)
}

fn kind_for_alias(alias: &str) -> Option<LayerKind> {
    match alias {
        "attention" | "attention_layer" => Some(LayerKind::Attention),
        "ffn" | "ffn_layer" => Some(LayerKind::Ffn),
        "moe" | "moe_layer" => Some(LayerKind::Moe),
        "communication" => Some(LayerKind::Communication),
        _ => None,
    }
}

fn build_layer(kind: LayerKind, name: String, layer_id: u32, merged: &Mapping) -> Result<LayerConfig> {
    let layer = match kind {
        LayerKind::Attention => {
            // Attention and communication entries may carry their shape
            // fields at the top level instead of in a sub-map.
            let map = sub_config(merged, "attn_config")
                .filter(|map| !map.is_empty())
                .unwrap_or_else(|| merged.clone());
            LayerConfig::attention(name, layer_id, shape_from_mapping(map)?)
        }
        LayerKind::Ffn => {
            let map = sub_config(merged, "ffn_config").unwrap_or_default();
            LayerConfig::ffn(name, layer_id, shape_from_mapping(map)?)
        }
        LayerKind::Moe => {
            let map = sub_config(merged, "moe_config").unwrap_or_default();
            LayerConfig::moe(name, layer_id, shape_from_mapping(map)?)
        }
        LayerKind::Communication => {
            let map = sub_config(merged, "comm_config").unwrap_or_else(|| merged.clone());
            LayerConfig::communication(name, layer_id, shape_from_mapping(map)?)
        }
    };
    Ok(layer)
}

fn sub_config(merged: &Mapping, key: &str) -> Option<Mapping> {
    merged.get(key).and_then(Value::as_mapping).cloned()
}

fn shape_from_mapping<T: DeserializeOwned>(map: Mapping) -> Result<T> {
    serde_yaml::from_value(Value::Mapping(map)).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use latenso_core::{Activation, CollectivePattern};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const HARDWARE_YAML: &str = r#"
name: a100_sxm
peak_tflops: 312.0
memory_bandwidth_gbps: 2039.0
hbm_gb: 80.0
interconnect_gbps: 600.0
"#;

    #[test]
    fn test_inline_scenario() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "inline.yaml",
            r#"
name: smoke
hardware:
  name: a100_sxm
  peak_tflops: 312.0
  memory_bandwidth_gbps: 2039.0
  hbm_gb: 80.0
  interconnect_gbps: 600.0
layers:
  - type: attention
    attn_config:
      d_model: 1024
      num_attention_heads: 16
  - type: ffn_layer
    ffn_config:
      d_model: 1024
      intermediate_size: 4096
      activation: gelu
  - type: communication
    pattern: all_reduce
    payload_mb: 32.0
"#,
        );

        let scenario = load_scenario(&scenario_path).unwrap();
        assert_eq!(scenario.name, "smoke");
        assert_eq!(scenario.hardware.name, "a100_sxm");
        assert_eq!(scenario.hardware.max_concurrency, 1);
        assert_eq!(scenario.layers.len(), 3);

        // Names default to {kind}_{index}.
        assert_eq!(scenario.layers[0].name(), "attention_0");
        assert_eq!(scenario.layers[1].name(), "ffn_1");
        assert_eq!(scenario.layers[2].name(), "communication_2");
        assert_eq!(scenario.layers[2].layer_id(), 2);

        match &scenario.layers[0] {
            LayerConfig::Attention { shape, .. } => {
                assert_eq!(shape.d_model, 1024);
                assert_eq!(shape.num_heads, 16);
            }
            other => panic!("expected attention, got {other:?}"),
        }
        match &scenario.layers[1] {
            LayerConfig::Ffn { shape, .. } => {
                assert_eq!(shape.d_ff, 4096);
                assert_eq!(shape.activation, Activation::Gelu);
            }
            other => panic!("expected ffn, got {other:?}"),
        }
        // Communication shape fields sit at the entry top level.
        match &scenario.layers[2] {
            LayerConfig::Communication { shape, .. } => {
                assert_eq!(shape.pattern, CollectivePattern::AllReduce);
                assert_eq!(shape.payload_mb, 32.0);
            }
            other => panic!("expected communication, got {other:?}"),
        }
    }

    #[test]
    fn test_file_references_and_overrides() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "hardware.yaml", HARDWARE_YAML);
        write_file(
            &dir,
            "moe_block.yaml",
            r#"
name: routed_block
moe_config:
  model_dim: 7168
  moe_intermediate_size: 2048
  n_routed_experts: 256
  topk_group: 4
  num_experts_per_tok: 8
  n_group: 8
"#,
        );
        let scenario_path = write_file(
            &dir,
            "scenario.yaml",
            r#"
name: deepseek_moe
hardware: hardware.yaml
layers:
  - type: moe
    name: entry_name_loses
    config: moe_block.yaml
  - type: moe
    config: moe_block.yaml
    overrides:
      name: dense_variant
      moe_config:
        model_dim: 4096
"#,
        );

        let scenario = load_scenario(&scenario_path).unwrap();
        assert_eq!(scenario.hardware.peak_tflops, 312.0);

        // The referenced config's name beats the entry name.
        assert_eq!(scenario.layers[0].name(), "routed_block");
        match &scenario.layers[0] {
            LayerConfig::Moe { shape, .. } => {
                assert_eq!(shape.d_model, 7168);
                assert_eq!(shape.expert_hidden, 2048);
                assert_eq!(shape.num_experts, 256);
                assert_eq!(shape.top_k, 4);
                assert_eq!(shape.avg_experts_per_token, Some(8.0));
                assert_eq!(shape.num_groups, 8);
            }
            other => panic!("expected moe, got {other:?}"),
        }

        // Overrides merge shallowly: the whole moe_config sub-map is
        // replaced, so unlisted fields inside it revert to defaults.
        assert_eq!(scenario.layers[1].name(), "dense_variant");
        match &scenario.layers[1] {
            LayerConfig::Moe { shape, .. } => {
                assert_eq!(shape.d_model, 4096);
                assert_eq!(shape.num_experts, 1);
            }
            other => panic!("expected moe, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_hardware_keys_all_reported() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "bad_hardware.yaml",
            r#"
hardware:
  name: mystery
layers:
  - type: ffn
"#,
        );
        let err = load_scenario(&scenario_path).unwrap_err();
        let message = format!("{err:#}");
        for key in [
            "peak_tflops",
            "memory_bandwidth_gbps",
            "hbm_gb",
            "interconnect_gbps",
        ] {
            assert!(message.contains(key), "missing `{key}` in: {message}");
        }
    }

    #[test]
    fn test_scenario_requires_layers() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "empty.yaml",
            &format!("hardware:\n{}", indent(HARDWARE_YAML)),
        );
        let err = load_scenario(&scenario_path).unwrap_err();
        assert!(err.to_string().contains("at least one layer"));
    }

    #[test]
    fn test_unknown_layer_type() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "unknown.yaml",
            &format!(
                "hardware:\n{}layers:\n  - type: embedding\n",
                indent(HARDWARE_YAML)
            ),
        );
        let err = load_scenario(&scenario_path).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported type `embedding`"));
    }

    #[test]
    fn test_invalid_shape_rejected_at_load() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "indivisible.yaml",
            &format!(
                "hardware:\n{}layers:\n  - type: attention\n    attn_config:\n      d_model: 100\n      num_heads: 3\n",
                indent(HARDWARE_YAML)
            ),
        );
        let err = load_scenario(&scenario_path).unwrap_err();
        assert!(format!("{err:#}").contains("not divisible"));
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let dir = TempDir::new().unwrap();
        let scenario_path = write_file(
            &dir,
            "prefill_sweep.yaml",
            &format!("hardware:\n{}layers:\n  - type: ffn\n", indent(HARDWARE_YAML)),
        );
        let scenario = load_scenario(&scenario_path).unwrap();
        assert_eq!(scenario.name, "prefill_sweep");
    }

    fn indent(block: &str) -> String {
        block
            .trim_start_matches('\n')
            .lines()
            .map(|line| format!("  {line}\n"))
            .collect()
    }
}
