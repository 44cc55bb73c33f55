//! YAML output with block-style multi-line strings.

use anyhow::{Context, Result};
use serde::Serialize;
use yaml_rust_davvid::{Yaml, YamlEmitter};

/// Serializes `data` to YAML, emitting multi-line strings (clause text,
/// explanations) as literal blocks.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    let value = serde_yaml::to_value(data).context("Failed to serialize to YAML value")?;
    let yaml = to_emitter_value(value);

    let mut output = String::new();
    let mut emitter = YamlEmitter::new(&mut output);
    emitter.multiline_strings(true);
    emitter.dump(&yaml).context("Failed to emit YAML")?;

    output.push('\n');
    Ok(output)
}

fn to_emitter_value(value: serde_yaml::Value) -> Yaml {
    match value {
        serde_yaml::Value::Null => Yaml::Null,
        serde_yaml::Value::Bool(b) => Yaml::Boolean(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Yaml::Integer(i),
            None => Yaml::Real(n.to_string()),
        },
        serde_yaml::Value::String(s) => Yaml::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Yaml::Array(seq.into_iter().map(to_emitter_value).collect())
        }
        serde_yaml::Value::Mapping(map) => Yaml::Hash(
            map.into_iter()
                .map(|(k, v)| (to_emitter_value(k), to_emitter_value(v)))
                .collect(),
        ),
        // Enum variants with data serialize as tagged values; keep the payload.
        serde_yaml::Value::Tagged(tagged) => to_emitter_value(tagged.value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        confidence: f64,
        count: u32,
        note: Option<String>,
        tags: BTreeMap<String, usize>,
    }

    #[test]
    fn output_parses_back() {
        let sample = Sample {
            name: "service_agreement".to_string(),
            confidence: 0.75,
            count: 3,
            note: None,
            tags: BTreeMap::from([("payment".to_string(), 2)]),
        };
        let yaml = to_yaml(&sample).unwrap();
        assert!(yaml.contains("confidence: 0.75"), "{yaml}");
        let parsed: Sample = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn multiline_strings_use_literal_blocks() {
        let yaml = to_yaml(&BTreeMap::from([("text", "first line\nsecond line")])).unwrap();
        assert!(yaml.contains("text: |"), "{yaml}");
        assert!(yaml.contains("  second line"), "{yaml}");
    }
}
