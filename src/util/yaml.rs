//! YAML helpers shared by the workspace, toolchain and manifest formats.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Deserialize `null` (an empty YAML value) as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a YAML scalar as the text it was written with.
///
/// Returns `None` for mappings and sequences.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Rewrite the block sequences stored under `key` in the entries of the
/// top-level mapping `section` into flow style with double-quoted elements,
/// e.g. `key: ["-DFOO=BAR", "-G"]`.
///
/// Only `key` as a direct field of an entry is touched; an entry, or a nested
/// mapping key, that happens to share the name is left alone.
///
/// The emitter only produces block sequences, so this runs on the emitted
/// text. Elements are re-parsed from the block and re-quoted with JSON string
/// escaping, which is a subset of YAML double-quoted scalars.
pub fn flow_style_sequences(yaml: &str, section: &str, key: &str) -> Result<String> {
    let header = format!("{}:", key);
    let section_header = format!("{}:", section);
    let lines: Vec<&str> = yaml.lines().collect();
    let mut out = Vec::with_capacity(lines.len());

    let mut in_section = false;
    let mut entry_indent: Option<usize> = None;
    let mut field_indent: Option<usize> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if !trimmed.is_empty() {
            if indent == 0 {
                in_section = trimmed == section_header || trimmed.starts_with(&format!("{} ", section_header));
                entry_indent = None;
                field_indent = None;
            } else if in_section {
                match entry_indent {
                    None => entry_indent = Some(indent),
                    Some(entry) if field_indent.is_none() && indent > entry => {
                        field_indent = Some(indent)
                    }
                    _ => {}
                }
            }
        }

        if !in_section || Some(indent) != field_indent || trimmed != header {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        // Collect the block that belongs to this key. Sequence items may sit
        // at the key's own indentation or deeper.
        let mut block = Vec::new();
        let mut j = i + 1;
        while j < lines.len() {
            let next = lines[j];
            let next_indent = next.len() - next.trim_start().len();
            let is_item = next_indent == indent && next.trim_start().starts_with('-');
            if next.trim().is_empty() || next_indent > indent || is_item {
                block.push(&next[indent.min(next.len())..]);
                j += 1;
            } else {
                break;
            }
        }

        let items: Vec<String> = serde_yaml::from_str(&block.join("\n"))
            .with_context(|| format!("failed to re-read `{}` while formatting YAML", key))?;
        let quoted = items
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        out.push(format!("{}{} [{}]", " ".repeat(indent), header, quoted.join(", ")));
        i = j;
    }

    let mut result = out.join("\n");
    if yaml.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_style_rewrite() {
        let input = "targets:\n  hello:\n    depends: []\n    extra_cmake_configure_args:\n    - -DFOO=BAR\n    - '-DX=a b'\n    cxx_standard: '20'\n";
        let output = flow_style_sequences(input, "targets", "extra_cmake_configure_args").unwrap();

        assert!(output.contains("    extra_cmake_configure_args: [\"-DFOO=BAR\", \"-DX=a b\"]\n"));
        assert!(output.contains("    cxx_standard: '20'\n"));

        let parsed: Value = serde_yaml::from_str(&output).unwrap();
        let args = &parsed["targets"]["hello"]["extra_cmake_configure_args"];
        assert_eq!(args[1].as_str(), Some("-DX=a b"));
    }

    #[test]
    fn test_flow_style_handles_indented_items() {
        let input = "targets:\n  a:\n    extra_cmake_configure_args:\n      - x\n      - y\n    staged: true\nnext: 1\n";
        let output = flow_style_sequences(input, "targets", "extra_cmake_configure_args").unwrap();
        assert_eq!(
            output,
            "targets:\n  a:\n    extra_cmake_configure_args: [\"x\", \"y\"]\n    staged: true\nnext: 1\n"
        );
    }

    #[test]
    fn test_flow_style_ignores_same_named_keys_elsewhere() {
        let input = "\
sources:
  extra_cmake_configure_args:
    local: ../x
targets:
  extra_cmake_configure_args:
    cmake_options:
      extra_cmake_configure_args:
        type: STRING
        value: v
    extra_cmake_configure_args:
    - -DA=1
";
        let output = flow_style_sequences(input, "targets", "extra_cmake_configure_args").unwrap();

        assert!(output.contains("sources:\n  extra_cmake_configure_args:\n    local: ../x\n"));
        assert!(output.contains("targets:\n  extra_cmake_configure_args:\n    cmake_options:\n"));
        assert!(output.contains("      extra_cmake_configure_args:\n        type: STRING\n"));
        assert!(output.contains("    extra_cmake_configure_args: [\"-DA=1\"]\n"));
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Value::Bool(true)).as_deref(), Some("true"));
        assert_eq!(scalar_to_string(&serde_yaml::from_str("42").unwrap()).as_deref(), Some("42"));
        assert!(scalar_to_string(&Value::Sequence(vec![])).is_none());
    }
}
