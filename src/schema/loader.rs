//! YAML schema ingestion: extends/include DAG resolution, anchor
//! propagation across files, merge, and projection into [`IsaConfig`].
//!
//! The merge and anchor-propagation steps operate on raw text and
//! [`serde_yaml::Value`] trees rather than on typed structs, because the
//! schema is assembled from several partial files before it is ever a
//! complete, well-typed document.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{MutatorError, Result};
use crate::schema::integer::parse_integer_value;
use crate::schema::model::{
    FieldEncoding, FieldId, FieldSegment, FormatId, FormatSpec, InstructionSpec, IsaConfig,
};

/// Load and fully resolve the ISA named `isa_name`.
///
/// `root_dir` anchors relative paths inside `isa_map.yaml`.
/// `override_path`, when given, replaces the default
/// `root_dir/isa_map.yaml` location (used to honor `AFL_ISA_MAP`).
pub fn load_isa_config(
    root_dir: &Path,
    isa_name: &str,
    override_path: Option<&Path>,
) -> Result<IsaConfig> {
    let map_path = override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root_dir.join("isa_map.yaml"));

    let entry_files = includes_from_map(&map_path, isa_name)?;

    let mut ordered = Vec::new();
    let mut visited = HashSet::new();
    for entry in &entry_files {
        let path = map_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(entry);
        collect_dependencies(&path, &mut ordered, &mut visited)?;
    }

    let mut merged = Value::Mapping(Default::default());
    let mut seen_anchors: Vec<(String, String)> = Vec::new();
    for path in &ordered {
        let raw = read_file_to_string(path)?;
        let preamble = build_anchor_context(&seen_anchors);
        let full_text = format!("{preamble}{raw}");
        let parsed: Value = serde_yaml::from_str(&full_text).map_err(|e| {
            MutatorError::config(path.display().to_string(), format!("YAML parse error: {e}"))
        })?;
        merge_nodes(&mut merged, &parsed);

        for (name, block) in extract_anchor_blocks(&raw) {
            if !seen_anchors.iter().any(|(n, _)| n == &name) {
                seen_anchors.push((name, block));
            }
        }
    }

    project_and_validate(isa_name, &merged)
}

/// Recursively merge two YAML nodes; `overlay` wins on conflicts.
///
/// For mapping nodes, merge key-by-key; for any other node type,
/// `overlay` replaces `base` wholesale. Keys beginning with `__` are
/// skipped: they exist only to make anchors visible to the YAML
/// parser and carry no schema meaning.
pub fn merge_nodes(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if let Some(key_str) = key.as_str() {
                    if key_str.starts_with("__") {
                        continue;
                    }
                }
                match base_map.get_mut(key) {
                    Some(base_value) => merge_nodes(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Scan raw YAML text for anchor definitions (`&name`), capturing each
/// anchor line plus every subsequent line indented deeper than it.
pub fn extract_anchor_blocks(text: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(name) = find_anchor_name(line) {
            let base_indent = leading_spaces(line);
            let mut block = vec![line.to_string()];
            let mut j = i + 1;
            while j < lines.len() {
                let candidate = lines[j];
                if candidate.trim().is_empty() {
                    block.push(candidate.to_string());
                    j += 1;
                    continue;
                }
                if leading_spaces(candidate) > base_indent {
                    block.push(candidate.to_string());
                    j += 1;
                } else {
                    break;
                }
            }
            out.push((name, block.join("\n")));
            i = j;
        } else {
            i += 1;
        }
    }
    out
}

/// Build a synthetic `__anchors:` preamble reproducing every
/// previously-seen anchor block, so aliases in a dependent file
/// resolve against anchors defined in a file merged earlier in
/// topological order.
pub fn build_anchor_context(anchors: &[(String, String)]) -> String {
    if anchors.is_empty() {
        return String::new();
    }
    let mut out = String::from("__anchors:\n");
    for (_, block) in anchors {
        for line in block.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn find_anchor_name(line: &str) -> Option<String> {
    let idx = line.find('&')?;
    let rest = &line[idx + 1..];
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

/// Extract the list of file paths named under `key:` in raw YAML text,
/// accepting both inline (`key: [a, b]`) and block (`key:\n  - a`)
/// list syntax.
pub fn extract_paths_for_key(text: &str, key: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let prefix = format!("{key}:");
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(&prefix) {
            let rest = rest.trim();
            if let Some(stripped) = rest.strip_prefix('[') {
                let mut buf = stripped.to_string();
                let mut j = i;
                while !buf.contains(']') && j + 1 < lines.len() {
                    j += 1;
                    buf.push(' ');
                    buf.push_str(lines[j].trim());
                }
                let inner = buf.trim_end_matches(']');
                out.extend(
                    inner
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(strip_quotes),
                );
                i = j + 1;
                continue;
            } else if rest.is_empty() {
                let base_indent = leading_spaces(line);
                let mut j = i + 1;
                while j < lines.len() {
                    let candidate = lines[j];
                    if candidate.trim().is_empty() {
                        j += 1;
                        continue;
                    }
                    if leading_spaces(candidate) <= base_indent {
                        break;
                    }
                    let item = candidate.trim();
                    match item.strip_prefix("- ") {
                        Some(value) => out.push(strip_quotes(value.trim())),
                        None => break,
                    }
                    j += 1;
                }
                i = j;
                continue;
            } else {
                out.push(strip_quotes(rest));
            }
        }
        i += 1;
    }
    out
}

fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Read a file to a string, wrapping I/O errors as [`MutatorError`].
pub fn read_file_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        MutatorError::config(path.display().to_string(), format!("cannot read file: {e}"))
    })
}

/// Depth-first dependency collection, `extends` and `include`
/// directives first, in topological order. Cycles are broken by the
/// visited set: a file already in `visited` is not reprocessed and the
/// walk simply does not fail.
pub fn collect_dependencies(
    path: &Path,
    ordered: &mut Vec<PathBuf>,
    visited: &mut HashSet<String>,
) -> Result<()> {
    let key = path.to_string_lossy().to_string();
    if visited.contains(&key) {
        return Ok(());
    }
    visited.insert(key);

    let text = read_file_to_string(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    for dep in extract_paths_for_key(&text, "extends") {
        collect_dependencies(&dir.join(dep), ordered, visited)?;
    }
    for dep in extract_paths_for_key(&text, "include") {
        collect_dependencies(&dir.join(dep), ordered, visited)?;
    }

    ordered.push(path.to_path_buf());
    Ok(())
}

/// Resolve `isa_name` against an `isa_map.yaml`, flat or nested under
/// `isa_families`, returning the schema file list to include.
pub fn includes_from_map(map_path: &Path, isa_name: &str) -> Result<Vec<String>> {
    let text = read_file_to_string(map_path)?;
    let root: Value = serde_yaml::from_str(&text).map_err(|e| {
        MutatorError::config(map_path.display().to_string(), format!("YAML parse error: {e}"))
    })?;

    let mapping = root.as_mapping().ok_or_else(|| {
        MutatorError::config(map_path.display().to_string(), "isa map root must be a mapping")
    })?;

    if let Some(direct) = mapping.get(&Value::String(isa_name.to_string())) {
        return sequence_of_strings(map_path, direct);
    }

    if let Some(families) = mapping.get(&Value::String("isa_families".to_string())) {
        if let Some(families_map) = families.as_mapping() {
            for (_, family) in families_map {
                if let Some(family_map) = family.as_mapping() {
                    if let Some(entry) = family_map.get(&Value::String(isa_name.to_string())) {
                        return sequence_of_strings(map_path, entry);
                    }
                }
            }
        }
    }

    Err(MutatorError::config(
        map_path.display().to_string(),
        format!("unknown ISA {isa_name:?} in isa map"),
    ))
}

fn sequence_of_strings(map_path: &Path, node: &Value) -> Result<Vec<String>> {
    let seq = node.as_sequence().ok_or_else(|| {
        MutatorError::config(
            map_path.display().to_string(),
            "ISA map entry must be a list of schema files",
        )
    })?;
    seq.iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                MutatorError::config(map_path.display().to_string(), "schema file entry must be a string")
            })
        })
        .collect()
}

fn project_and_validate(isa_name: &str, merged: &Value) -> Result<IsaConfig> {
    let base_width = merged
        .get("base_width")
        .map(|v| parse_integer_value("isa", v))
        .transpose()?
        .map(|v| v as u32)
        .unwrap_or(32);
    let register_count = merged
        .get("register_count")
        .map(|v| parse_integer_value("isa", v))
        .transpose()?
        .map(|v| v as u32)
        .unwrap_or(32);

    let (fields, field_index) = match merged.get("fields") {
        Some(node) => project_fields(node)?,
        None => (Vec::new(), HashMap::new()),
    };

    let (formats, format_index) = match merged.get("formats") {
        Some(node) => project_formats(node, &field_index)?,
        None => (Vec::new(), HashMap::new()),
    };

    let instructions = match merged.get("instructions") {
        Some(node) => project_instructions(node, &fields, &field_index, &format_index, &formats)?,
        None => Vec::new(),
    };

    Ok(IsaConfig {
        isa_name: isa_name.to_string(),
        base_width,
        register_count,
        fields,
        field_index,
        formats,
        format_index,
        instructions,
    })
}

fn project_fields(node: &Value) -> Result<(Vec<FieldEncoding>, HashMap<String, FieldId>)> {
    let mapping = node
        .as_mapping()
        .ok_or_else(|| MutatorError::config("fields", "must be a mapping"))?;

    let mut fields = Vec::new();
    let mut index = HashMap::new();

    for (key, value) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| MutatorError::config("fields", "field name must be a string"))?
            .to_string();

        let width = value
            .get("width")
            .map(|w| parse_integer_value(&name, w))
            .transpose()?
            .map(|w| w as u32)
            .unwrap_or(0);
        let signed = value
            .get("signed")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let segments = match value.get("segments").and_then(Value::as_sequence) {
            Some(seq) => seq
                .iter()
                .map(|s| project_segment(&name, s))
                .collect::<Result<Vec<_>>>()?,
            None => {
                let word_lsb = value
                    .get("lsb")
                    .map(|w| parse_integer_value(&name, w))
                    .transpose()?
                    .map(|w| w as u32)
                    .unwrap_or(0);
                vec![FieldSegment {
                    word_lsb,
                    width,
                    value_lsb: 0,
                }]
            }
        };

        // Segment widths are not required to sum to `width`: immediates
        // like RV32's B/J-type offsets have an implicit always-zero low
        // bit that no segment ever writes, so the logical field is wider
        // than its physical storage.
        if width > 32 {
            return Err(MutatorError::config(&name, format!("field width {width} exceeds 32 bits")));
        }

        let id = FieldId(fields.len() as u32);
        fields.push(FieldEncoding {
            name: name.clone(),
            width,
            signed,
            segments,
        });
        index.insert(name, id);
    }

    Ok((fields, index))
}

fn project_segment(field_name: &str, node: &Value) -> Result<FieldSegment> {
    let word_lsb = node
        .get("word_lsb")
        .map(|v| parse_integer_value(field_name, v))
        .transpose()?
        .map(|v| v as u32)
        .ok_or_else(|| MutatorError::config(field_name, "segment missing word_lsb"))?;
    let width = node
        .get("width")
        .map(|v| parse_integer_value(field_name, v))
        .transpose()?
        .map(|v| v as u32)
        .ok_or_else(|| MutatorError::config(field_name, "segment missing width"))?;
    let value_lsb = node
        .get("value_lsb")
        .map(|v| parse_integer_value(field_name, v))
        .transpose()?
        .map(|v| v as u32)
        .unwrap_or(0);
    Ok(FieldSegment {
        word_lsb,
        width,
        value_lsb,
    })
}

fn project_formats(
    node: &Value,
    field_index: &HashMap<String, FieldId>,
) -> Result<(Vec<FormatSpec>, HashMap<String, FormatId>)> {
    let mapping = node
        .as_mapping()
        .ok_or_else(|| MutatorError::config("formats", "must be a mapping"))?;

    let mut formats = Vec::new();
    let mut index = HashMap::new();

    for (key, value) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| MutatorError::config("formats", "format name must be a string"))?
            .to_string();
        let width = value
            .get("width")
            .map(|w| parse_integer_value(&name, w))
            .transpose()?
            .map(|w| w as u32)
            .unwrap_or(32);
        let fields: Vec<String> = value
            .get("fields")
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        for field_name in &fields {
            if !field_index.contains_key(field_name) {
                return Err(MutatorError::config(
                    &name,
                    format!("format references unknown field {field_name:?}"),
                ));
            }
        }

        let id = FormatId(formats.len() as u32);
        formats.push(FormatSpec { name: name.clone(), width, fields });
        index.insert(name, id);
    }

    Ok((formats, index))
}

/// Instructions are keyed by mnemonic rather than listed as a plain
/// sequence, so that layering schema files (`extends`/`include`) adds
/// and overrides individual instructions instead of one layer wiping
/// out everything an earlier layer declared — the same key-by-key
/// merge that already applies to `fields:` and `formats:`. Order is
/// preserved as encountered during merge, since that order is what the
/// legality oracle's first-match semantics rely on.
fn project_instructions(
    node: &Value,
    fields: &[FieldEncoding],
    field_index: &HashMap<String, FieldId>,
    format_index: &HashMap<String, FormatId>,
    formats: &[FormatSpec],
) -> Result<Vec<InstructionSpec>> {
    let mapping = node
        .as_mapping()
        .ok_or_else(|| MutatorError::config("instructions", "must be a mapping keyed by mnemonic"))?;

    let mut out = Vec::new();
    for (key, entry) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| MutatorError::config("instructions", "instruction name must be a string"))?
            .to_string();
        let format = entry
            .get("format")
            .and_then(Value::as_str)
            .ok_or_else(|| MutatorError::config(&name, "instruction missing format"))?
            .to_string();
        let format_id = *format_index
            .get(&format)
            .ok_or_else(|| MutatorError::config(&name, format!("unknown format {format:?}")))?;
        let format_spec = &formats[format_id.0 as usize];

        let mut fixed_fields = Vec::new();
        let mut fixed_field_ids = Vec::new();
        if let Some(map) = entry.get("fixed_fields").and_then(Value::as_mapping) {
            for (k, v) in map {
                let field_name = k
                    .as_str()
                    .ok_or_else(|| MutatorError::config(&name, "fixed_fields key must be a string"))?
                    .to_string();
                if !format_spec.fields.iter().any(|f| f == &field_name) {
                    return Err(MutatorError::config(
                        &name,
                        format!("fixed field {field_name:?} is not part of format {format:?}"),
                    ));
                }
                let field_id = *field_index.get(&field_name).ok_or_else(|| {
                    MutatorError::config(&name, format!("unknown field {field_name:?}"))
                })?;

                let raw_value = match v.as_mapping().and_then(|m| m.get(&Value::String("value".into()))) {
                    Some(inner) => parse_integer_value(&name, inner)?,
                    None => parse_integer_value(&name, v)?,
                };
                let width = fields[field_id.0 as usize].width;
                if width < 32 && raw_value >= (1u64 << width) {
                    return Err(MutatorError::config(
                        &name,
                        format!("fixed field {field_name:?} value {raw_value} does not fit in {width} bits"),
                    ));
                }

                fixed_fields.push((field_name, raw_value as u32));
                fixed_field_ids.push((field_id, raw_value as u32));
            }
        }

        out.push(InstructionSpec {
            name,
            format,
            format_id,
            fixed_fields,
            fixed_field_ids,
        });
    }

    Ok(out)
}

