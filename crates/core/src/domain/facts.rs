// Host Fact Document & Text Parsers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host description assembled by a backend's fact gathering.
///
/// Constructed fresh on every gather call; never cached or mutated after
/// return. The document shape is fixed per supported platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
    pub os: OsFacts,
    pub process: ProcessFacts,
}

/// Operating-system facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsFacts {
    /// Key/value pairs parsed from the OS release descriptor file.
    pub release: BTreeMap<String, String>,
    pub kernel_version: String,
    pub hostname: String,
    pub architecture: String,
}

/// Runtime/process facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFacts {
    /// One mapping per logical-processor block, in source order.
    #[serde(rename = "cpuInfo")]
    pub cpu_info: Vec<BTreeMap<String, String>>,
    /// Memory statistic name -> value string.
    #[serde(rename = "memInfo")]
    pub mem_info: BTreeMap<String, String>,
}

/// Parse `key<sep>value` lines into a mapping.
///
/// Keys and values are trimmed; values lose one layer of surrounding double
/// quotes (os-release style). Lines without the separator or with an empty
/// key are skipped.
pub fn parse_delimited_map(bytes: &[u8], sep: char) -> BTreeMap<String, String> {
    let text = String::from_utf8_lossy(bytes);
    let mut map = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(sep) {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            map.insert(key.to_string(), unquote(value.trim()).to_string());
        }
    }
    map
}

/// Parse blank-line-separated `key<sep>value` blocks into an ordered
/// sequence of mappings, one element per block. Empty blocks are dropped.
pub fn parse_delimited_records(bytes: &[u8], sep: char) -> Vec<BTreeMap<String, String>> {
    let text = String::from_utf8_lossy(bytes);
    let mut records = Vec::new();
    let mut current = BTreeMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(sep) {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            current.insert(key.to_string(), unquote(value.trim()).to_string());
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
