//! JSON ABI loading.
//!
//! Reads the standard contract ABI JSON array into [`Method`] descriptors and
//! serves them by name or selector. Only `function` entries are kept.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::args::SchemaProvider;
use crate::types::{Method, Param, ParamType, TupleField, SELECTOR_LEN};

#[derive(Debug, Clone, Deserialize)]
struct AbiEntry {
    #[serde(default = "default_entry_type", rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

fn default_entry_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct AbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

#[derive(Debug, Clone, Default)]
pub struct Abi {
    methods: BTreeMap<String, Method>,
    by_selector: BTreeMap<[u8; SELECTOR_LEN], String>,
}

impl Abi {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_json_slice(s.as_bytes())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let entries: Vec<AbiEntry> =
            serde_json::from_slice(bytes).context("parse ABI JSON (expected array of entries)")?;
        let mut abi = Abi::default();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.kind != "function" {
                continue;
            }
            let inputs = parse_params(&entry.inputs)
                .with_context(|| format!("ABI entry[{idx}] {:?} inputs", entry.name))?;
            let outputs = parse_params(&entry.outputs)
                .with_context(|| format!("ABI entry[{idx}] {:?} outputs", entry.name))?;
            abi.insert(Method::new(entry.name.clone(), inputs, outputs));
        }
        Ok(abi)
    }

    /// Adds a method. A name that is already taken gets the first free numeric
    /// suffix (`f`, `f0`, `f1`, ...); the raw name and selector are unchanged.
    pub fn insert(&mut self, mut method: Method) {
        let mut name = method.name.clone();
        let mut n = 0usize;
        while self.methods.contains_key(&name) {
            name = format!("{}{n}", method.name);
            n += 1;
        }
        method.name = name.clone();
        self.by_selector.insert(method.selector, name.clone());
        self.methods.insert(name, method);
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl SchemaProvider for Abi {
    fn method_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    fn method_by_selector(&self, selector: &[u8]) -> Option<&Method> {
        let key: [u8; SELECTOR_LEN] = selector.try_into().ok()?;
        self.by_selector
            .get(&key)
            .and_then(|name| self.methods.get(name))
    }
}

fn parse_params(params: &[AbiParam]) -> Result<Vec<Param>> {
    params
        .iter()
        .map(|p| -> Result<Param> {
            let ty = parse_param_type(&p.ty, &p.components)
                .with_context(|| format!("param {:?}", p.name))?;
            Ok(Param::new(p.name.clone(), ty))
        })
        .collect()
}

/// Parses an ABI type string such as `uint24`, `bytes32`, `tuple[]` or
/// `address[3][]`. `components` is consulted for `tuple` bases.
fn parse_param_type(ty: &str, components: &[AbiParam]) -> Result<ParamType> {
    let ty = ty.trim();
    if let Some(head) = ty.strip_suffix(']') {
        let Some(open) = head.rfind('[') else {
            anyhow::bail!("unbalanced array suffix in type {ty:?}");
        };
        let elem = parse_param_type(&head[..open], components)?;
        let len = &head[open + 1..];
        if len.is_empty() {
            return Ok(ParamType::array(elem));
        }
        let n: usize = len
            .parse()
            .with_context(|| format!("invalid array length {len:?} in type {ty:?}"))?;
        return Ok(ParamType::fixed_array(n, elem));
    }

    match ty {
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "address" => return Ok(ParamType::Address),
        "bytes" => return Ok(ParamType::Bytes),
        "function" => return Ok(ParamType::Function),
        "int" => return Ok(ParamType::Int(256)),
        "uint" => return Ok(ParamType::Uint(256)),
        "hash" => return Ok(ParamType::Unsupported(ty.to_string())),
        "tuple" => {
            let fields = components
                .iter()
                .map(|c| -> Result<TupleField> {
                    Ok(TupleField {
                        name: c.name.clone(),
                        ty: parse_param_type(&c.ty, &c.components)
                            .with_context(|| format!("tuple component {:?}", c.name))?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(ParamType::Tuple(fields));
        }
        _ => {}
    }

    if ty.starts_with("fixed") || ty.starts_with("ufixed") {
        return Ok(ParamType::Unsupported(ty.to_string()));
    }
    if let Some(n) = ty.strip_prefix("bytes") {
        let n: usize = n
            .parse()
            .with_context(|| format!("invalid bytes width in type {ty:?}"))?;
        if !(1..=32).contains(&n) {
            anyhow::bail!("bytes width must be in 1..=32: got {ty:?}");
        }
        return Ok(ParamType::FixedBytes(n));
    }
    if let Some(bits) = ty.strip_prefix("uint") {
        return Ok(ParamType::Uint(parse_bits(ty, bits)?));
    }
    if let Some(bits) = ty.strip_prefix("int") {
        return Ok(ParamType::Int(parse_bits(ty, bits)?));
    }
    anyhow::bail!("unknown ABI type {ty:?}")
}

fn parse_bits(ty: &str, bits: &str) -> Result<u16> {
    let bits: u16 = bits
        .parse()
        .with_context(|| format!("invalid integer width in type {ty:?}"))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        anyhow::bail!("integer width must be a multiple of 8 in 8..=256: got {ty:?}");
    }
    Ok(bits)
}
