use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use machctl_core::Machine;
use serde::Deserialize;

/// Accepted inventory shapes: a bare list, or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Inventory {
    List(Vec<Machine>),
    Wrapped { machines: Vec<Machine> },
}

impl Inventory {
    fn into_machines(self) -> Vec<Machine> {
        match self {
            Inventory::List(machines) | Inventory::Wrapped { machines } => machines,
        }
    }
}

/// Reads an inventory from `path`, or stdin when `path` is absent or `-`.
pub fn load_inventory(path: Option<&Path>) -> Result<Vec<Machine>> {
    let (source, raw) = match path {
        Some(p) if p != Path::new("-") => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read inventory: {}", p.display()))?;
            (p.display().to_string(), raw)
        }
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read inventory from stdin")?;
            ("<stdin>".to_string(), raw)
        }
    };

    parse_inventory(&raw).with_context(|| format!("failed to parse inventory: {source}"))
}

/// Parses an inventory document in JSON or YAML.
///
/// Documents that look like JSON are tried as JSON first; anything else,
/// including YAML flow style such as `[{id: a}]`, goes through YAML.
pub fn parse_inventory(raw: &str) -> Result<Vec<Machine>> {
    let trimmed = raw.trim_start();
    let json = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str::<Inventory>(raw).ok()
    } else {
        None
    };
    let inventory = match json {
        Some(inventory) => inventory,
        None => serde_yaml::from_str::<Inventory>(raw)?,
    };
    Ok(inventory.into_machines())
}
