//! Compiled contract artifacts and exported ABIs

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use serde_json::Value;
use tracing::debug;

use crate::errors::ScriptError;

/// The suffix of Hardhat's debug artifacts
const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// A compiled contract
#[derive(Clone, Debug)]
pub struct Artifact {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

/// Locates artifacts in the build output and ABIs in the export directory
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The compiler's artifacts directory
    artifacts_dir: PathBuf,
    /// The flat ABI export directory
    abis_dir: PathBuf,
    /// Directories searched after the build output, e.g. the proxy artifacts
    /// shipped with the OpenZeppelin upgrades plugin
    fallback_dirs: Vec<PathBuf>,
}

impl ArtifactStore {
    /// Create a store over the given directories
    pub fn new(artifacts_dir: impl Into<PathBuf>, abis_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            abis_dir: abis_dir.into(),
            fallback_dirs: Vec::new(),
        }
    }

    /// Also search `dir` for artifacts missing from the build output
    pub fn with_fallback(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dirs.push(dir.into());
        self
    }

    /// Load a contract's artifact, searching the build output first
    pub fn load(&self, name: &str) -> Result<Artifact, ScriptError> {
        let mut path = None;
        for dir in std::iter::once(&self.artifacts_dir).chain(&self.fallback_dirs) {
            path = find_artifact(dir, name)?;
            if path.is_some() {
                break;
            }
        }
        let path = path.ok_or_else(|| {
            let searched = std::iter::once(&self.artifacts_dir)
                .chain(&self.fallback_dirs)
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            ScriptError::ArtifactParsing(format!("no artifact for {name} under {searched}"))
        })?;
        debug!("loading artifact {}", path.display());

        let json = read_json(&path)?;
        let abi = parse_abi(json.get("abi").cloned().unwrap_or(Value::Array(vec![])))?;
        let bytecode = extract_bytecode(&json).ok_or_else(|| {
            ScriptError::ArtifactParsing(format!("{name} has no creation bytecode"))
        })??;

        Ok(Artifact { name: name.to_string(), abi, bytecode })
    }

    /// The ABI of a contract, preferring the exported copy
    pub fn contract_abi(&self, name: &str) -> Result<JsonAbi, ScriptError> {
        let exported = self.abis_dir.join(format!("{name}.json"));
        if exported.exists() {
            return parse_abi(read_json(&exported)?);
        }
        self.load(name).map(|artifact| artifact.abi)
    }
}

/// Depth-first search for `<name>.json` below `dir`, skipping debug artifacts
fn find_artifact(dir: &Path, name: &str) -> Result<Option<PathBuf>, ScriptError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let target = format!("{name}.json");
    let mut entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_artifact(&path, name)? {
                return Ok(Some(found));
            }
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if file_name == target && !file_name.ends_with(DEBUG_ARTIFACT_SUFFIX) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Read and parse a JSON file
fn read_json(path: &Path) -> Result<Value, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}

/// Parse an ABI from either a bare array or an artifact-shaped object
fn parse_abi(value: Value) -> Result<JsonAbi, ScriptError> {
    let value = match value {
        Value::Object(mut obj) => obj.remove("abi").unwrap_or(Value::Array(vec![])),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Extract creation bytecode, accepting both `"bytecode": "0x.."` and
/// `"bytecode": { "object": "0x.." }`. Returns `None` when absent or empty.
fn extract_bytecode(json: &Value) -> Option<Result<Bytes, ScriptError>> {
    let bytecode = json.get("bytecode")?;
    let hex = bytecode.as_str().or_else(|| bytecode.get("object").and_then(Value::as_str))?;

    let stripped = hex.strip_prefix("0x").unwrap_or(hex);
    if stripped.is_empty() {
        return None;
    }

    Some(
        stripped
            .parse::<Bytes>()
            .map_err(|e| ScriptError::ArtifactParsing(format!("invalid bytecode hex: {e}"))),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    const ABI: &str = r#"[{"type":"function","name":"initialize","inputs":[{"name":"initiator","type":"address","internalType":"address"}],"outputs":[],"stateMutability":"nonpayable"}]"#;

    fn write_artifact(dir: &Path, rel: &str, bytecode: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let abi: Value = serde_json::from_str(ABI).unwrap();
        let json = json!({ "contractName": "Taggr", "abi": abi, "bytecode": bytecode });
        fs::write(path, json.to_string()).unwrap();
    }

    #[test]
    fn test_finds_nested_artifact_and_skips_debug_files() {
        let dir = tempdir().unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("contracts/Taggr.sol")).unwrap();
        fs::write(build.join("contracts/Taggr.sol/Taggr.dbg.json"), "{}").unwrap();
        write_artifact(&build, "contracts/Taggr.sol/Taggr.json", "0x6080");

        let store = ArtifactStore::new(&build, dir.path().join("abis"));
        let artifact = store.load("Taggr").unwrap();

        assert_eq!(artifact.bytecode, Bytes::from(vec![0x60, 0x80]));
        assert!(artifact.abi.function("initialize").is_some());
    }

    #[test]
    fn test_empty_bytecode_is_rejected() {
        let dir = tempdir().unwrap();
        write_artifact(dir.path(), "ITaggr.sol/ITaggr.json", "0x");

        let store = ArtifactStore::new(dir.path(), dir.path());
        assert!(matches!(store.load("ITaggr"), Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("missing"), dir.path());
        assert!(store.load("Taggr").is_err());
    }

    #[test]
    fn test_plugin_artifacts_are_a_fallback() {
        let dir = tempdir().unwrap();
        let build = dir.path().join("build");
        let plugin = dir.path().join("node_modules/@openzeppelin/upgrades-core/artifacts");
        write_artifact(&build, "contracts/Taggr.sol/Taggr.json", "0x6080");
        write_artifact(
            &plugin,
            "@openzeppelin/contracts/proxy/transparent/TransparentUpgradeableProxy.sol/TransparentUpgradeableProxy.json",
            "0x6001",
        );
        // A copy in the build output shadows the plugin's
        write_artifact(&plugin, "Taggr.sol/Taggr.json", "0x00");

        let store = ArtifactStore::new(&build, dir.path().join("abis")).with_fallback(&plugin);
        assert_eq!(
            store.load("TransparentUpgradeableProxy").unwrap().bytecode,
            Bytes::from(vec![0x60, 0x01])
        );
        assert_eq!(store.load("Taggr").unwrap().bytecode, Bytes::from(vec![0x60, 0x80]));

        let without = ArtifactStore::new(&build, dir.path().join("abis"));
        assert!(without.load("TransparentUpgradeableProxy").is_err());
    }

    #[test]
    fn test_forge_style_bytecode_object() {
        let json = json!({ "bytecode": { "object": "0x6001" } });
        let bytes = extract_bytecode(&json).unwrap().unwrap();
        assert_eq!(bytes, Bytes::from(vec![0x60, 0x01]));
    }

    #[test]
    fn test_exported_abi_is_preferred() {
        let dir = tempdir().unwrap();
        let abis = dir.path().join("abis");
        fs::create_dir_all(&abis).unwrap();
        fs::write(abis.join("Taggr.json"), ABI).unwrap();

        // No artifact exists, so this only succeeds through the export
        let store = ArtifactStore::new(dir.path().join("build"), &abis);
        let abi = store.contract_abi("Taggr").unwrap();
        assert!(abi.function("initialize").is_some());
    }
}
