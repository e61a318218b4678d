//! Test-only helpers for declaring interfaces, implementations and manifests.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::callable::Callable;
use crate::core::error::ContractError;
use crate::core::implementation::ImplementationBuilder;
use crate::core::member::Member;
use crate::core::registry::{InterfaceId, Registry};

/// Body returning `value`.
pub fn constant(value: impl Into<Value>) -> Callable {
    Callable::constant(value.into())
}

/// Define `Greeter`: required `greet()` and a default `farewell()` returning
/// `"goodbye"`. Returns the interface and the default body.
pub fn greeter(registry: &mut Registry) -> (InterfaceId, Callable) {
    let farewell = constant("goodbye");
    let id = registry
        .define(
            "Greeter",
            &[],
            vec![
                ("greet", Member::method()),
                ("farewell", Member::default_method(farewell.clone())),
            ],
        )
        .expect("define Greeter");
    (id, farewell)
}

/// Define an interface with one required method.
pub fn single_method(registry: &mut Registry, name: &str, method: &str) -> InterfaceId {
    registry
        .define(name, &[], vec![(method, Member::method())])
        .expect("define interface")
}

/// Start a builder for `name` implementing `interfaces`.
pub fn implementation(
    registry: &Registry,
    name: &str,
    interfaces: &[InterfaceId],
) -> Result<ImplementationBuilder, ContractError> {
    let mut builder = ImplementationBuilder::new(name);
    registry.declare_implements(&mut builder, interfaces)?;
    Ok(builder)
}

/// Manifest written to a fresh temp dir. Keep the dir alive while in use.
pub struct TestManifest {
    dir: TempDir,
    pub path: PathBuf,
}

impl TestManifest {
    pub fn new(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        let path = dir.path().join("contracts.manifest.toml");
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(Self { dir, path })
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

/// Manifest used across CLI and orchestration tests.
pub const GREETER_MANIFEST: &str = r#"
[[interfaces]]
name = "Greeter"
init_fields = { language = "en" }

[[interfaces.members]]
kind = "method"
name = "greet"

[[interfaces.members]]
kind = "method"
name = "farewell"
default = "goodbye"

[[interfaces.members]]
kind = "attribute"
name = "language"
type = "string"

[[interfaces]]
name = "Flyer"

[[interfaces.members]]
kind = "method"
name = "move"

[[interfaces]]
name = "Swimmer"

[[interfaces.members]]
kind = "method"
name = "move"

[[implementations]]
name = "EnglishGreeter"
implements = ["Greeter"]

[[implementations.members]]
kind = "method"
name = "greet"
returns = "hello"
override = true
"#;

/// `GREETER_MANIFEST` plus one rejected and one conflicting implementation.
pub fn rejecting_manifest() -> String {
    format!(
        r#"{GREETER_MANIFEST}
[[implementations]]
name = "Mute"
implements = ["Greeter"]

[[implementations]]
name = "Duck"
implements = ["Flyer", "Swimmer"]

[[implementations.members]]
kind = "method"
name = "move"
returns = "waddle"
"#
    )
}
