//! The stack-equivalent build context.
//!
//! A [`Stack`] owns everything declared for one deployable unit:
//! - the resource graph (logical id → kind, properties, ordering edges)
//! - template parameters
//! - the file-asset manifest
//! - the per-stack provider singleton registry
//!
//! All collections sit behind `RwLock`s so registration takes `&self`;
//! the singleton registry's lookup-or-insert is double-checked under the
//! write lock, which keeps construction at-most-once even if a build ever
//! runs multi-threaded.

use crate::error::{Result, StratusError};
use crate::provider::CustomResourceProvider;
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use stratus_api::{AssetLocation, AssetPublisher, FileAssetSource, Token};
use tracing::debug;

/// Logical id of the template parameter naming the asset upload
/// container. Its value is only known at deploy time.
pub const STAGING_BUCKET_PARAMETER: &str = "StagingBucket";

#[derive(Debug, Clone)]
struct ResourceEntry {
    kind: String,
    properties: Value,
    depends_on: Vec<String>,
}

#[derive(Debug, Clone)]
struct ParameterEntry {
    parameter_type: String,
    description: Option<String>,
}

/// Handle to a declared resource.
///
/// Attributes referenced through a handle stay deferred until deploy
/// time; the handle itself only knows the logical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    logical_id: String,
}

impl ResourceHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Deferred `{"Ref": id}` to this resource.
    pub fn reference(&self) -> Token {
        Token::reference(&self.logical_id)
    }

    /// Deferred attribute of this resource.
    pub fn att(&self, attribute: &str) -> Token {
        Token::get_att(&self.logical_id, attribute)
    }
}

pub struct Stack {
    stack_name: String,
    resources: RwLock<IndexMap<String, ResourceEntry>>,
    parameters: RwLock<IndexMap<String, ParameterEntry>>,
    assets: RwLock<IndexMap<String, AssetLocation>>,
    providers: RwLock<HashMap<String, Arc<CustomResourceProvider>>>,
}

impl Stack {
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            resources: RwLock::new(IndexMap::new()),
            parameters: RwLock::new(IndexMap::new()),
            assets: RwLock::new(IndexMap::new()),
            providers: RwLock::new(HashMap::new()),
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Declare a resource of `kind` under `logical_id`.
    ///
    /// Returns a handle whose attributes can be referenced as deferred
    /// values. Logical ids are unique per stack.
    pub fn add_resource(
        &self,
        logical_id: impl Into<String>,
        kind: impl Into<String>,
        properties: Value,
    ) -> Result<ResourceHandle> {
        let logical_id = logical_id.into();
        let kind = kind.into();
        let mut resources = self.resources.write().unwrap();
        if resources.contains_key(&logical_id) {
            return Err(StratusError::DuplicateLogicalId(logical_id));
        }
        debug!("declared {kind} resource {logical_id}");
        resources.insert(
            logical_id.clone(),
            ResourceEntry {
                kind,
                properties,
                depends_on: Vec::new(),
            },
        );
        Ok(ResourceHandle { logical_id })
    }

    /// Record that `dependent` must be created after `required`.
    ///
    /// This is an explicit ordering edge, needed even when `dependent`
    /// already references an attribute of `required` through a deferred
    /// token.
    pub fn add_dependency(
        &self,
        dependent: &ResourceHandle,
        required: &ResourceHandle,
    ) -> Result<()> {
        let mut resources = self.resources.write().unwrap();
        if !resources.contains_key(required.logical_id()) {
            return Err(StratusError::Internal(format!(
                "unknown resource {}",
                required.logical_id()
            )));
        }
        let entry = resources.get_mut(dependent.logical_id()).ok_or_else(|| {
            StratusError::Internal(format!("unknown resource {}", dependent.logical_id()))
        })?;
        let id = required.logical_id().to_string();
        if !entry.depends_on.contains(&id) {
            entry.depends_on.push(id);
        }
        Ok(())
    }

    /// Register a template parameter at most once; later calls with the
    /// same id return the existing deferred reference.
    pub fn ensure_parameter(
        &self,
        logical_id: &str,
        parameter_type: &str,
        description: Option<&str>,
    ) -> Token {
        let mut parameters = self.parameters.write().unwrap();
        parameters
            .entry(logical_id.to_string())
            .or_insert_with(|| ParameterEntry {
                parameter_type: parameter_type.to_string(),
                description: description.map(str::to_string),
            });
        Token::reference(logical_id)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.read().unwrap().len()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.read().unwrap().len()
    }

    /// All file assets published so far, keyed by source hash.
    pub fn file_assets(&self) -> IndexMap<String, AssetLocation> {
        self.assets.read().unwrap().clone()
    }

    /// Atomic lookup-or-insert for the provider singleton registry.
    ///
    /// `build` runs at most once per id; a failed build inserts nothing,
    /// so the id stays available for a later attempt.
    pub(crate) fn provider_entry(
        &self,
        id: &str,
        build: impl FnOnce() -> Result<CustomResourceProvider>,
    ) -> Result<Arc<CustomResourceProvider>> {
        if let Some(existing) = self.providers.read().unwrap().get(id) {
            return Ok(existing.clone());
        }
        let mut providers = self.providers.write().unwrap();
        if let Some(existing) = providers.get(id) {
            return Ok(existing.clone());
        }
        let provider = Arc::new(build()?);
        providers.insert(id.to_string(), provider.clone());
        Ok(provider)
    }

    /// Synthesize the declared parameters and resources into a template
    /// document.
    pub fn to_template(&self) -> Value {
        let parameters = self.parameters.read().unwrap();
        let resources = self.resources.read().unwrap();

        let mut template = serde_json::Map::new();

        if !parameters.is_empty() {
            let mut block = serde_json::Map::new();
            for (id, parameter) in parameters.iter() {
                let mut entry = serde_json::Map::new();
                entry.insert("Type".into(), json!(parameter.parameter_type));
                if let Some(description) = &parameter.description {
                    entry.insert("Description".into(), json!(description));
                }
                block.insert(id.clone(), Value::Object(entry));
            }
            template.insert("Parameters".into(), Value::Object(block));
        }

        let mut block = serde_json::Map::new();
        for (id, resource) in resources.iter() {
            let mut entry = serde_json::Map::new();
            entry.insert("Type".into(), json!(resource.kind));
            entry.insert("Properties".into(), resource.properties.clone());
            if !resource.depends_on.is_empty() {
                entry.insert("DependsOn".into(), json!(resource.depends_on));
            }
            block.insert(id.clone(), Value::Object(entry));
        }
        template.insert("Resources".into(), Value::Object(block));

        Value::Object(template)
    }
}

impl AssetPublisher for Stack {
    fn add_file_asset(&self, source: FileAssetSource) -> AssetLocation {
        let bucket = self.ensure_parameter(
            STAGING_BUCKET_PARAMETER,
            "String",
            Some("Container that staged file assets are uploaded to"),
        );
        let mut assets = self.assets.write().unwrap();
        if let Some(existing) = assets.get(&source.source_hash) {
            return existing.clone();
        }
        let location = AssetLocation {
            bucket_name: bucket,
            object_key: format!("{}{}", source.source_hash, source.packaging.extension()),
        };
        debug!(
            "published file asset {} as {}",
            source.staged_path, location.object_key
        );
        assets.insert(source.source_hash.clone(), location.clone());
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_api::FileAssetPackaging;

    #[test]
    fn test_add_resource_and_template_shape() {
        let stack = Stack::new("unit");
        let handle = stack
            .add_resource("Thing", "Custom::Thing", json!({ "Key": "Value" }))
            .unwrap();
        assert_eq!(handle.logical_id(), "Thing");

        let template = stack.to_template();
        assert_eq!(template["Resources"]["Thing"]["Type"], json!("Custom::Thing"));
        assert_eq!(
            template["Resources"]["Thing"]["Properties"]["Key"],
            json!("Value")
        );
        // No parameters declared, so the block is absent entirely.
        assert!(template.as_object().unwrap().get("Parameters").is_none());
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let stack = Stack::new("unit");
        stack
            .add_resource("Thing", "Custom::Thing", json!({}))
            .unwrap();
        let err = stack
            .add_resource("Thing", "Custom::Other", json!({}))
            .unwrap_err();
        assert!(matches!(err, StratusError::DuplicateLogicalId(id) if id == "Thing"));
    }

    #[test]
    fn test_dependency_recorded_once() {
        let stack = Stack::new("unit");
        let a = stack.add_resource("A", "Custom::A", json!({})).unwrap();
        let b = stack.add_resource("B", "Custom::B", json!({})).unwrap();

        stack.add_dependency(&a, &b).unwrap();
        stack.add_dependency(&a, &b).unwrap();

        let template = stack.to_template();
        assert_eq!(template["Resources"]["A"]["DependsOn"], json!(["B"]));
        assert!(
            template["Resources"]["B"]
                .as_object()
                .unwrap()
                .get("DependsOn")
                .is_none()
        );
    }

    #[test]
    fn test_dependency_on_unknown_resource_fails() {
        let stack = Stack::new("unit");
        let a = stack.add_resource("A", "Custom::A", json!({})).unwrap();
        let ghost = ResourceHandle {
            logical_id: "Ghost".to_string(),
        };
        assert!(stack.add_dependency(&a, &ghost).is_err());
        assert!(stack.add_dependency(&ghost, &a).is_err());
    }

    #[test]
    fn test_parameter_registered_at_most_once() {
        let stack = Stack::new("unit");
        let first = stack.ensure_parameter("Bucket", "String", Some("where assets go"));
        let second = stack.ensure_parameter("Bucket", "String", None);
        assert_eq!(first, second);
        assert_eq!(stack.parameter_count(), 1);

        let template = stack.to_template();
        assert_eq!(
            template["Parameters"]["Bucket"]["Description"],
            json!("where assets go")
        );
    }

    #[test]
    fn test_file_assets_deduplicate_by_hash() {
        let stack = Stack::new("unit");
        let source = FileAssetSource {
            staged_path: "asset.abc123".to_string(),
            source_hash: "abc123".to_string(),
            packaging: FileAssetPackaging::ZipDirectory,
        };

        let first = stack.add_file_asset(source.clone());
        let second = stack.add_file_asset(source);

        assert_eq!(first, second);
        assert_eq!(first.object_key, "abc123.zip");
        assert_eq!(
            first.bucket_name,
            Token::reference(STAGING_BUCKET_PARAMETER)
        );
        assert_eq!(stack.file_assets().len(), 1);
        assert_eq!(stack.parameter_count(), 1);
    }
}
