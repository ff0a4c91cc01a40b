//! Singleton custom-resource provider provisioning.
//!
//! One provider exists per (stack, unique id): a packaged code asset, an
//! execution role, and a function resource wired to an entrypoint
//! wrapper, constructed in that order. The factory memoizes on the
//! derived id, and only the first caller's configuration takes effect;
//! later calls for the same id get the existing provider back and their
//! configuration is dropped silently.

mod entrypoint;

pub use entrypoint::{
    ENTRYPOINT_FILE_NAME, ENTRYPOINT_HANDLER, FsEntrypointInstaller, INDEX_FILE_NAME,
};

use crate::asset::DirectoryStaging;
use crate::error::{Result, StratusError};
use crate::stack::{ResourceHandle, Stack};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stratus_api::{
    AssetPublisher, AssetStager, EntrypointInstaller, FileAssetPackaging, FileAssetSource,
    FunctionCode, FunctionEnvironment, FunctionProperties, InlinePolicy, PolicyDocument,
    RoleProperties, Runtime, StagedAsset, Token,
};
use tracing::{debug, info};

const ROLE_RESOURCE_KIND: &str = "AWS::IAM::Role";
const FUNCTION_RESOURCE_KIND: &str = "AWS::Lambda::Function";

/// Principal allowed to assume provider execution roles.
const COMPUTE_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";

/// Baseline managed policy granting execution logging permissions.
const BASIC_EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

const INLINE_POLICY_NAME: &str = "Inline";

/// Suffix appended to the caller-supplied unique id to derive the
/// singleton registry key.
const PROVIDER_ID_SUFFIX: &str = "CustomResourceProvider";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);
const DEFAULT_MEMORY_MIB: u32 = 128;

/// Configuration for a provider.
///
/// Only the first call for a given unique id reads it; see
/// [`CustomResourceProvider::get_or_create`].
#[derive(Debug, Clone)]
pub struct CustomResourceProviderProps {
    code_directory: PathBuf,
    runtime: Runtime,
    policy_statements: Vec<serde_json::Value>,
    timeout: Option<Duration>,
    memory_size: Option<u32>,
    environment: Option<IndexMap<String, String>>,
    description: Option<String>,
}

impl CustomResourceProviderProps {
    pub fn new(code_directory: impl Into<PathBuf>, runtime: Runtime) -> Self {
        Self {
            code_directory: code_directory.into(),
            runtime,
            policy_statements: Vec::new(),
            timeout: None,
            memory_size: None,
            environment: None,
            description: None,
        }
    }

    /// Raw permission statements attached inline to the execution role.
    /// Carried through verbatim, never validated.
    pub fn with_policy_statements(
        mut self,
        statements: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        self.policy_statements.extend(statements);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_memory_size(mut self, mebibytes: u32) -> Self {
        self.memory_size = Some(mebibytes);
        self
    }

    pub fn with_environment(mut self, environment: IndexMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The per-stack provider singleton.
///
/// Owns one staged asset, one execution role, and one function resource,
/// and exposes the two deploy-time identities other resources need.
pub struct CustomResourceProvider {
    service_token: Token,
    role_arn: Token,
    asset: StagedAsset,
    role: ResourceHandle,
    handler: ResourceHandle,
}

impl CustomResourceProvider {
    /// Returns the provider function's identity token for `uniqueid`,
    /// constructing the provider on first use.
    ///
    /// On a registry hit `props` is ignored entirely: only the first
    /// caller's configuration takes effect, and a later conflicting
    /// configuration is dropped without warning.
    pub fn get_or_create(
        stack: &Stack,
        uniqueid: &str,
        props: CustomResourceProviderProps,
    ) -> Result<Token> {
        Ok(Self::get_or_create_provider(stack, uniqueid, props)?.service_token())
    }

    /// Same memoization as [`CustomResourceProvider::get_or_create`],
    /// returning the provider itself for callers that also need the role
    /// identity.
    pub fn get_or_create_provider(
        stack: &Stack,
        uniqueid: &str,
        props: CustomResourceProviderProps,
    ) -> Result<Arc<Self>> {
        Self::get_or_create_provider_with(
            stack,
            uniqueid,
            props,
            &DirectoryStaging,
            &FsEntrypointInstaller,
        )
    }

    /// Seam-injected variant; tests use it to stand in for the file
    /// system collaborators.
    pub fn get_or_create_provider_with(
        stack: &Stack,
        uniqueid: &str,
        props: CustomResourceProviderProps,
        stager: &dyn AssetStager,
        installer: &dyn EntrypointInstaller,
    ) -> Result<Arc<Self>> {
        let id = format!("{uniqueid}{PROVIDER_ID_SUFFIX}");
        stack.provider_entry(&id, || Self::build(stack, &id, props, stager, installer))
    }

    fn build(
        stack: &Stack,
        id: &str,
        props: CustomResourceProviderProps,
        stager: &dyn AssetStager,
        installer: &dyn EntrypointInstaller,
    ) -> Result<Self> {
        let written = installer.install(&props.code_directory)?;
        debug!("installed entrypoint wrapper at {}", written.display());

        let index = props.code_directory.join(INDEX_FILE_NAME);
        if !index.is_file() {
            return Err(StratusError::Precondition(format!(
                "cannot find handler file {}",
                index.display()
            )));
        }

        let asset = stager.stage(&props.code_directory)?;
        let location = stack.add_file_asset(FileAssetSource {
            staged_path: asset.staged_path.clone(),
            source_hash: asset.source_hash.clone(),
            packaging: FileAssetPackaging::ZipDirectory,
        });

        let role_properties = RoleProperties {
            assume_role_policy_document: PolicyDocument::new(vec![serde_json::json!({
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": COMPUTE_SERVICE_PRINCIPAL },
            })]),
            managed_policy_arns: vec![BASIC_EXECUTION_POLICY_ARN.to_string()],
            policies: render_policies(props.policy_statements),
        };
        let role = stack.add_resource(
            format!("{id}Role"),
            ROLE_RESOURCE_KIND,
            serde_json::to_value(&role_properties)?,
        )?;

        let function_properties = FunctionProperties {
            code: FunctionCode {
                s3_bucket: location.bucket_name.clone(),
                s3_key: location.object_key.clone(),
            },
            timeout: props.timeout.unwrap_or(DEFAULT_TIMEOUT).as_secs(),
            memory_size: props.memory_size.unwrap_or(DEFAULT_MEMORY_MIB),
            handler: ENTRYPOINT_HANDLER.to_string(),
            role: role.att("Arn"),
            runtime: props.runtime,
            environment: render_environment(props.environment),
            description: props.description,
        };
        let handler = stack.add_resource(
            format!("{id}Handler"),
            FUNCTION_RESOURCE_KIND,
            serde_json::to_value(&function_properties)?,
        )?;
        // The role must exist before the function references it, even
        // though the attribute reference itself resolves later.
        stack.add_dependency(&handler, &role)?;

        info!(
            "provisioned custom resource provider {id} from {}",
            props.code_directory.display()
        );

        Ok(Self {
            service_token: handler.att("Arn"),
            role_arn: role.att("Arn"),
            asset,
            role,
            handler,
        })
    }

    /// Deferred identity of the provider function. Pass this as the
    /// invocation target of custom resource definitions.
    pub fn service_token(&self) -> Token {
        self.service_token.clone()
    }

    /// Deferred identity of the execution role.
    pub fn role_arn(&self) -> Token {
        self.role_arn.clone()
    }

    pub fn staged_asset(&self) -> &StagedAsset {
        &self.asset
    }

    pub fn role_handle(&self) -> &ResourceHandle {
        &self.role
    }

    pub fn handler_handle(&self) -> &ResourceHandle {
        &self.handler
    }
}

/// Wraps raw statements into the single inline policy, or nothing at all
/// when no statements were supplied.
fn render_policies(statements: Vec<serde_json::Value>) -> Option<Vec<InlinePolicy>> {
    if statements.is_empty() {
        return None;
    }
    Some(vec![InlinePolicy {
        policy_name: INLINE_POLICY_NAME.to_string(),
        policy_document: PolicyDocument::new(statements),
    }])
}

/// Rebuilds the environment with lexicographically sorted keys.
///
/// The platform fingerprints the serialized environment block for
/// versioning; a stable key order keeps that fingerprint independent of
/// caller insertion order. Empty and absent maps emit no block at all.
fn render_environment(
    environment: Option<IndexMap<String, String>>,
) -> Option<FunctionEnvironment> {
    let environment = environment?;
    if environment.is_empty() {
        return None;
    }
    let mut pairs: Vec<(String, String)> = environment.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Some(FunctionEnvironment {
        variables: pairs.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_environment_sorts_keys() {
        let rendered = render_environment(Some(environment(&[("B", "2"), ("A", "1")]))).unwrap();
        let keys: Vec<&String> = rendered.variables.keys().collect();
        assert_eq!(keys, ["A", "B"]);
    }

    #[test]
    fn test_render_environment_is_insertion_order_independent() {
        let forward = render_environment(Some(environment(&[("A", "1"), ("B", "2")])));
        let reversed = render_environment(Some(environment(&[("B", "2"), ("A", "1")])));
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&reversed).unwrap()
        );
    }

    #[test]
    fn test_render_environment_omits_empty_and_absent() {
        assert!(render_environment(None).is_none());
        assert!(render_environment(Some(IndexMap::new())).is_none());
    }

    #[test]
    fn test_render_policies_omits_empty() {
        assert!(render_policies(Vec::new()).is_none());
    }

    #[test]
    fn test_render_policies_wraps_statements_in_one_named_policy() {
        let statement = serde_json::json!({ "Effect": "Allow", "Action": "s3:GetObject" });
        let policies = render_policies(vec![statement.clone()]).unwrap();

        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].policy_name, "Inline");
        assert_eq!(policies[0].policy_document.statement, vec![statement]);
        assert_eq!(policies[0].policy_document.version, "2012-10-17");
    }
}
