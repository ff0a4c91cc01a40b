pub mod asset;
pub mod policy;
pub mod resource;
pub mod seams;
pub mod token;

// Re-export commonly used types
pub use asset::{AssetLocation, FileAssetPackaging, FileAssetSource, StagedAsset};
pub use policy::{InlinePolicy, POLICY_DOCUMENT_VERSION, PolicyDocument};
pub use resource::{FunctionCode, FunctionEnvironment, FunctionProperties, RoleProperties, Runtime};
pub use seams::{AssetPublisher, AssetStager, BoxError, EntrypointInstaller};
pub use token::Token;
