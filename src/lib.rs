//! vkg release tooling
//!
//! Two independent pieces wrap the engine's package build:
//! 1. The publish orchestrator decides, once per run, between building the
//!    configuration matrix and exporting + uploading the recipe.
//! 2. The asset link installer aliases the assets directory next to the
//!    compiled binaries.

pub mod ci;
pub mod config;
pub mod link;
pub mod logging;
pub mod orchestrator;
pub mod recipe;
pub mod reference;
pub mod tool;

pub use ci::{CiContext, CiEnvironment};
pub use config::{BuildMode, ConfigError, PublishConfig, RemoteSpec};
pub use link::{install, platform_alias, AliasKind, DirectoryAlias, LinkError, LinkOutcome, LinkSpec, LinkStage};
pub use orchestrator::{Orchestrator, PublishError, PublishOutcome, SkipReason};
pub use recipe::{Recipe, RecipeError};
pub use reference::{PackageReference, ReferenceError};
pub use tool::{BuildConfiguration, ConanCli, PackageTool, RemoteSession, ToolError};
