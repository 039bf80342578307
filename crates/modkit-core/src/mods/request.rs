use super::chain::ModChain;
use super::results::ModResults;
use crate::config::AppConfig;
use crate::errors::ModError;
use crate::platform::Platform;
use crate::warnings::WarningAggregator;
use std::any::{type_name, Any};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-invocation context handed to every link of a mod chain
#[derive(Clone)]
pub struct ModRequest {
    pub project_root: PathBuf,
    /// `{project_root}/{platform}`
    pub platform_project_root: PathBuf,
    pub platform: Platform,
    pub mod_name: String,
    /// Native project name (the `.xcodeproj` stem on iOS)
    pub project_name: Option<String>,
    /// When set, providers read artifacts but never write them
    pub introspect: bool,
    /// Rest of the chain; `None` behaves as the identity mod
    pub next_mod: Option<ModChain>,
    /// Run-wide warning sink shared with the caller's `RunContext`
    pub warnings: Arc<WarningAggregator>,
}

impl ModRequest {
    pub fn new(project_root: &Path, platform: Platform, mod_name: impl Into<String>) -> Self {
        ModRequest {
            project_root: project_root.to_path_buf(),
            platform_project_root: project_root.join(platform.as_str()),
            platform,
            mod_name: mod_name.into(),
            project_name: None,
            introspect: false,
            next_mod: None,
            warnings: Arc::default(),
        }
    }

    pub fn with_warnings(mut self, warnings: Arc<WarningAggregator>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Record a non-fatal problem for this request's platform
    pub fn add_warning(&self, tag: impl Into<String>, message: impl Into<String>, link: Option<&str>) {
        self.warnings.add_warning(self.platform, tag, message, link);
    }

    pub fn with_project_name(mut self, project_name: Option<String>) -> Self {
        self.project_name = project_name;
        self
    }

    pub fn with_introspect(mut self, introspect: bool) -> Self {
        self.introspect = introspect;
        self
    }

    /// `platform.modName`, the key used in warnings and logs
    pub fn key(&self) -> String {
        format!("{}.{}", self.platform, self.mod_name)
    }
}

impl fmt::Debug for ModRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModRequest")
            .field("project_root", &self.project_root)
            .field("platform_project_root", &self.platform_project_root)
            .field("platform", &self.platform)
            .field("mod_name", &self.mod_name)
            .field("project_name", &self.project_name)
            .field("introspect", &self.introspect)
            .field("has_next_mod", &self.next_mod.is_some())
            .finish()
    }
}

/// The `{ ...config, modResults, modRequest }` value a mod receives and returns
#[derive(Debug)]
pub struct ModContext {
    pub config: AppConfig,
    pub mod_results: Option<ModResults>,
    pub mod_request: ModRequest,
}

impl ModContext {
    pub fn new(config: AppConfig, mod_request: ModRequest) -> Self {
        ModContext {
            config,
            mod_results: None,
            mod_request,
        }
    }

    pub fn with_results(mut self, results: ModResults) -> Self {
        self.mod_results = Some(results);
        self
    }

    /// Hand the context to the rest of the chain, or return it unchanged at the end
    pub fn forward(mut self) -> Result<ModContext, ModError> {
        match self.mod_request.next_mod.take() {
            Some(next) => next.invoke(self),
            None => Ok(self),
        }
    }

    pub fn results_mut<T: Any>(&mut self) -> Result<&mut T, ModError> {
        downcast_results_mut(&mut self.mod_results, &self.mod_request)
    }

    pub fn results_ref<T: Any>(&self) -> Result<&T, ModError> {
        let results = self
            .mod_results
            .as_ref()
            .ok_or_else(|| missing_results::<T>(&self.mod_request))?;
        let found = results.type_name();
        results
            .downcast_ref::<T>()
            .ok_or_else(|| type_mismatch::<T>(&self.mod_request, found))
    }

    /// Split into the config and the taken results, keeping the request
    pub fn take_results(&mut self) -> Option<ModResults> {
        self.mod_results.take()
    }
}

/// Typed view into the results slot, with errors that name the mod key
pub fn downcast_results_mut<'a, T: Any>(
    results: &'a mut Option<ModResults>,
    request: &ModRequest,
) -> Result<&'a mut T, ModError> {
    let results = results
        .as_mut()
        .ok_or_else(|| missing_results::<T>(request))?;
    let found = results.type_name();
    results
        .downcast_mut::<T>()
        .ok_or_else(|| type_mismatch::<T>(request, found))
}

fn missing_results<T: Any>(request: &ModRequest) -> ModError {
    ModError::MissingModResults {
        platform: request.platform,
        mod_name: request.mod_name.clone(),
        expected: type_name::<T>(),
    }
}

fn type_mismatch<T: Any>(request: &ModRequest, found: &'static str) -> ModError {
    ModError::ResultsTypeMismatch {
        platform: request.platform,
        mod_name: request.mod_name.clone(),
        expected: type_name::<T>(),
        found,
    }
}
