//! Module resolution for by-name plugin references
//!
//! Two steps, both returning typed results instead of failing:
//! 1. resolve the request to a file (direct path, or package under `node_modules`)
//! 2. for package references, walk up to the nearest `package.json` and prefer
//!    the convention entry file sitting next to it

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Entry file a package can ship to expose its config plugin
pub const PLUGIN_ENTRY_FILE: &str = "app.plugin.js";

const PACKAGE_JSON: &str = "package.json";
const NODE_MODULES: &str = "node_modules";

/// Outcome of a module lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResolution {
    Found(PathBuf),
    NotFound(String),
}

impl ModuleResolution {
    pub fn found(&self) -> Option<&Path> {
        match self {
            ModuleResolution::Found(path) => Some(path),
            ModuleResolution::NotFound(_) => None,
        }
    }
}

/// A plugin request resolved to a file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub request: String,
    pub path: PathBuf,
    /// Nearest ancestor directory holding a `package.json`
    pub package_root: Option<PathBuf>,
    pub package_name: Option<String>,
    /// True when the convention entry file replaced the package's main file
    pub via_plugin_entry: bool,
}

/// Whether `name` points at a file instead of a package
///
/// Relative and absolute paths always do. Otherwise a name with more
/// separators than a package name can carry (`@scope/pkg` has one, `pkg` none)
/// is treated as a file inside a package.
pub fn is_direct_file_reference(name: &str) -> bool {
    if name.starts_with("./")
        || name.starts_with("../")
        || name.starts_with(".\\")
        || name.starts_with("..\\")
        || name.starts_with('/')
        || is_windows_absolute(name)
    {
        return true;
    }

    let segments = name.split('/').count();
    if name.starts_with('@') {
        segments > 2
    } else {
        segments > 1
    }
}

fn is_windows_absolute(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Split `@scope/pkg/sub/path` into (`@scope/pkg`, `sub/path`)
fn split_package_request(request: &str) -> (&str, Option<&str>) {
    let package_segments = if request.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    for (seen, (idx, _)) in request.match_indices('/').enumerate() {
        if seen + 1 == package_segments {
            split_at = Some(idx);
            break;
        }
    }
    match split_at {
        Some(idx) => (&request[..idx], Some(&request[idx + 1..])),
        None => (request, None),
    }
}

/// Nearest ancestor directory of `file` (inclusive when `file` is a directory)
/// containing a `package.json`
pub fn find_package_boundary(file: &Path) -> Option<PathBuf> {
    let start = if file.is_dir() { Some(file) } else { file.parent() };
    let mut current = start;
    while let Some(dir) = current {
        if dir.join(PACKAGE_JSON).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// `name` field of the `package.json` inside `package_root`
pub fn read_package_name(package_root: &Path) -> Option<String> {
    read_package_json(package_root)?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn read_package_json(package_root: &Path) -> Option<Value> {
    let content = fs::read_to_string(package_root.join(PACKAGE_JSON)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Node-style file resolver
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    extensions: Vec<String>,
}

impl Default for ModuleResolver {
    fn default() -> Self {
        ModuleResolver {
            extensions: [".js", ".cjs", ".mjs", ".ts", ".json"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModuleResolver {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve `request` as seen from `from_dir`
    pub fn resolve(&self, from_dir: &Path, request: &str) -> ModuleResolution {
        if request.trim().is_empty() {
            return ModuleResolution::NotFound("empty module request".to_string());
        }

        if is_direct_file_reference(request) && !is_package_subpath(request) {
            let candidate = if Path::new(request).is_absolute() {
                PathBuf::from(request)
            } else {
                from_dir.join(request)
            };
            return match self.resolve_file_or_directory(&candidate) {
                Some(path) => ModuleResolution::Found(path),
                None => ModuleResolution::NotFound(format!(
                    "no file matches {}",
                    candidate.display()
                )),
            };
        }

        self.resolve_package(from_dir, request)
    }

    fn resolve_package(&self, from_dir: &Path, request: &str) -> ModuleResolution {
        let (package_name, subpath) = split_package_request(request);
        let mut current = Some(from_dir);
        while let Some(dir) = current {
            let package_dir = dir.join(NODE_MODULES).join(package_name);
            if package_dir.is_dir() {
                trace!("Found package {} at {}", package_name, package_dir.display());
                let resolved = match subpath {
                    Some(sub) => self.resolve_file_or_directory(&package_dir.join(sub)),
                    None => self.resolve_directory(&package_dir),
                };
                return match resolved {
                    Some(path) => ModuleResolution::Found(path),
                    None => ModuleResolution::NotFound(format!(
                        "package {} is installed at {} but has no entry file",
                        package_name,
                        package_dir.display()
                    )),
                };
            }
            current = dir.parent();
        }
        ModuleResolution::NotFound(format!(
            "package {} is not installed in any node_modules above {}",
            package_name,
            from_dir.display()
        ))
    }

    fn resolve_file_or_directory(&self, candidate: &Path) -> Option<PathBuf> {
        self.resolve_file(candidate)
            .or_else(|| self.resolve_directory(candidate))
    }

    fn resolve_file(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate.to_path_buf());
        }
        self.extensions.iter().find_map(|ext| {
            let mut with_ext = candidate.as_os_str().to_os_string();
            with_ext.push(ext);
            let path = PathBuf::from(with_ext);
            path.is_file().then_some(path)
        })
    }

    fn resolve_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }
        if let Some(main) = read_package_json(dir)
            .as_ref()
            .and_then(|pkg| pkg.get("main"))
            .and_then(Value::as_str)
        {
            if let Some(path) = self.resolve_file(&dir.join(main)) {
                return Some(path);
            }
            if let Some(path) = self.resolve_file(&dir.join(main).join("index")) {
                return Some(path);
            }
        }
        self.resolve_file(&dir.join("index"))
    }

    /// Resolve a plugin request, applying the convention entry file for packages
    pub fn resolve_plugin_module(&self, project_root: &Path, request: &str) -> Result<ResolvedModule, String> {
        let direct = is_direct_file_reference(request);
        let path = match self.resolve(project_root, request) {
            ModuleResolution::Found(path) => path,
            ModuleResolution::NotFound(reason) => return Err(reason),
        };

        let package_root = find_package_boundary(&path);
        let package_name = package_root.as_deref().and_then(read_package_name);

        if !direct {
            if let Some(entry) = package_root
                .as_ref()
                .map(|root| root.join(PLUGIN_ENTRY_FILE))
                .filter(|entry| entry.is_file())
            {
                debug!("Using {} for plugin {}", entry.display(), request);
                return Ok(ResolvedModule {
                    request: request.to_string(),
                    path: entry,
                    package_root,
                    package_name,
                    via_plugin_entry: true,
                });
            }
        }

        debug!("Resolved plugin {} to {}", request, path.display());
        Ok(ResolvedModule {
            request: request.to_string(),
            path,
            package_root,
            package_name,
            via_plugin_entry: false,
        })
    }
}

/// `pkg/sub` and `@scope/pkg/sub` are files inside an installed package, not paths
fn is_package_subpath(request: &str) -> bool {
    !(request.starts_with('.')
        || request.starts_with('/')
        || request.starts_with('\\')
        || is_windows_absolute(request))
}
