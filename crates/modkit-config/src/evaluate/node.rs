//! Script evaluation through a `node` subprocess
//!
//! The embedded bootstrap loads the config module and prints one marked JSON
//! line describing the export. An inspect run decides value vs function; function
//! exports are called in a second run with the request context on stdin.
//! TypeScript configs go through the project's `sucrase` when installed, and
//! node's own type stripping otherwise.

use super::{code_frame, ConfigContext, ConfigFunction, DynamicExport, Evaluated, ScriptEvaluator};
use crate::errors::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

const BOOTSTRAP: &str = include_str!("bootstrap.cjs");
const RESULT_MARKER: &str = "__MODKIT_RESULT__";

/// Environment variable overriding the `node` binary
pub const NODE_BINARY_ENV: &str = "MODKIT_NODE_BINARY";

/// Oldest node that strips types (behind [`STRIP_TYPES_FLAG`]) and detects ESM syntax
const STRIP_TYPES_SINCE: (u32, u32) = (22, 7);
/// From this release type stripping is on by default
const STRIP_TYPES_DEFAULT_SINCE: (u32, u32) = (23, 6);
const STRIP_TYPES_FLAG: &str = "--experimental-strip-types";

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum BootstrapResult {
    Value {
        data: Value,
    },
    Function,
    Pending,
    Unavailable {
        message: String,
    },
    Error {
        message: String,
        #[serde(default)]
        line: Option<usize>,
        #[serde(default)]
        column: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Inspect,
    Call,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Inspect => "inspect",
            Mode::Call => "call",
        }
    }
}

/// How `node` is started for one config file
#[derive(Debug, Clone)]
struct NodeInvocation {
    node: PathBuf,
    /// Flags placed before `-e`
    flags: Vec<&'static str>,
    strip_types: bool,
}

impl NodeInvocation {
    fn for_file(node: PathBuf, path: &Path) -> Self {
        let mut invocation = NodeInvocation {
            node,
            flags: Vec::new(),
            strip_types: false,
        };
        if !is_typescript(path) {
            return invocation;
        }
        match node_version(&invocation.node) {
            Some(version) if version >= STRIP_TYPES_DEFAULT_SINCE => invocation.strip_types = true,
            Some(version) if version >= STRIP_TYPES_SINCE => {
                invocation.strip_types = true;
                invocation.flags.push(STRIP_TYPES_FLAG);
            }
            version => debug!("node {:?} cannot strip types, relying on sucrase", version),
        }
        invocation
    }
}

fn is_typescript(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "ts" | "mts" | "cts"))
}

fn node_version(node: &Path) -> Option<(u32, u32)> {
    let output = Command::new(node).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_node_version(&String::from_utf8_lossy(&output.stdout))
}

/// `v22.7.0` -> `(22, 7)`
fn parse_node_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Default script evaluator; `node` is looked up on first use
#[derive(Debug, Clone, Default)]
pub struct NodeEvaluator {
    node: Option<PathBuf>,
}

impl NodeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit `node` binary instead of searching `PATH`
    pub fn with_node(node: impl Into<PathBuf>) -> Self {
        NodeEvaluator {
            node: Some(node.into()),
        }
    }

    fn node_binary(&self) -> Result<PathBuf, ConfigError> {
        if let Some(node) = &self.node {
            return Ok(node.clone());
        }
        if let Some(node) = env::var_os(NODE_BINARY_ENV) {
            return Ok(PathBuf::from(node));
        }
        which::which("node").map_err(|err| {
            ConfigError::EvaluatorUnavailable(format!(
                "node is required to evaluate script configs ({})",
                err
            ))
        })
    }
}

impl ScriptEvaluator for NodeEvaluator {
    fn load(&self, path: &Path) -> Result<DynamicExport, ConfigError> {
        let invocation = NodeInvocation::for_file(self.node_binary()?, path);
        match run_bootstrap(&invocation, path, Mode::Inspect, None)? {
            BootstrapResult::Value { data } => Ok(DynamicExport::Value(data)),
            BootstrapResult::Function => Ok(DynamicExport::Function(Box::new(NodeConfigFunction {
                invocation,
                path: path.to_path_buf(),
            }))),
            BootstrapResult::Pending => Err(pending_export(path)),
            BootstrapResult::Unavailable { message } => Err(ConfigError::EvaluatorUnavailable(message)),
            BootstrapResult::Error {
                message,
                line,
                column,
            } => Err(evaluation_error(path, message, line, column)),
        }
    }
}

struct NodeConfigFunction {
    invocation: NodeInvocation,
    path: PathBuf,
}

impl ConfigFunction for NodeConfigFunction {
    fn call(&self, ctx: &ConfigContext) -> Result<Evaluated, ConfigError> {
        let input = serde_json::to_string(ctx).map_err(|err| {
            ConfigError::InvalidConfig(format!("Cannot serialize config context: {}", err))
        })?;
        match run_bootstrap(&self.invocation, &self.path, Mode::Call, Some(&input))? {
            BootstrapResult::Value { data } => Ok(Evaluated::Ready(data)),
            BootstrapResult::Pending => Ok(Evaluated::Pending),
            BootstrapResult::Unavailable { message } => Err(ConfigError::EvaluatorUnavailable(message)),
            BootstrapResult::Function => Err(ConfigError::InvalidConfig(format!(
                "Config function in {} returned another function",
                self.path.display()
            ))),
            BootstrapResult::Error {
                message,
                line,
                column,
            } => Err(evaluation_error(&self.path, message, line, column)),
        }
    }
}

fn run_bootstrap(
    invocation: &NodeInvocation,
    path: &Path,
    mode: Mode,
    input: Option<&str>,
) -> Result<BootstrapResult, ConfigError> {
    trace!("Running {} bootstrap for {}", mode.as_str(), path.display());
    let node = &invocation.node;
    let mut command = Command::new(node);
    command
        .args(&invocation.flags)
        .arg("-e")
        .arg(BOOTSTRAP)
        .env("MODKIT_CONFIG_FILE", path)
        .env("MODKIT_EVAL_MODE", mode.as_str())
        .env("MODKIT_STRIP_TYPES", if invocation.strip_types { "1" } else { "0" })
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = path.parent() {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|err| {
        ConfigError::EvaluatorUnavailable(format!("Failed to spawn {}: {}", node.display(), err))
    })?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.unwrap_or_default().as_bytes())?;
    }
    let output = child.wait_with_output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let Some(line) = stdout
        .rfind(RESULT_MARKER)
        .map(|idx| stdout[idx + RESULT_MARKER.len()..].lines().next().unwrap_or_default())
    else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConfigError::Evaluation {
            path: path.to_path_buf(),
            message: format!("node exited with {} and no result: {}", output.status, stderr.trim()),
            code_frame: None,
        });
    };

    debug!("Bootstrap {} finished with {}", mode.as_str(), output.status);
    serde_json::from_str(line).map_err(|err| ConfigError::Evaluation {
        path: path.to_path_buf(),
        message: format!("Unreadable evaluator output: {}", err),
        code_frame: None,
    })
}

fn pending_export(path: &Path) -> ConfigError {
    ConfigError::InvalidConfig(format!(
        "Config file {} cannot export a Promise",
        path.display()
    ))
}

fn evaluation_error(path: &Path, message: String, line: Option<usize>, column: Option<usize>) -> ConfigError {
    let code_frame = line.and_then(|line| {
        let source = fs::read_to_string(path).ok()?;
        code_frame(&source, line, column)
    });
    ConfigError::Evaluation {
        path: path.to_path_buf(),
        message,
        code_frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_result_parsing() {
        let value: Result<BootstrapResult, _> = serde_json::from_str(r#"{"kind":"value","data":{"name":"x"}}"#);
        assert!(matches!(value, Ok(BootstrapResult::Value { ref data }) if data["name"] == "x"));

        let error: Result<BootstrapResult, _> =
            serde_json::from_str(r#"{"kind":"error","message":"Unexpected token","line":2,"column":null}"#);
        assert!(matches!(error, Ok(BootstrapResult::Error { line: Some(2), column: None, .. })));
    }

    #[test]
    fn test_evaluation_error_renders_frame_from_source() {
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let path = tmp.path().join("app.config.js");
        let _ = fs::write(&path, "module.exports = {\n  name: ,\n};\n");

        let err = evaluation_error(&path, "Unexpected token ','".to_string(), Some(2), Some(9));
        assert_eq!(err.code(), "EVALUATION_ERROR");
        let message = err.to_string();
        assert!(message.contains("> 2 |   name: ,"));
        assert!(message.contains('^'));
    }

    #[test]
    fn test_parse_node_version() {
        assert_eq!(parse_node_version("v20.20.2\n"), Some((20, 20)));
        assert_eq!(parse_node_version("v22.7.0"), Some((22, 7)));
        assert_eq!(parse_node_version("garbage"), None);
        assert!(parse_node_version("v22.6.0").is_some_and(|v| v < STRIP_TYPES_SINCE));
    }

    #[test]
    fn test_only_typescript_configs_need_a_transpiler() {
        assert!(is_typescript(Path::new("app.config.ts")));
        assert!(is_typescript(Path::new("app.config.mts")));
        assert!(!is_typescript(Path::new("app.config.js")));

        let invocation = NodeInvocation::for_file(PathBuf::from("/definitely/not/node"), Path::new("app.config.js"));
        assert!(invocation.flags.is_empty());
        assert!(!invocation.strip_types);
    }

    #[test]
    fn test_typescript_config_evaluates_or_names_the_transpiler() {
        let Ok(node) = which::which("node") else {
            return;
        };
        let Ok(tmp) = TempDir::new() else {
            return;
        };
        let path = tmp.path().join("app.config.ts");
        if fs::write(&path, "const config: { name: string } = { name: \"ts\" };\nexport default config;\n").is_err() {
            return;
        }

        match NodeEvaluator::with_node(node).load(&path) {
            Ok(DynamicExport::Value(data)) => assert_eq!(data["name"], "ts"),
            Ok(DynamicExport::Function(_)) => assert!(false, "config exports an object"),
            Err(err) => {
                assert_eq!(err.code(), "EVALUATOR_UNAVAILABLE");
                assert!(err.to_string().contains("sucrase"));
            }
        }
    }

    #[test]
    fn test_missing_node_binary_is_reported() {
        let evaluator = NodeEvaluator::with_node("/definitely/not/node");
        let result = evaluator.load(Path::new("/tmp/app.config.js"));
        assert!(result.is_err_and(|e| e.code() == "EVALUATOR_UNAVAILABLE"));
    }
}
