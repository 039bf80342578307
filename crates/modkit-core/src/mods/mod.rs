//! Mod registry and interceptor
//!
//! `register_mod` never replaces an existing chain: it wraps it. The most
//! recently registered action is the head of the chain and runs first; it
//! receives the previous head as `next_mod` and decides whether to forward.
//!
//! Sharp edge kept on purpose: an action that never calls
//! [`ModContext::forward`] silently skips every action registered before it
//! for the same key. Plugins rely on this to no-op a mod.

mod chain;
mod registry;
mod request;
mod results;

pub use chain::{ModAction, ModChain};
pub use registry::{ModEntry, ModRegistry};
pub use request::{downcast_results_mut, ModContext, ModRequest};
pub use results::ModResults;

use crate::config::AppConfig;
use crate::errors::ModError;
use crate::platform::Platform;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

/// Wrap `action` around whatever is registered for `(platform, mod_name)`
pub fn register_mod<F>(config: AppConfig, platform: Platform, mod_name: &str, action: F) -> AppConfig
where
    F: Fn(ModContext) -> Result<ModContext, ModError> + Send + Sync + 'static,
{
    register_action(config, platform, mod_name, Arc::new(action), None, false)
}

/// Wrap any [`ModAction`] implementation, not just a closure
pub fn with_mod<A>(config: AppConfig, platform: Platform, mod_name: &str, action: A) -> AppConfig
where
    A: ModAction + 'static,
{
    register_action(config, platform, mod_name, Arc::new(action), None, false)
}

/// Same as [`register_mod`], with a label that shows up in chain inspection
pub fn register_named_mod<F>(
    config: AppConfig,
    platform: Platform,
    mod_name: &str,
    label: impl Into<String>,
    action: F,
) -> AppConfig
where
    F: Fn(ModContext) -> Result<ModContext, ModError> + Send + Sync + 'static,
{
    register_action(
        config,
        platform,
        mod_name,
        Arc::new(action),
        Some(label.into()),
        false,
    )
}

/// Register a base provider: the link that owns reading and writing the artifact
pub fn register_provider(
    config: AppConfig,
    platform: Platform,
    mod_name: &str,
    label: impl Into<String>,
    action: Arc<dyn ModAction>,
) -> AppConfig {
    register_action(config, platform, mod_name, action, Some(label.into()), true)
}

fn register_action(
    mut config: AppConfig,
    platform: Platform,
    mod_name: &str,
    action: Arc<dyn ModAction>,
    label: Option<String>,
    is_provider: bool,
) -> AppConfig {
    let registry = config.mods_mut();
    let previous = registry.get(platform, mod_name).cloned();
    trace!(
        "Registering mod {}.{} ({} existing links)",
        platform,
        mod_name,
        previous.as_ref().map_or(0, ModChain::depth)
    );
    let chain = ModChain::wrap(action, label, is_provider, previous);
    registry.insert(platform, mod_name, chain);
    config
}

/// Register an action that edits the typed modResults and then forwards
///
/// This is the shape ordinary plugins use: the action never touches the
/// request plumbing, forwarding to `next_mod` happens automatically once it
/// returns `Ok`.
pub fn with_extended_mod<T, F>(
    config: AppConfig,
    platform: Platform,
    mod_name: &str,
    action: F,
) -> AppConfig
where
    T: Any + Send,
    F: Fn(&mut AppConfig, &mut T, &ModRequest) -> Result<(), ModError> + Send + Sync + 'static,
{
    register_mod(config, platform, mod_name, move |mut ctx: ModContext| {
        {
            let ModContext {
                config,
                mod_results,
                mod_request,
            } = &mut ctx;
            let results = downcast_results_mut::<T>(mod_results, mod_request)?;
            action(config, results, mod_request)?;
        }
        ctx.forward()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::Path;

    fn push_trace(config: &mut AppConfig, step: &str) {
        let trace = config
            .fields_mut()
            .entry("trace".to_string())
            .or_insert_with(|| json!([]));
        if let Value::Array(items) = trace {
            items.push(json!(step));
        }
    }

    fn tracing_mod(config: AppConfig, step: &'static str, forward: bool) -> AppConfig {
        register_named_mod(config, Platform::Android, "strings", step, move |mut ctx| {
            push_trace(&mut ctx.config, step);
            if forward {
                ctx.forward()
            } else {
                Ok(ctx)
            }
        })
    }

    fn run(config: &AppConfig) -> Option<Value> {
        let chain = config.mods()?.get(Platform::Android, "strings")?.clone();
        let request = ModRequest::new(Path::new("/tmp/app"), Platform::Android, "strings");
        let ctx = chain.invoke(ModContext::new(config.clone(), request)).ok()?;
        ctx.config.get("trace").cloned()
    }

    #[test]
    fn test_last_registered_runs_first() {
        let config = tracing_mod(AppConfig::new(), "first", true);
        let config = tracing_mod(config, "second", true);
        let config = tracing_mod(config, "third", true);

        assert_eq!(run(&config), Some(json!(["third", "second", "first"])));
    }

    #[test]
    fn test_registration_wraps_instead_of_replacing() {
        let config = tracing_mod(AppConfig::new(), "first", true);
        let config = tracing_mod(config, "second", true);

        let Some(registry) = config.mods() else {
            assert!(false, "registry should exist after registration");
            return;
        };
        assert_eq!(registry.len(), 1);
        let chain = registry.get(Platform::Android, "strings");
        assert!(chain.is_some_and(|c| c.labels() == vec![Some("second"), Some("first")]));
    }

    struct Marker(&'static str);

    impl ModAction for Marker {
        fn run(&self, mut ctx: ModContext) -> Result<ModContext, ModError> {
            push_trace(&mut ctx.config, self.0);
            ctx.forward()
        }
    }

    #[test]
    fn test_with_mod_accepts_action_objects() {
        let config = tracing_mod(AppConfig::new(), "closure", true);
        let config = with_mod(config, Platform::Android, "strings", Marker("object"));
        assert_eq!(run(&config), Some(json!(["object", "closure"])));
    }

    #[test]
    fn test_mod_without_forward_skips_earlier_registrations() {
        let config = tracing_mod(AppConfig::new(), "earlier", true);
        let config = tracing_mod(config, "terminal", false);

        assert_eq!(run(&config), Some(json!(["terminal"])));
    }

    #[test]
    fn test_single_mod_forwards_to_identity() {
        let config = tracing_mod(AppConfig::new(), "only", true);
        assert_eq!(run(&config), Some(json!(["only"])));
    }

    #[test]
    fn test_extended_mod_edits_typed_results_then_forwards() {
        let config = with_extended_mod(
            AppConfig::new(),
            Platform::Ios,
            "podfileProperties",
            |_config, props: &mut Vec<String>, _request| {
                props.push("inner".to_string());
                Ok(())
            },
        );
        let config = with_extended_mod(
            config,
            Platform::Ios,
            "podfileProperties",
            |config, props: &mut Vec<String>, request| {
                props.push("outer".to_string());
                config.set("touched", request.key());
                Ok(())
            },
        );

        let Some(chain) = config
            .mods()
            .and_then(|m| m.get(Platform::Ios, "podfileProperties"))
            .cloned()
        else {
            assert!(false, "chain should be registered");
            return;
        };
        let request = ModRequest::new(Path::new("/tmp/app"), Platform::Ios, "podfileProperties");
        let ctx = ModContext::new(config, request).with_results(ModResults::new(Vec::<String>::new()));
        let Ok(mut ctx) = chain.invoke(ctx) else {
            assert!(false, "chain should succeed");
            return;
        };

        assert_eq!(ctx.config.get_str("touched"), Some("ios.podfileProperties"));
        let props = ctx.results_mut::<Vec<String>>();
        assert!(props.is_ok_and(|p| p == &vec!["outer".to_string(), "inner".to_string()]));
    }

    #[test]
    fn test_extended_mod_reports_missing_results_with_key() {
        let config = with_extended_mod(
            AppConfig::new(),
            Platform::Android,
            "gradleProperties",
            |_config, _props: &mut Vec<String>, _request| Ok(()),
        );
        let Some(chain) = config
            .mods()
            .and_then(|m| m.get(Platform::Android, "gradleProperties"))
            .cloned()
        else {
            return;
        };
        let request = ModRequest::new(Path::new("/tmp/app"), Platform::Android, "gradleProperties");
        let result = chain.invoke(ModContext::new(AppConfig::new(), request));
        assert!(matches!(
            result,
            Err(ModError::MissingModResults { platform: Platform::Android, ref mod_name, .. })
                if mod_name == "gradleProperties"
        ));
    }
}
