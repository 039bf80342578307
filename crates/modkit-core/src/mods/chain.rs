//! Explicit linked chain of mod actions for one `(platform, mod)` key
//!
//! Every registration wraps the chain that was registered before it: the new
//! link becomes the head and keeps the previous head as `next`. When a link is
//! invoked, its `next` is handed to the action through `ModRequest::next_mod`,
//! and the action decides whether (and when) to forward.

use super::request::ModContext;
use crate::errors::ModError;
use std::fmt;
use std::sync::Arc;

/// A single transformation step in a mod chain
pub trait ModAction: Send + Sync {
    fn run(&self, ctx: ModContext) -> Result<ModContext, ModError>;
}

impl<F> ModAction for F
where
    F: Fn(ModContext) -> Result<ModContext, ModError> + Send + Sync,
{
    fn run(&self, ctx: ModContext) -> Result<ModContext, ModError> {
        self(ctx)
    }
}

struct ModLink {
    action: Arc<dyn ModAction>,
    label: Option<String>,
    is_provider: bool,
    next: Option<ModChain>,
}

/// Head of a composed chain; cheap to clone
#[derive(Clone)]
pub struct ModChain(Arc<ModLink>);

impl ModChain {
    /// Put `action` in front of `next`
    pub fn wrap(
        action: Arc<dyn ModAction>,
        label: Option<String>,
        is_provider: bool,
        next: Option<ModChain>,
    ) -> Self {
        ModChain(Arc::new(ModLink {
            action,
            label,
            is_provider,
            next,
        }))
    }

    /// Run the head action with `next_mod` pointing at the rest of the chain
    pub fn invoke(&self, mut ctx: ModContext) -> Result<ModContext, ModError> {
        ctx.mod_request.next_mod = self.0.next.clone();
        self.0.action.run(ctx)
    }

    pub fn next(&self) -> Option<&ModChain> {
        self.0.next.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.0.label.as_deref()
    }

    pub fn is_provider(&self) -> bool {
        self.0.is_provider
    }

    /// Number of links, head included
    pub fn depth(&self) -> usize {
        let mut count = 0;
        let mut current = Some(self);
        while let Some(link) = current {
            count += 1;
            current = link.next();
        }
        count
    }

    /// Labels from the outermost link (runs first) to the innermost
    pub fn labels(&self) -> Vec<Option<&str>> {
        let mut labels = Vec::new();
        let mut current = Some(self);
        while let Some(link) = current {
            labels.push(link.label());
            current = link.next();
        }
        labels
    }
}

impl fmt::Debug for ModChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModChain")
            .field("labels", &self.labels())
            .field("is_provider", &self.is_provider())
            .finish()
    }
}
