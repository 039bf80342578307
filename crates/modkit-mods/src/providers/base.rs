use super::{read_artifact, settle_read, settle_write, validate_shape};
use crate::adapters::ErasedAdapter;
use crate::kinds::ArtifactKind;
use modkit_core::{ModAction, ModContext, ModError};
use std::sync::Arc;
use tracing::debug;

/// Read, run the chain, validate, write
pub struct BaseModProvider {
    kind: ArtifactKind,
    adapter: Arc<dyn ErasedAdapter>,
}

impl BaseModProvider {
    pub fn new(kind: ArtifactKind, adapter: Arc<dyn ErasedAdapter>) -> Self {
        BaseModProvider { kind, adapter }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

impl ModAction for BaseModProvider {
    fn run(&self, mut ctx: ModContext) -> Result<ModContext, ModError> {
        let request = &ctx.mod_request;
        let outcome = read_artifact(
            self.kind,
            self.adapter.as_ref(),
            &request.platform_project_root,
            request.project_name.as_deref(),
        );
        let Some(loaded) = settle_read(self.kind, self.adapter.as_ref(), request, outcome)? else {
            debug!("Skipping {}: nothing to hand to the chain", self.kind);
            return Ok(ctx);
        };

        ctx.mod_results = Some(loaded.results);
        let mut ctx = ctx.forward()?;
        validate_shape(self.kind, &ctx.config)?;

        let Some(results) = ctx.take_results() else {
            return Err(ModError::MissingModResults {
                platform: self.kind.platform(),
                mod_name: self.kind.mod_name().to_string(),
                expected: self.adapter.document_type(),
            });
        };

        if ctx.mod_request.introspect {
            debug!("Introspecting {}, not writing", self.kind);
        } else if let Some(path) = &loaded.path {
            let outcome = self.adapter.write(path, &results);
            settle_write(self.kind, &ctx.mod_request, path, outcome)?;
        }
        ctx.mod_results = Some(results);
        Ok(ctx)
    }
}

/// Provider for keys that own no file: runs the chain and checks its shape
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArtifactProvider;

impl ModAction for NoArtifactProvider {
    fn run(&self, ctx: ModContext) -> Result<ModContext, ModError> {
        let platform = ctx.mod_request.platform;
        let mod_name = ctx.mod_request.mod_name.clone();
        let ctx = ctx.forward()?;
        if ctx.config.has_mods() {
            Ok(ctx)
        } else {
            Err(ModError::InvalidModResult { platform, mod_name })
        }
    }
}
