//! Application state for the onboarding API

use std::path::PathBuf;

use onboarding_forms::{
    DatePolicy, EngineConfig, FieldRegistry, FormError, OverlayEngine, TemplateStore,
};
use tracing::info;

/// Startup settings resolved from the command line and environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub template_dir: PathBuf,
    pub allow_date_fallback: bool,
    pub write_blank_templates: bool,
}

pub struct AppState {
    pub templates: TemplateStore,
    pub engine_config: EngineConfig,
}

impl AppState {
    /// Validate the field registry and every template. Any failure here is a
    /// configuration problem and must stop startup.
    pub fn new(config: &ServerConfig) -> Result<Self, FormError> {
        let registry = Self::registry();
        registry.validate()?;
        info!(fields = registry.len(), "Field registry validated");

        let templates = TemplateStore::new(&config.template_dir);
        if config.write_blank_templates {
            let written = templates.write_missing_blank(registry)?;
            if !written.is_empty() {
                info!(count = written.len(), "Blank templates written");
            }
        }
        templates.verify(registry)?;

        let date_policy = if config.allow_date_fallback {
            DatePolicy::FallbackToToday
        } else {
            DatePolicy::Reject
        };
        info!(
            templates = %templates.dir().display(),
            ?date_policy,
            "Onboarding forms ready"
        );

        Ok(Self {
            templates,
            engine_config: EngineConfig {
                date_policy,
                ..EngineConfig::default()
            },
        })
    }

    pub fn registry() -> &'static FieldRegistry {
        FieldRegistry::standard()
    }

    pub fn engine(&self) -> OverlayEngine<'static> {
        OverlayEngine::new(Self::registry(), self.engine_config.clone())
    }
}
