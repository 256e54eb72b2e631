//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.voiceplan/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given directory
    ///
    /// # Arguments
    /// * `root` - Where to look for `.voiceplan/prompts/` and `prompts/`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let user_dir = root.join(".voiceplan/prompts");
        let repo_dir = root.join("prompts");

        Self {
            hbs: Handlebars::new(),
            user_dir: if user_dir.exists() { Some(user_dir) } else { None },
            repo_dir: if repo_dir.exists() { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self {
            hbs: Handlebars::new(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.voiceplan/prompts/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        // Try user override first
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from user override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        // Try repo default
        if let Some(ref repo_dir) = self.repo_dir {
            let path = repo_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from repo: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read repo prompt {}: {}", path.display(), e));
            }
        }

        // Fall back to embedded
        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        debug!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
