//! Prompt Loader
//!
//! Loads reply templates from an override directory or falls back to the
//! embedded copies.

use std::path::PathBuf;

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::OperatingMode;
use crate::workload::MemberLoad;

/// Values available to every reply template
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplyContext {
    /// Number of tasks the reply talks about
    pub count: usize,
    /// "s" when count is not 1
    pub plural: &'static str,
    /// Numbered task lines, already joined
    pub task_list: String,
    /// Current mode label ("Solo" / "Team")
    pub mode: String,
    /// Mode a switch would move to
    pub target_mode: String,
    pub is_team_task: bool,
    pub is_solo_task: bool,
    pub members: Vec<MemberLoad>,
}

impl ReplyContext {
    /// Context for a reply that lists tasks
    pub fn for_tasks(lines: &[String], mode: OperatingMode) -> Self {
        debug!(count = lines.len(), %mode, "ReplyContext::for_tasks: called");
        Self {
            task_list: lines.join("\n   "),
            ..Self::for_count(lines.len(), mode)
        }
    }

    /// Context for a reply that only reports a count
    pub fn for_count(count: usize, mode: OperatingMode) -> Self {
        Self {
            count,
            plural: if count == 1 { "" } else { "s" },
            mode: mode.label().to_string(),
            target_mode: mode.label().to_string(),
            ..Default::default()
        }
    }

    pub fn for_workload(members: Vec<MemberLoad>) -> Self {
        Self {
            count: members.len(),
            members,
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: OperatingMode) -> Self {
        self.target_mode = target.label().to_string();
        self
    }

    pub fn with_signals(mut self, is_team_task: bool, is_solo_task: bool) -> Self {
        self.is_team_task = is_team_task;
        self.is_solo_task = is_solo_task;
        self
    }
}

/// Loads and renders reply templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (from `prompts.dir`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `user_dir` before the embedded templates
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        debug!(?user_dir, "PromptLoader::new: called");
        let user_dir = user_dir.filter(|dir| {
            let exists = dir.exists();
            if !exists {
                debug!(?dir, "PromptLoader::new: override directory missing, ignoring");
            }
            exists
        });

        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs, user_dir }
    }

    /// Create a loader that only uses embedded templates
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self::new(None)
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{user_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &ReplyContext) -> Result<String> {
        debug!(%template_name, count = context.count, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        let rendered = self
            .hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))?;
        Ok(rendered.trim_end().to_string())
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
