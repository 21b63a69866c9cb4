//! Checklist template source.
//!
//! Checklist content is static data owned by the site; the core only
//! needs an ordered list of templates per shift to seed new sessions.

use shifthub_core::config::templates::TemplateConfig;
use shifthub_core::types::ShiftName;
use shifthub_entity::checklist::{AuxiliaryItem, Task};

/// Provider of per-shift static checklist templates.
pub trait TemplateSource: Send + Sync + 'static {
    /// Fresh, unworked tasks for a shift, in template order.
    fn tasks_for(&self, shift: &ShiftName) -> Vec<Task>;

    /// Fresh auxiliary checklist items for a shift, in template order.
    fn auxiliary_for(&self, shift: &ShiftName) -> Vec<AuxiliaryItem>;
}

/// [`TemplateSource`] backed by the static template configuration.
#[derive(Debug, Clone)]
pub struct StaticTemplates {
    config: TemplateConfig,
}

impl StaticTemplates {
    /// Create a source over the given template configuration.
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }
}

impl Default for StaticTemplates {
    fn default() -> Self {
        Self::new(TemplateConfig::default())
    }
}

impl TemplateSource for StaticTemplates {
    fn tasks_for(&self, shift: &ShiftName) -> Vec<Task> {
        self.config
            .tasks_for(shift)
            .iter()
            .map(|t| Task::from_template(t.id, t.text.clone(), t.info.clone()))
            .collect()
    }

    fn auxiliary_for(&self, shift: &ShiftName) -> Vec<AuxiliaryItem> {
        self.config
            .auxiliary_for(shift)
            .iter()
            .map(|t| AuxiliaryItem::from_template(t.id, t.text.clone()))
            .collect()
    }
}
