//! Template selection, lookup, rule extraction and content injection.

pub mod defaults;
pub mod extract;
pub mod inject;
pub mod selector;
pub mod store;

pub use extract::{ExtractedInfo, extract_info_by_rules};
pub use inject::{NOT_APPLICABLE, apply_rules_to_template, merge_generated_content};
pub use selector::TemplateSelector;
pub use store::TemplateStore;
