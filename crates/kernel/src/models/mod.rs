//! Content records and typed section/block views.

pub mod block;
pub mod record;
pub mod section;

pub use block::Block;
pub use record::{ContentRecord, CreateRecord, RecordKind, UpdateRecord};
pub use section::Section;

/// Metadata keys stored per record.
pub mod meta {
    /// Section layout template identifier.
    pub const TEMPLATE: &str = "template";
    /// Free-form CSS class applied to the section wrapper.
    pub const CSS_CLASS: &str = "css_class";
    /// Grid offset for the section.
    pub const OFFSET: &str = "offset";
    /// Whether the section title is rendered ("1" to show).
    pub const TITLE_DISPLAY: &str = "title_display";
    /// Push/pull column ordering flag.
    pub const PUSH_PULL: &str = "push_pull";
    /// Background image reference (media library UUID).
    pub const BACKGROUND_IMAGE: &str = "background_image";
    /// Block column-width weight within the grid.
    pub const WEIGHT: &str = "weight";
}
