//! Standard pipeline stages.

mod associations;
mod dynamic_type;
mod enum_filter;
mod hidden;
mod json;

pub use associations::{AssociationConfigDecorator, LoadAssociationsDecorator};
pub use dynamic_type::DynamicTypeDecorator;
pub use enum_filter::EnumFilterDecorator;
pub use hidden::HiddenFieldDecorator;
pub use json::JsonDecorator;
