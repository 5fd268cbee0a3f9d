//! Diagnostic message model: levels, message kinds, messages and collections.

pub mod catalog;
mod level;
mod message;
mod messages;
pub mod template;

pub use catalog::{CatalogError, MessageBase, MessageCatalog, MessageDefinition, DEFAULT_DOC_PREFIX};
pub use level::{Level, ParseLevelError};
pub use message::{Message, StructuredMessage};
pub use messages::Messages;
pub use template::Param;
