//! Schema model: tables, columns and relationships

mod data_map;
mod entity;
mod relationship;
mod types;

pub use data_map::DataMap;
pub use entity::{DbAttribute, DbEntity};
pub use relationship::{DbJoin, DbRelationship};
pub use types::SqlType;
