mod association;
mod entity;
mod field;
mod schema;
mod storage;

pub use association::*;
pub use entity::*;
pub use field::*;
pub use schema::*;
pub use storage::*;
