//! Descriptor and storage fixtures: the wire types of `descriptors/`, the
//! ORM code generated for them at build time, and an in-memory database
//! the generated operations run against.

pub mod memory;
pub mod shop;

#[cfg(test)]
mod tests;
