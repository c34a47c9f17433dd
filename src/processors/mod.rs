//! Document processors

pub mod tree;
pub mod walker;
pub mod xml;
