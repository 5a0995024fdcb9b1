pub mod csv;
pub mod metadata;
pub mod template;
pub mod writer;
