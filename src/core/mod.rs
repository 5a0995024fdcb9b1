pub mod assembler;
pub mod compression;
pub mod constants;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod format;
pub mod locator;
pub mod reader;
