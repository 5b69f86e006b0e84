pub mod analyzers;
pub mod error;
pub mod filter;
pub mod output;
pub mod records;
pub mod source;
pub mod validate;
