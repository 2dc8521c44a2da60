//! Reading and writing delimited text.

mod reader;
mod writer;

pub use reader::{Parser, ParserConfig, detect_delimiter, is_null_token};
pub use writer::{to_delimited_string, to_json, write_delimited, write_file};
