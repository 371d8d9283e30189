pub mod parser;
pub mod scanner;
pub mod source;
pub mod token;
pub mod token_dumper;
