mod error;
mod parser;
mod table;
pub use error::*;
pub use parser::*;
pub use table::*;
