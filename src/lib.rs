pub mod bits;
pub mod compiler;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod output;
pub mod preprocess;
pub mod symbols;
pub mod tables;

pub use compiler::{compile, Compiled, CompiledEntry, Outcome};
pub use error::{DecodeError, Diagnostic, EncodeError, StructuralError};
pub use symbols::SymbolTable;
