pub mod error;
pub mod names;
pub mod types;
pub mod value;

pub use error::{DialogueError, ErrorKind};
pub use names::*;
pub use types::*;
pub use value::*;
