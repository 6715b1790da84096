pub mod core;
pub mod txt;

pub use crate::core::task::{Priority, Task};
pub use crate::txt::parser::TodoParser;
pub use crate::txt::writer::TodoWriter;
