mod core;
pub use core::{Message, Role, completion_stream};
