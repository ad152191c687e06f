pub mod batch;
pub mod operations;
pub mod status;

// Re-export commonly used items
pub use batch::*;
pub use operations::*;
pub use status::*;
