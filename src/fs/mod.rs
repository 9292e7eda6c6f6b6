//! FileSystem abstraction so detection can run against real checkouts or in-memory trees

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{DirEntry, FileSystem};
pub use real::RealFileSystem;
