pub mod tools;

pub use self::tools::{core_dependency_versions, show_rust_core_dependencies};
