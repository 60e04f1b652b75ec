pub mod path_utils;
pub mod json_utils;
pub mod header_utils;

pub use path_utils::PathUtils;
pub use json_utils::JsonUtils;
pub use header_utils::HeaderUtils;
