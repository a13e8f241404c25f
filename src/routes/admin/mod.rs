///
/// These are endpoints that are used internally by support staff.
///
pub mod config;
