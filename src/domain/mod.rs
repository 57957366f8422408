pub mod json_ld;
pub mod keyword;
pub mod profile;
pub mod search_result;

/// Written in place of any field the page does not provide.
pub const NOT_AVAILABLE: &str = "n/a";
