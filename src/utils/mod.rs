pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::truncate_for_display;
pub use url_utils::{normalize_target_url, percent_encode_query, resolve_href};
