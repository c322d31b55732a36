pub mod http_util;
pub mod string_util;
