//! HTTP protocol layer module
//!
//! Response builders shared by handlers and the hosting runtime.

pub mod response;

pub use response::{
    build_413_response, build_500_response, build_html_response, build_json_response,
};
