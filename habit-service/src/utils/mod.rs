pub mod json;

pub use self::json::JsonBody;
