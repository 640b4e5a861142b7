pub use self::error::ParseRequestError;
pub use self::method::{Method, MethodError};
pub use self::request::Request;
pub use self::response::Response;
pub use self::response_builder::{MissingStatusCode, ResponseBuilder};
pub use self::status_code::StatusCode;

mod error;
mod method;
mod request;
mod response;
mod response_builder;
mod status_code;
