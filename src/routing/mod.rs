pub mod discovery;
pub mod error;
pub mod path;
pub mod request;
pub mod router;
pub mod settlement;
pub mod validation;
