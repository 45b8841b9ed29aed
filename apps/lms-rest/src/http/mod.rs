pub mod envelope;
pub mod params;

pub use envelope::{success, success_msg};
pub use params::required;
