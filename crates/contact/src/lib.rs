mod controller;
mod transport;
mod types;

pub use controller::*;
pub use transport::*;
pub use types::*;
