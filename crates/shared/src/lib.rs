mod error;
mod reply;
mod submission;

pub use error::*;
pub use reply::*;
pub use submission::*;
