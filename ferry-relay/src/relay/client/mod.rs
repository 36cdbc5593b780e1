pub mod select;
pub mod traits;
pub mod types;

pub use select::SelectClient;
pub use traits::{Client, Transport};
pub use types::*;
