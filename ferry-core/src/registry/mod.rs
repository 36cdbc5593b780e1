pub mod memory;
pub mod traits;
pub mod types;

pub use memory::MemoryRegistry;
pub use traits::Discovery;
pub use types::{flatten_nodes, Node, Service};
