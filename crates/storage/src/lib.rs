mod error;
pub mod memory;
mod record;
mod traits;
pub mod ulid;

pub use error::StoreError;
pub use memory::{MemoryLabDirectory, MemoryResultStore};
pub use record::{Lab, LabParams, LabResult, NewResult, ResultFilter};
pub use traits::{LabDirectory, ResultStore};
