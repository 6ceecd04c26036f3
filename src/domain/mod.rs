pub mod records;
pub mod scenario;
pub mod trajectory;
pub mod types;

pub use records::*;
pub use scenario::*;
pub use trajectory::*;
pub use types::*;
