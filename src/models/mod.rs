pub mod explanation;
pub mod priority;
pub mod ticket;

pub use explanation::*;
pub use priority::*;
pub use ticket::*;
