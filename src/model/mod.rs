//! Pure data structures moved between the store and the actors.

pub mod actor;
pub mod product;
pub mod stolen;

pub use actor::*;
pub use product::*;
pub use stolen::*;
