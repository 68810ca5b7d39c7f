pub mod config;
pub mod lang;
pub mod synthdef;
pub mod timer;
pub mod types;

pub use config::*;
pub use lang::*;
pub use synthdef::*;
pub use timer::*;
pub use types::*;
