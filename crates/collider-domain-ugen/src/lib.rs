pub mod context;
pub mod error;
pub mod ops;
pub mod params;
pub mod registry;
mod specs;
pub mod synthdef;
pub mod ugen;
pub mod value;

pub use context::*;
pub use error::*;
pub use ops::*;
pub use params::*;
pub use registry::*;
pub use synthdef::*;
pub use ugen::*;
pub use value::*;
