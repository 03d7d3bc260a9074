mod value;
mod metadata;

pub use value::*;
pub use metadata::*;
