pub mod enums;
pub mod metadata;
pub mod payload;
pub mod result;

pub use enums::*;
pub use metadata::*;
pub use payload::*;
pub use result::*;
