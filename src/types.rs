mod actinia_url;
mod enums;
/// Primitive actinia API data types and NewType-patterns.
mod strings;

pub use actinia_url::*;
pub use enums::*;
pub use strings::*;
