//! Administrative hierarchy resolution for located places.

mod lookup;
mod resolver;

pub use lookup::PlaceLookup;
pub use resolver::{parse_timezone, resolve};
