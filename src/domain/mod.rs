pub mod area;
pub mod prediction;
pub mod sources;
pub mod table;
pub mod time;

pub use area::*;
pub use prediction::*;
pub use sources::*;
pub use table::*;
