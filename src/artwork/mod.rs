pub mod collection;
pub mod types;

pub use collection::normalize;
pub use types::{Artwork, ArtworkStats};
