//! Mutation strategies: 32-bit instruction-level, 16-bit compressed,
//! and the top-level stream driver that picks sites between them.

pub mod compressed;
pub mod instruction;
pub mod stream;

pub use stream::mutate_stream;
