//! Schema-driven RISC-V instruction mutator for AFL++ custom-mutator
//! fuzzing.
//!
//! Instead of flipping bytes blindly, this mutator loads a layered
//! YAML description of an ISA (fields, formats, instructions), decodes
//! 16- and 32-bit instruction sites in a byte buffer, and rewrites
//! fields with a bit-accurate codec so mutated output stays close to
//! the legal encoding space the target actually parses.

pub mod abi;
pub mod bitio;
pub mod codec;
pub mod config;
pub mod error;
pub mod feedback;
pub mod legality;
pub mod log;
pub mod mutate;
pub mod prng;
pub mod schema;
pub mod session;

pub use config::Config;
pub use error::{MutatorError, Result};
pub use schema::{load_isa_config, IsaConfig};
pub use session::Session;
