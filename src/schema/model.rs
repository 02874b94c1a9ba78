//! In-memory ISA schema model.
//!
//! These types are pure data with accessors; the only way to build a
//! populated [`IsaConfig`] is through [`crate::schema::loader::load_isa_config`]
//! (or, in tests, by constructing one directly).

use std::collections::HashMap;

/// Dense index into [`IsaConfig::fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

/// Dense index into [`IsaConfig::formats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(pub u32);

/// One physical, contiguous slice of an instruction word contributing
/// bits to a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSegment {
    /// Bit position in the instruction word.
    pub word_lsb: u32,
    /// Number of bits in this segment.
    pub width: u32,
    /// Bit position in the logical field value.
    pub value_lsb: u32,
}

/// A named, possibly discontiguous set of bits with a logical value.
///
/// `width <= 32` is enforced by the loader at validation time.
/// Segment widths need not sum to `width`: an immediate with an
/// implicit always-zero low bit (RV32's B/J-type branch/jump offsets)
/// stores fewer bits than its logical width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEncoding {
    /// Field name, e.g. `"opcode"`.
    pub name: String,
    /// Width of the reconstructed logical value, in bits.
    pub width: u32,
    /// Whether the value should be interpreted as two's-complement
    /// signed when used arithmetically (immediates).
    pub signed: bool,
    /// Ordered list of physical segments making up this field.
    pub segments: Vec<FieldSegment>,
}

/// An instruction encoding template (R/I/S/B/U/J and compressed
/// variants) naming the ordered field set it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// Format name, e.g. `"R"`, `"I"`, `"C_CI"`.
    pub name: String,
    /// Encoded width in bits: 16 or 32.
    pub width: u32,
    /// Ordered field names consumed by this format. Each name must
    /// resolve in the owning [`IsaConfig::fields`] table.
    pub fields: Vec<String>,
}

/// A single named instruction: a format plus the fixed-field values
/// that make it *this* instruction rather than any other sharing the
/// format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSpec {
    /// Mnemonic, e.g. `"addi"`.
    pub name: String,
    /// Name of the [`FormatSpec`] this instruction uses.
    pub format: String,
    /// Resolved format index, filled in during projection.
    pub format_id: FormatId,
    /// `(field, expected value)` pairs that must match for a word to
    /// be this instruction. Stored both by name (for diagnostics) and
    /// pre-resolved to `FieldId` (for the hot-path legality check).
    pub fixed_fields: Vec<(String, u32)>,
    /// Same pairs as `fixed_fields`, with names resolved to dense
    /// indices so the legality oracle never hashes a string.
    pub fixed_field_ids: Vec<(FieldId, u32)>,
}

/// The fully-resolved, immutable description of one ISA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsaConfig {
    /// ISA identifier, e.g. `"rv32im"`.
    pub isa_name: String,
    /// Word width of the base (non-compressed) encoding. Always 32 for
    /// the ISAs this crate targets.
    pub base_width: u32,
    /// Number of architectural registers (used to bound random
    /// register-field rewrites).
    pub register_count: u32,
    /// All fields, indexed by [`FieldId`].
    pub fields: Vec<FieldEncoding>,
    /// Name -> index lookup, built once at projection time.
    pub field_index: HashMap<String, FieldId>,
    /// All formats, indexed by [`FormatId`].
    pub formats: Vec<FormatSpec>,
    /// Name -> index lookup, built once at projection time.
    pub format_index: HashMap<String, FormatId>,
    /// All instructions, in schema declaration order. Declaration
    /// order is semantically meaningful: [`crate::legality::is_legal`]
    /// returns the first full match.
    pub instructions: Vec<InstructionSpec>,
}

impl IsaConfig {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldEncoding> {
        self.field_index.get(name).map(|id| &self.fields[id.0 as usize])
    }

    /// Look up a field by dense id.
    pub fn field_by_id(&self, id: FieldId) -> &FieldEncoding {
        &self.fields[id.0 as usize]
    }

    /// Look up a format by name.
    pub fn format(&self, name: &str) -> Option<&FormatSpec> {
        self.format_index.get(name).map(|id| &self.formats[id.0 as usize])
    }

    /// Look up a format by dense id.
    pub fn format_by_id(&self, id: FormatId) -> &FormatSpec {
        &self.formats[id.0 as usize]
    }

    /// `true` if any loaded format is 16 bits wide, i.e. the ISA has a
    /// compressed extension worth mutating.
    pub fn enable_c(&self) -> bool {
        self.formats.iter().any(|f| f.width == 16)
    }
}
