//! Legality oracle: does a word match some instruction in the schema?
//!
//! The schema encodes instructions with potentially overlapping fixed
//! fields (e.g. all of RV32I's R-type ALU ops share `opcode` and
//! `funct3` partially). [`is_legal`] returns as soon as it finds the
//! first instruction (in declaration order) whose fixed fields all
//! match; it does not rank partial matches or detect ambiguity between
//! candidates. A word that happens to satisfy more than one
//! instruction's fixed fields is reported legal via whichever one was
//! declared first in the schema, and the schema author is responsible
//! for keeping fixed-field sets disjoint if that distinction matters.

use crate::codec::extract;
use crate::schema::model::IsaConfig;

/// `true` if `word` exactly matches the fixed fields of at least one
/// instruction in `isa`.
pub fn is_legal(word: u32, isa: &IsaConfig) -> bool {
    find_instruction(word, isa).is_some()
}

/// The name of the first matching instruction, if any.
pub fn find_instruction<'a>(word: u32, isa: &'a IsaConfig) -> Option<&'a str> {
    'outer: for instruction in &isa.instructions {
        for &(field_id, expected) in &instruction.fixed_field_ids {
            let field = isa.field_by_id(field_id);
            if extract(word, field) != expected {
                continue 'outer;
            }
        }
        return Some(&instruction.name);
    }
    None
}
