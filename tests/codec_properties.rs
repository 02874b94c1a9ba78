//! Property-based checks of the bit-field codec's round-trip and
//! non-interference invariants (§8 invariants 1–2), run over randomly
//! generated fields and disjoint-field pairs.

use quickcheck_macros::quickcheck;

use isa_mutator::codec::{extract, insert};
use isa_mutator::schema::model::{FieldEncoding, FieldSegment};

fn contiguous_field(word_lsb: u32, width: u32) -> FieldEncoding {
    FieldEncoding {
        name: "prop".to_string(),
        width,
        signed: false,
        segments: vec![FieldSegment { word_lsb, width, value_lsb: 0 }],
    }
}

#[quickcheck]
fn round_trip_any_contiguous_field(word_lsb_raw: u8, width_raw: u8, value: u32) -> bool {
    let width = (width_raw % 20 + 1) as u32; // keep fields narrow enough to not overlap u32
    let word_lsb = (word_lsb_raw % 12) as u32; // leave headroom so word_lsb + width <= 32
    if word_lsb + width > 32 {
        return true;
    }
    let field = contiguous_field(word_lsb, width);
    let v = value & ((1u32 << width) - 1);
    extract(insert(0, &field, v), &field) == v
}

#[quickcheck]
fn non_interference_for_disjoint_byte_lanes(a_value: u8, b_value: u8) -> bool {
    let field_a = contiguous_field(0, 8);
    let field_b = contiguous_field(8, 8);
    let w1 = insert(insert(0, &field_a, a_value as u32), &field_b, b_value as u32);
    let w2 = insert(insert(0, &field_b, b_value as u32), &field_a, a_value as u32);
    w1 == w2 && extract(w1, &field_a) == a_value as u32 && extract(w1, &field_b) == b_value as u32
}
