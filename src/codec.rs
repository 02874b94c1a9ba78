//! Multi-segment bit-field codec.
//!
//! `extract`/`insert` are the only two operations the rest of the crate
//! needs to read or rewrite a field in a 32-bit instruction word. Both
//! are defined purely in terms of [`FieldEncoding`] data, with no
//! knowledge of any particular ISA.

use crate::schema::model::FieldEncoding;

/// Mask selecting the low `width` bits. `width >= 32` yields a full
/// 32-bit mask; `width == 0` yields 0.
pub fn mask_bits(width: u32) -> u64 {
    if width == 0 {
        0
    } else if width >= 32 {
        0xFFFF_FFFFu64
    } else {
        (1u64 << width) - 1
    }
}

/// Extract the logical value of `field` from `word`.
///
/// For each segment, `width` bits starting at `word_lsb` of `word` are
/// shifted to `value_lsb` and OR-ed into the accumulator. The result is
/// masked to `field.width` bits. Sign extension is *not* applied here;
/// use [`extract_signed`] when the field is arithmetic.
pub fn extract(word: u32, field: &FieldEncoding) -> u32 {
    let mut value: u64 = 0;
    for seg in &field.segments {
        let seg_mask = mask_bits(seg.width);
        let bits = (u64::from(word) >> seg.word_lsb) & seg_mask;
        value |= bits << seg.value_lsb;
    }
    (value & mask_bits(field.width)) as u32
}

/// Extract `field` from `word` and sign-extend if `field.signed`.
pub fn extract_signed(word: u32, field: &FieldEncoding) -> i32 {
    let raw = extract(word, field);
    if field.signed && field.width > 0 && field.width < 32 {
        let sign_bit = 1u32 << (field.width - 1);
        if raw & sign_bit != 0 {
            return (raw | !mask_bits(field.width) as u32) as i32;
        }
    }
    raw as i32
}

/// Return `word` with `field` rewritten to hold logical value `v`.
///
/// Clears the segment bits in `word`, then for each segment takes bits
/// `value_lsb..value_lsb+width` of `v` and OR-s them into `word` at
/// `word_lsb`.
pub fn insert(word: u32, field: &FieldEncoding, v: u32) -> u32 {
    let mut out = word;
    for seg in &field.segments {
        let seg_mask = mask_bits(seg.width);
        out &= !((seg_mask as u32) << seg.word_lsb);
        let bits = (u64::from(v) >> seg.value_lsb) & seg_mask;
        out |= (bits as u32) << seg.word_lsb;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::FieldSegment;

    fn contiguous(name: &str, word_lsb: u32, width: u32, signed: bool) -> FieldEncoding {
        FieldEncoding {
            name: name.to_string(),
            width,
            signed,
            segments: vec![FieldSegment {
                word_lsb,
                width,
                value_lsb: 0,
            }],
        }
    }

    #[test]
    fn round_trip_contiguous() {
        let f = contiguous("opcode", 0, 7, false);
        for v in 0..(1u32 << 7) {
            assert_eq!(extract(insert(0, &f, v), &f), v);
        }
    }

    #[test]
    fn non_interference_disjoint_fields() {
        let a = contiguous("rd", 7, 5, false);
        let b = contiguous("rs1", 15, 5, false);
        let w1 = insert(insert(0, &a, 3), &b, 9);
        let w2 = insert(insert(0, &b, 9), &a, 3);
        assert_eq!(w1, w2);
        assert_eq!(extract(w1, &a), 3);
        assert_eq!(extract(w1, &b), 9);
    }

    #[test]
    fn zero_width_is_identity() {
        let f = contiguous("nothing", 0, 0, false);
        assert_eq!(extract(0xFFFF_FFFF, &f), 0);
        assert_eq!(insert(0x1234, &f, 0xFF), 0x1234);
    }

    #[test]
    fn split_immediate_b_type() {
        // RV32 B-type immediate: imm[12|10:5|4:1|11] packed across the
        // word, reconstructed as a 13-bit value with imm[0] = 0.
        let imm_b = FieldEncoding {
            name: "imm_b".to_string(),
            width: 13,
            signed: true,
            segments: vec![
                FieldSegment { word_lsb: 8, width: 4, value_lsb: 1 },
                FieldSegment { word_lsb: 25, width: 6, value_lsb: 5 },
                FieldSegment { word_lsb: 7, width: 1, value_lsb: 11 },
                FieldSegment { word_lsb: 31, width: 1, value_lsb: 12 },
            ],
        };
        let word = insert(0, &imm_b, (-2i32 as u32) & mask_bits(13) as u32);
        assert_eq!(extract_signed(word, &imm_b), -2);
    }

    #[test]
    fn sign_extension_at_boundary() {
        let f = contiguous("imm12", 20, 12, true);
        let word = insert(0, &f, 0xFFF);
        assert_eq!(extract_signed(word, &f), -1);
        let word = insert(0, &f, 0x7FF);
        assert_eq!(extract_signed(word, &f), 0x7FF);
    }
}
