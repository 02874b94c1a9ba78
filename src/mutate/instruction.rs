//! 32-bit instruction-level schema-guided mutation.
//!
//! Dispatches on the format of the instruction `word` currently
//! encodes (as determined by [`crate::legality::find_instruction`])
//! and rewrites one or two fields accordingly.

use crate::codec::{extract_signed, insert, mask_bits};
use crate::config::Config;
use crate::legality::find_instruction;
use crate::prng::Prng;
use crate::schema::model::{FieldEncoding, IsaConfig};

const BASE_ALU_FUNCT7: [u32; 2] = [0x00, 0x20];
const M_EXT_FUNCT7: [u32; 1] = [0x01];
const IMMEDIATE_DELTAS: [i32; 8] = [1, -1, 2, -2, 4, -4, 0x100, -0x100];
const REGISTER_FIELD_NAMES: [&str; 3] = ["rd", "rs1", "rs2"];

/// Rewrite one 32-bit instruction word according to its decoded
/// format. Returns the word unchanged if the format cannot be
/// determined and no generic fallback applies.
pub fn mutate_instruction(word: u32, isa: &IsaConfig, config: &Config, prng: &mut Prng) -> u32 {
    let format_name = find_instruction(word, isa)
        .and_then(|name| isa.instructions.iter().find(|i| i.name == name))
        .map(|i| i.format.clone());

    match format_name.as_deref() {
        Some("R") => mutate_r_type(word, isa, config, prng),
        Some(name @ ("I" | "S" | "B" | "U" | "J")) => {
            mutate_immediate(word, isa, name, config, prng)
        }
        _ => mutate_unknown(word, isa, prng),
    }
}

fn mutate_r_type(word: u32, isa: &IsaConfig, config: &Config, prng: &mut Prng) -> u32 {
    let mut out = word;

    if let Some(funct7) = isa.field("funct7") {
        let total = config.r_weight_base_alu + config.r_weight_m;
        let roll = if total == 0 { 0 } else { prng.next_below(total) };
        let candidates: &[u32] = if roll < config.r_weight_base_alu {
            &BASE_ALU_FUNCT7
        } else {
            &M_EXT_FUNCT7
        };
        let choice = candidates[prng.next_below(candidates.len() as u32) as usize];
        out = insert(out, funct7, choice);
    }

    if prng.chance_percent(50) {
        if let Some(reg_field) = pick_register_field(isa, prng) {
            let value = prng.next_below(isa.register_count.max(1));
            out = insert(out, reg_field, value);
        }
    }

    out
}

fn mutate_immediate(
    word: u32,
    isa: &IsaConfig,
    format_name: &str,
    config: &Config,
    prng: &mut Prng,
) -> u32 {
    let format = match isa.format(format_name) {
        Some(f) => f,
        None => return word,
    };
    let imm_name = match format.fields.iter().find(|name| name.contains("imm")) {
        Some(name) => name,
        None => return word,
    };
    let field = match isa.field(imm_name) {
        Some(f) => f,
        None => return word,
    };

    let current = extract_signed(word, field);
    let new_value = if prng.chance_percent(config.imm_random_prob) {
        let span = mask_bits(field.width) as u32;
        let half = (span >> 1) as i32;
        prng.next_below(span.saturating_add(1)) as i32 - half
    } else {
        let delta = IMMEDIATE_DELTAS[prng.next_below(IMMEDIATE_DELTAS.len() as u32) as usize];
        current.wrapping_add(delta)
    };

    let masked = (new_value as u32) & mask_bits(field.width) as u32;
    insert(word, field, masked)
}

fn mutate_unknown(word: u32, isa: &IsaConfig, prng: &mut Prng) -> u32 {
    if let Some(reg_field) = pick_register_field(isa, prng) {
        let value = prng.next_below(isa.register_count.max(1));
        return insert(word, reg_field, value);
    }
    let bit = prng.next_below(32);
    word ^ (1u32 << bit)
}

fn pick_register_field<'a>(isa: &'a IsaConfig, prng: &mut Prng) -> Option<&'a FieldEncoding> {
    let available: Vec<&FieldEncoding> =
        REGISTER_FIELD_NAMES.iter().filter_map(|name| isa.field(name)).collect();
    if available.is_empty() {
        return None;
    }
    let idx = prng.next_below(available.len() as u32) as usize;
    Some(available[idx])
}
