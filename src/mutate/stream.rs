//! Top-level stream mutator: copies an input buffer, picks a handful
//! of aligned mutation sites, and rewrites each one in place.

use crate::bitio::{load_u16_le, load_u32_le, store_u16_le, store_u32_le};
use crate::config::{Config, Strategy};
use crate::mutate::compressed::mutate_compressed;
use crate::mutate::instruction::mutate_instruction;
use crate::prng::Prng;
use crate::schema::model::IsaConfig;

const MAX_ROUNDS: u32 = 8;

#[derive(Debug, Clone, Copy)]
enum Site {
    Word32(usize),
    Word16(usize),
}

enum EffectiveStrategy {
    Raw,
    Ir,
}

/// Mutate `input` into `out`, truncated to `max` bytes. Returns the
/// number of bytes written, always `>= 1`: an empty effective input
/// (`min(input.len(), max) == 0`) yields a single zero byte so the
/// host always receives at least one byte.
pub fn mutate_stream(
    input: &[u8],
    out: &mut Vec<u8>,
    max: usize,
    isa: &IsaConfig,
    config: &Config,
    prng: &mut Prng,
) -> usize {
    let len = input.len().min(max);
    if len == 0 {
        out.clear();
        out.push(0);
        return 1;
    }

    out.clear();
    out.extend_from_slice(&input[..len]);

    let rounds = 1 + prng.next_below(MAX_ROUNDS);
    for _ in 0..rounds {
        mutate_one_round(out, len, isa, config, prng);
    }

    len
}

fn mutate_one_round(out: &mut [u8], len: usize, isa: &IsaConfig, config: &Config, prng: &mut Prng) {
    let i = prng.next_below(len as u32) as usize;

    let site = if out[i] & 0b11 == 0b11 && i + 4 <= len {
        Site::Word32(i)
    } else if isa.enable_c() && i + 2 <= len {
        Site::Word16(i)
    } else {
        return;
    };

    match resolve_strategy(config, prng) {
        EffectiveStrategy::Raw => apply_raw(out, site, prng),
        EffectiveStrategy::Ir => apply_ir(out, site, isa, config, prng),
    }
}

fn resolve_strategy(config: &Config, prng: &mut Prng) -> EffectiveStrategy {
    match config.strategy {
        Strategy::Raw => EffectiveStrategy::Raw,
        Strategy::Ir => EffectiveStrategy::Ir,
        Strategy::Hybrid | Strategy::Auto => {
            if prng.chance_percent(config.decode_prob) {
                EffectiveStrategy::Ir
            } else {
                EffectiveStrategy::Raw
            }
        }
    }
}

fn apply_raw(out: &mut [u8], site: Site, prng: &mut Prng) {
    let i = match site {
        Site::Word32(i) | Site::Word16(i) => i,
    };
    let xor = prng.next_below(256) as u8;
    out[i] ^= xor;
}

fn apply_ir(out: &mut [u8], site: Site, isa: &IsaConfig, config: &Config, prng: &mut Prng) {
    match site {
        Site::Word32(i) => {
            let word = load_u32_le(out, i);
            let mutated = mutate_instruction(word, isa, config, prng);
            store_u32_le(out, i, mutated);
        }
        Site::Word16(i) => {
            let word = load_u16_le(out, i);
            let mutated = mutate_compressed(word, prng);
            store_u16_le(out, i, mutated);
        }
    }
}
