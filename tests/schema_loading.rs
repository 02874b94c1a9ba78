//! End-to-end schema loading scenarios against the YAML fixtures under
//! `tests/fixtures/`.

use std::path::Path;

use isa_mutator::schema::load_isa_config;

fn fixtures(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn s1_loads_rv32i_and_legal_addi() {
    let isa = load_isa_config(&fixtures("rv32i"), "rv32i", None).unwrap();

    let opcode = isa.field("opcode").expect("opcode field resolves");
    assert_eq!(opcode.width, 7);

    // ADDI x0, x0, 0: opcode=0x13, funct3=0x0, rest zero.
    let word = 0x0000_0013u32;
    assert!(isa_mutator::legality::is_legal(word, &isa));
    assert_eq!(isa_mutator::legality::find_instruction(word, &isa), Some("addi"));
}

#[test]
fn rv32im_extends_rv32i_and_adds_m_instructions() {
    let isa = load_isa_config(&fixtures("rv32im"), "rv32im", None).unwrap();

    // Inherited from rv32i via `extends`.
    assert!(isa.field("opcode").is_some());
    assert_eq!(isa_mutator::legality::find_instruction(0x13, &isa), Some("addi"));

    // mul: opcode=0x33, funct3=0x0, funct7=0x01
    let mul_word = 0x33 | (0x01 << 25);
    assert_eq!(isa_mutator::legality::find_instruction(mul_word, &isa), Some("mul"));
}

#[test]
fn s6_anchor_propagates_across_files() {
    let isa = load_isa_config(&fixtures("anchors"), "demo", None).unwrap();

    let r2 = isa.format("R2").expect("aliased format resolves");
    assert_eq!(r2.fields, vec!["opcode", "rd", "funct3", "rs1", "rs2", "funct7"]);

    let add = isa
        .instructions
        .iter()
        .find(|i| i.name == "add")
        .expect("add instruction present");
    assert_eq!(add.format, "R2");
    assert_eq!(
        add.fixed_fields.iter().find(|(k, _)| k == "opcode").map(|(_, v)| *v),
        Some(0x33)
    );
}

#[test]
fn unknown_isa_name_is_config_error() {
    let result = load_isa_config(&fixtures("rv32i"), "does-not-exist", None);
    assert!(result.is_err());
}

#[test]
fn legality_closure_holds_for_every_instruction() {
    let isa = load_isa_config(&fixtures("rv32im"), "rv32im", None).unwrap();
    for instruction in &isa.instructions {
        let mut word = 0u32;
        for &(field_id, value) in &instruction.fixed_field_ids {
            let field = isa.field_by_id(field_id);
            word = isa_mutator::codec::insert(word, field, value);
        }
        assert!(
            isa_mutator::legality::is_legal(word, &isa),
            "instruction {} does not satisfy its own legality closure",
            instruction.name
        );
    }
}
