//! Loader scenarios that need schema files written on the fly (cyclic
//! `extends`, and overlay-wins merge precedence) rather than fixed
//! fixtures, using a scratch temp directory per test.

use std::fs;

use isa_mutator::schema::load_isa_config;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn cyclic_extends_does_not_fail_or_loop_forever() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    // a.yaml extends b.yaml, b.yaml extends a.yaml: a real cycle.
    write(
        root,
        "a.yaml",
        "extends: [b.yaml]\nfields:\n  opcode:\n    width: 7\n    lsb: 0\n",
    );
    write(
        root,
        "b.yaml",
        "extends: [a.yaml]\nformats:\n  I:\n    width: 32\n    fields: [opcode]\n",
    );
    write(root, "isa_map.yaml", "cyclic: [a.yaml]\n");

    let isa = load_isa_config(root, "cyclic", None)?;
    assert!(isa.field("opcode").is_some());
    assert!(isa.format("I").is_some());
    Ok(())
}

#[test]
fn overlay_file_wins_on_scalar_conflict() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    write(
        root,
        "base.yaml",
        "register_count: 16\nfields:\n  opcode:\n    width: 7\n    lsb: 0\n",
    );
    write(root, "override.yaml", "extends: [base.yaml]\nregister_count: 32\n");
    write(root, "isa_map.yaml", "overlaid: [override.yaml]\n");

    let isa = load_isa_config(root, "overlaid", None)?;
    assert_eq!(isa.register_count, 32, "override.yaml must win over base.yaml");
    Ok(())
}

#[test]
fn missing_isa_in_map_is_config_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "isa_map.yaml", "rv32i: [base.yaml]\n");
    write(root, "base.yaml", "fields: {}\n");

    let result = load_isa_config(root, "rv64gc", None);
    assert!(result.is_err());
    Ok(())
}
