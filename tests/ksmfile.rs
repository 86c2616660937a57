//! End-to-end tests over complete KSM containers.
//!
//! Each test builds a gzip container in memory, runs it through the full
//! pipeline (container unwrapping, argument pool, code units, debug map),
//! and checks the decoded structures or the exact error a damaged file
//! produces.

use flate2::{write::GzEncoder, Compression};
use ksmscope::prelude::*;
use std::io::Write;

/// Gzip `content` the way the kOS compiler writes `.ksm` files.
fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Wrap `payload` in the magic plus gzip framing.
fn container(payload: &[u8]) -> Vec<u8> {
    let mut content = KSM_MAGIC.to_vec();
    content.extend_from_slice(payload);
    gzip(&content)
}

/// Payload equivalent to a tiny `print("hello")` script: four pool
/// entries, one code unit, two debug records.
fn sample_payload() -> Vec<u8> {
    let mut payload = b"%A\x01".to_vec();
    payload.push(0x08); // ARG_MARKER at offset 3
    payload.extend_from_slice(&[0x07, 0x05, b'h', b'e', b'l', b'l', b'o']); // STRING at 4
    payload.extend_from_slice(&[0x07, 0x05, b'p', b'r', b'i', b'n', b't']); // STRING at 11
    payload.extend_from_slice(&[0x09, 0x2A, 0x00, 0x00, 0x00]); // SCALAR_INT_VALUE at 18
    payload.extend_from_slice(b"%F");
    payload.extend_from_slice(b"%I");
    payload.extend_from_slice(&[0x4E, 0x12]); // PUSH 18
    payload.extend_from_slice(b"%M");
    payload.extend_from_slice(&[0x4E, 0x03]); // PUSH 3
    payload.extend_from_slice(&[0x4E, 0x04]); // PUSH 4
    payload.extend_from_slice(&[0x4C, 0x0B, 0x03]); // CALL 11, 3
    payload.push(0x32); // EOP
    payload.extend_from_slice(b"%D\x01");
    payload.extend_from_slice(&[0x01, 0x00, 0x01, 0x1B, 0x1C]);
    payload.extend_from_slice(&[0x02, 0x00, 0x02, 0x1F, 0x22, 0x23, 0x26]);
    payload
}

#[test]
fn decodes_complete_container() -> Result<()> {
    let ksm = KsmFile::from_mem(container(&sample_payload()))?;

    assert_eq!(ksm.index_width(), 1);
    assert_eq!(ksm.arguments().len(), 4);
    assert_eq!(ksm.arguments()[0].tag(), ArgumentTag::ArgMarker);
    assert_eq!(ksm.units().len(), 1);
    assert_eq!(ksm.instruction_count(), 5);

    let unit = &ksm.units()[0];
    assert!(unit.function.is_empty());
    assert_eq!(unit.init.len(), 1);
    assert_eq!(unit.main.len(), 4);
    assert_eq!(unit.init[0].opcode.mnemonic, "PUSH");
    assert_eq!(unit.init[0].operands, vec![18]);
    assert_eq!(unit.main[2].opcode.mnemonic, "CALL");
    assert_eq!(unit.main[2].operands, vec![11, 3]);
    assert_eq!(unit.main[3].opcode.mnemonic, "EOP");
    assert!(unit.main[3].operands.is_empty());

    assert_eq!(ksm.debug().index_width, 1);
    assert_eq!(ksm.debug().lines.len(), 2);
    assert_eq!(ksm.debug().lines[0].line_number, 1);
    assert_eq!(ksm.debug().lines[0].ranges, vec![(27, 28)]);
    assert_eq!(ksm.debug().lines[1].ranges, vec![(31, 34), (35, 38)]);
    Ok(())
}

#[test]
fn operands_resolve_to_pool_entries() -> Result<()> {
    let ksm = KsmFile::from_mem(container(&sample_payload()))?;

    let callee = ksm.argument_at(11).unwrap();
    assert_eq!(callee.value, ArgumentValue::String("print".to_owned()));

    let pushed = ksm.argument_at(18).unwrap();
    assert_eq!(pushed.value, ArgumentValue::ScalarIntValue(42));

    // 5 lands inside the "hello" entry, not on a tag byte.
    assert!(ksm.argument_at(5).is_none());
    Ok(())
}

#[test]
fn loader_and_direct_parse_agree() -> Result<()> {
    let payload = sample_payload();
    let file = File::from_mem(container(&payload))?;

    assert_eq!(file.data(), payload.as_slice());
    assert_eq!(file.len(), payload.len());
    assert_eq!(file.disassemble()?, KsmFile::parse(&payload)?);
    Ok(())
}

#[test]
fn reparsing_yields_equal_results() -> Result<()> {
    let payload = sample_payload();
    assert_eq!(KsmFile::parse(&payload)?, KsmFile::parse(&payload)?);
    Ok(())
}

#[test]
fn rejects_wrong_magic() {
    let result = KsmFile::from_mem(gzip(b"KSM\x01payload"));
    assert!(matches!(
        result,
        Err(Error::InvalidMagic { found }) if found == *b"KSM\x01"
    ));
}

#[test]
fn rejects_non_gzip_input() {
    let result = File::from_mem(vec![0x00; 16]);
    assert!(matches!(result, Err(Error::FileError(_))));
}

#[test]
fn truncated_payload_reports_end_of_stream() {
    // Ends right after the code sections; the %D marker never arrives.
    let result = KsmFile::parse(b"%A\x01%F%I%M\x32");
    assert!(matches!(result, Err(Error::EndOfStream { offset: 10 })));
}

#[test]
fn out_of_order_sections_report_both_markers() {
    // %M where %I belongs.
    let result = KsmFile::parse(b"%A\x01%F%M\x32%D\x01");
    assert!(matches!(
        result,
        Err(Error::SectionOrder { expected, found, offset: 5 })
            if expected == *b"%I" && found == *b"%M"
    ));
}

#[test]
fn unknown_opcode_reports_code_and_offset() {
    let result = KsmFile::parse(b"%A\x01%F%I%M\x99\x00%D\x01");
    assert!(matches!(
        result,
        Err(Error::UnknownOpcode { code: 0x99, offset: 9 })
    ));
}

#[test]
fn unknown_argument_tag_reports_offset() {
    let result = KsmFile::parse(b"%A\x01\x0D%F%I%M%D\x01");
    assert!(matches!(
        result,
        Err(Error::UnknownArgumentTag { tag: 0x0D, offset: 3 })
    ));
}

#[test]
fn rejects_unsupported_index_widths() {
    for width in [0x00, 0x09, 0xFF] {
        let payload = [b'%', b'A', width, b'%', b'F'];
        let result = KsmFile::parse(&payload);
        assert!(
            matches!(result, Err(Error::UnsupportedIndexWidth { width: w, offset: 2 }) if w == width),
            "width {width:#04X} must be rejected"
        );
    }
}

#[test]
fn invalid_string_encoding_reports_offset() {
    let result = KsmFile::parse(&[b'%', b'A', 0x01, 0x07, 0x02, 0xFF, 0xFE, b'%', b'F']);
    assert!(matches!(result, Err(Error::InvalidEncoding { offset: 5, .. })));
}

#[test]
fn empty_sections_decode_to_empty_unit() -> Result<()> {
    let ksm = KsmFile::parse(b"%A\x01%F%I%M%D\x01")?;

    assert!(ksm.arguments().is_empty());
    assert_eq!(ksm.units().len(), 1);
    assert_eq!(ksm.units()[0].instruction_count(), 0);
    assert!(ksm.debug().lines.is_empty());
    Ok(())
}

#[test]
fn decodes_multiple_code_units() -> Result<()> {
    let ksm = KsmFile::parse(b"%A\x01%F%I%M\x32%F\x33%I%M\x32%D\x01")?;

    assert_eq!(ksm.units().len(), 2);
    assert_eq!(ksm.units()[0].main[0].opcode.mnemonic, "EOP");
    assert_eq!(ksm.units()[1].function[0].opcode.mnemonic, "NOP");
    assert_eq!(ksm.instruction_count(), 3);
    Ok(())
}

#[test]
fn debug_ranges_are_big_endian() -> Result<()> {
    // Two byte debug width: line numbers stay little-endian while range
    // offsets read big-endian.
    let mut payload = b"%A\x01%F%I%M\x32%D\x02".to_vec();
    payload.extend_from_slice(&[0x34, 0x12, 0x01, 0x01, 0x00, 0x01, 0x10]);
    let ksm = KsmFile::parse(&payload)?;

    let line = &ksm.debug().lines[0];
    assert_eq!(line.line_number, 0x1234);
    assert_eq!(line.ranges, vec![(0x0100, 0x0110)]);
    Ok(())
}
