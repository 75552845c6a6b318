//! Fixed record vectors

use bytes::Bytes;
use srec_core::{
    ascii_to_hex,
    decoder::decode_lines,
    encoder::{encode, encode_to_string},
    record::record_checksum,
    AddressSize, EncodeOptions, Record, RecordKind, SrecError,
};

#[test]
fn elf_magic_s3_record() {
    let text = encode_to_string(
        &[0x7F, 0x45, 0x4C, 0x46, 0x01, 0x01, 0x01, 0x03],
        &EncodeOptions::new(AddressSize::Bits32),
    )
    .unwrap();

    assert_eq!(text, "S30D000000007F454C460101010396\nS5030001FB\nS70500000000FA\n");
}

#[test]
fn header_text_hex() {
    assert_eq!(ascii_to_hex("Hello, World!"), "48656C6C6F2C20576F726C6421");
    assert_eq!(ascii_to_hex("\u{7f}"), "7F");
    assert_eq!(ascii_to_hex([0xFFu8; 5]), "FFFFFFFFFF");

    let record = Record::header(Bytes::from_static(b"Hello, World!")).unwrap();
    assert_eq!(record.serialize(), "S010000048656C6C6F2C20576F726C642186");
}

#[test]
fn count_records() {
    let vectors: &[(u32, &str)] = &[
        (0, "S5030000FC"),
        (1, "S5030001FB"),
        (0xFFFF, "S503FFFFFE"),
        (0x1_0000, "S604010000FA"),
        (0xFF_FFFF, "S604FFFFFFFE"),
    ];

    for (count, expected) in vectors {
        assert_eq!(Record::count(*count).unwrap().serialize(), *expected);
    }
}

#[test]
fn termination_records_per_width() {
    let vectors = [
        (AddressSize::Bits16, 0x1234, "S9031234B6"),
        (AddressSize::Bits24, 0x123456, "S8041234565F"),
        (AddressSize::Bits32, 0x12345678, "S70512345678E6"),
    ];

    for (size, address, expected) in vectors {
        let record = Record::termination(size, address).unwrap();
        assert_eq!(record.kind(), size.termination_kind());
        assert_eq!(record.serialize(), expected);
    }
}

#[test]
fn data_records_per_width() {
    let vectors = [
        (AddressSize::Bits16, RecordKind::S1, "S1050100AABB94"),
        (AddressSize::Bits24, RecordKind::S2, "S206010000AABB93"),
        (AddressSize::Bits32, RecordKind::S3, "S30701000000AABB92"),
    ];

    for (size, kind, expected) in vectors {
        let address = if size == AddressSize::Bits16 { 0x0100 } else { 0x01_0000 };
        let address = if size == AddressSize::Bits32 { 0x0100_0000 } else { address };
        let record = Record::data(size, address, vec![0xAA, 0xBB]).unwrap();
        assert_eq!(record.kind(), kind);
        assert_eq!(record.serialize(), expected);
    }
}

#[test]
fn checksum_known_values() {
    assert_eq!(record_checksum(&[0x00, 0x00]), 0xFC);
    assert_eq!(
        record_checksum(&[0, 0, 0, 0, 0x7F, 0x45, 0x4C, 0x46, 0x01, 0x01, 0x01, 0x03]),
        0x96
    );
}

#[test]
fn only_non_data_lines_decode_to_nothing() {
    let decoded = decode_lines(["S00600004844521B", "S5030000FC", "S9030000FC"]);
    assert!(decoded.is_empty());
}

#[test]
fn full_payload_16bit_fits_byte_count() {
    let data = vec![0xEE; 251];
    let mut out = Vec::new();
    encode(&data[..], &mut out, &EncodeOptions::new(AddressSize::Bits16)).unwrap();
    let text = String::from_utf8(out).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("S1FE0000"));
    assert_eq!(first.len(), 4 + 4 + 251 * 2 + 2);
}

#[test]
fn out_of_range_address_rejected() {
    let err = Record::data(AddressSize::Bits24, 0x100_0000, vec![1]).unwrap_err();
    assert_eq!(
        err,
        SrecError::ConstraintViolation {
            field: "address",
            value: 0x100_0000,
            max: 0xFF_FFFF,
        }
    );
}
