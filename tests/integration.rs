//! Integration tests: define layouts, decode/encode records, accessor surface, rendering.

use bitstruct::{
    BitPacked, ByteAligned, Codec, CodecError, Endianness, FieldAccess, FieldAccessMut, LayoutError,
    Packing, Record, RecordMut, StructureLayout,
};
use byteorder::{BigEndian, ByteOrder};

const MIXED_BYTES: [u8; 8] = [4, 0b1101_1111, 102, 0b0001_1111, 255, 255, 252, 24];

fn mixed() -> StructureLayout {
    StructureLayout::define(
        "Mixed",
        &BitPacked,
        &[("u8", "a"), ("i3", "b"), ("u3be", "c"), ("i2be", "d"), ("u13", "e"), ("i32", "f")],
    )
    .expect("define")
}

fn foo_struff() -> StructureLayout {
    StructureLayout::define(
        "FooStruff",
        &BitPacked,
        &[("u23", "foo"), ("i3", "bar"), ("unsigned byte BE", "something")],
    )
    .expect("define")
}

#[test]
fn test_decode_mixed_record_little_endian_host() {
    let layout = mixed();
    assert_eq!(layout.bit_len(), 61);
    assert_eq!(layout.byte_len(), 8);
    let record = Record::new(&MIXED_BYTES, &layout, Endianness::Little).expect("view");
    assert_eq!(record.values(), Ok(vec![4, -2, 7, -1, 3267, -125]));
}

#[test]
fn test_decode_mixed_record_big_endian_host() {
    let layout = mixed();
    let record = Record::new(&MIXED_BYTES, &layout, Endianness::Big).expect("view");
    // little-endian fields are bit-reversed, big-endian ones read as stored
    assert_eq!(record.get("a"), Ok(32));
    assert_eq!(record.get("b"), Ok(3));
    assert_eq!(record.get("c"), Ok(7));
    assert_eq!(record.get("d"), Ok(-1));
    assert_eq!(record.get("e"), Ok(6246));
}

#[test]
fn test_encode_mixed_record_reproduces_bytes() {
    let codec = Codec::new(mixed(), Endianness::Little);
    let bytes = codec
        .encode_record(&[("a", 4), ("b", -2), ("c", 7), ("d", -1), ("e", 3267), ("f", -125)])
        .expect("encode");
    assert_eq!(bytes, MIXED_BYTES.to_vec());
}

#[test]
fn test_signed_field_round_trip_and_raw_bits() {
    let layout = StructureLayout::define("S", &BitPacked, &[("i3", "x")]).expect("define");
    let mut buf = [0u8; 1];
    let mut record = RecordMut::new(&mut buf, &layout, Endianness::Little).expect("view");
    record.set("x", -2).expect("set");
    assert_eq!(record.get("x"), Ok(-2));
    assert_eq!(record.get_bits("x"), Ok(vec![true, true, false]));
}

#[test]
fn test_set_then_delete() {
    let layout = StructureLayout::define("C", &ByteAligned, &[("u8", "x")]).expect("define");
    let mut buf = [0u8; 1];
    let mut record = RecordMut::new(&mut buf, &layout, Endianness::Little).expect("view");
    record.set("x", 255).expect("set");
    assert_eq!(record.get("x"), Ok(255));
    assert!(record.delete("x"));
    assert_eq!(record.get("x"), Ok(0));
}

#[test]
fn test_byte_aligned_rejects_partial_bytes() {
    let err = StructureLayout::define("Bad", &ByteAligned, &[("u3", "x")]).unwrap_err();
    assert!(matches!(err, LayoutError::UnalignedWidth { bit_width: 3, .. }));
}

#[test]
fn test_byte_aligned_matches_byteorder() {
    let layout = StructureLayout::define(
        "Words",
        &ByteAligned,
        &[("u32", "word"), ("short int", "half"), ("long int", "wide")],
    )
    .expect("define");
    assert_eq!(layout.packing(), Packing::ByteAligned);
    let bytes: [u8; 14] = [0x12, 0x34, 0x56, 0x78, 0xff, 0xfe, 0x80, 0, 0, 0, 0, 0, 0, 1];
    let record = Record::new(&bytes, &layout, Endianness::Little).expect("view");
    assert_eq!(record.get("word"), Ok(BigEndian::read_u32(&bytes[0..4]) as i128));
    assert_eq!(record.get("half"), Ok(BigEndian::read_i16(&bytes[4..6]) as i128));
    assert_eq!(record.get("wide"), Ok(BigEndian::read_i64(&bytes[6..14]) as i128));

    let mut out = [0u8; 14];
    let mut record = RecordMut::new(&mut out, &layout, Endianness::Little).expect("view");
    record.set("word", 0xDEAD_BEEF).expect("set");
    let mut expected = [0u8; 4];
    BigEndian::write_u32(&mut expected, 0xDEAD_BEEF);
    assert_eq!(&out[0..4], &expected);
}

#[test]
fn test_records_at_offsets() {
    let layout = StructureLayout::define("Pair", &BitPacked, &[("u4", "hi"), ("u4", "lo")])
        .expect("define");
    let codec = Codec::new(layout, Endianness::Little);
    let mut buf = [0x12u8, 0x34, 0x56];
    for (i, expected) in [(0usize, 0x12), (1, 0x34), (2, 0x56)] {
        let record = codec.record_at(&buf, i).expect("view");
        assert_eq!(record.offset(), i);
        assert_eq!(record.get("hi"), Ok(expected >> 4));
        assert_eq!(record.get("lo"), Ok(expected & 0xf));
    }
    assert!(matches!(
        codec.record_at(&buf, 3),
        Err(CodecError::BufferTooShort { required: 4, actual: 3 })
    ));

    let mut record = codec.record_mut_at(&mut buf, 1).expect("view");
    record.set("lo", 0xf).expect("set");
    assert_eq!(buf, [0x12, 0x3f, 0x56]);
}

#[test]
fn test_accessor_surface() {
    let layout = foo_struff();
    let mut buf = vec![0u8; layout.byte_len()];
    let mut record = RecordMut::new(&mut buf, &layout, Endianness::Little).expect("view");

    assert_eq!(record.len(), 3);
    assert_eq!(record.keys(), vec!["foo", "bar", "something"]);
    record
        .set_many(&[("foo", 352), ("bar", -2), ("something", 255)])
        .expect("set_many");
    assert_eq!(
        record.get_many(&["bar", "someNonexistentMember"]),
        Ok(vec![("bar".to_string(), Some(-2)), ("someNonexistentMember".to_string(), None)])
    );
    assert_eq!(
        record.has_many(&["foo", "someNonexistentMember"]),
        vec![("foo".to_string(), true), ("someNonexistentMember".to_string(), false)]
    );
    let entries = record.bit_entries().expect("bit_entries");
    assert_eq!(entries[2], ("something".to_string(), vec![true; 8]));

    // one bad value leaves every field as it was
    assert!(matches!(
        record.set_many(&[("foo", 1), ("bar", 4)]),
        Err(CodecError::ValueOutOfRange { value: 4, min: -4, max: 3 })
    ));
    assert_eq!(record.values(), Ok(vec![352, -2, 255]));

    assert!(!record.delete_many(&["bar", "someNonexistentMember"]));
    assert_eq!(record.values(), Ok(vec![352, 0, 255]));
    record.clear();
    assert_eq!(record.values(), Ok(vec![0, 0, 0]));
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn test_display_renders_every_field() {
    let layout = foo_struff();
    let codec = Codec::new(layout, Endianness::Little);
    let bytes = codec
        .encode_record(&[("foo", 352), ("bar", -2), ("something", 255)])
        .expect("encode");
    let record = codec.record(&bytes).expect("view");
    assert_eq!(
        record.to_string(),
        "BitPacked<FooStruff> {\n  foo: u23 = 352;\n  bar: i3 = -2;\n  something: u8be = 255;\n}"
    );

    let aligned = StructureLayout::define("Header", &ByteAligned, &[("u8", "version")])
        .expect("define");
    let record = Record::new(&[7], &aligned, Endianness::Big).expect("view");
    assert_eq!(record.to_string(), "ByteAligned<Header> {\n  version: u8 = 224;\n}");
}

#[test]
fn test_unknown_field_errors() {
    let codec = Codec::new(foo_struff(), Endianness::Little);
    let bytes = vec![0u8; 5];
    let record = codec.record(&bytes).expect("view");
    assert!(!record.has("someNonexistentMember"));
    assert_eq!(
        record.get("someNonexistentMember"),
        Err(CodecError::UnknownField("someNonexistentMember".to_string()))
    );
}
