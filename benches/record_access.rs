//! Benchmark: field reads and writes over a buffer of back-to-back bit-packed records,
//! compared with a byte-aligned layout of the same field count. Records are walked by offset,
//! one view per record.

use bitstruct::{parse, Codec, Endianness, FieldAccess, FieldAccessMut, ResolvedSchema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SCHEMA: &str = r#"
packed struct Mixed {
  a: u8;
  b: i3;
  c: u3be;
  d: i2be;
  e: u13;
  f: i32;
}

struct Aligned {
  a: u8;
  b: i8;
  c: u8 be;
  d: i8 be;
  e: u16;
  f: i32;
}
"#;

const RECORDS: usize = 4096;

fn codec(resolved: &ResolvedSchema, name: &str) -> Codec {
    let layout = resolved.get(name).cloned().unwrap_or_else(|| panic!("no struct {}", name));
    Codec::new(layout, Endianness::Little)
}

fn filled_buffer(codec: &Codec) -> Vec<u8> {
    let len = codec.layout().byte_len();
    let mut buf = vec![0u8; len * RECORDS];
    for i in 0..RECORDS {
        let mut record = codec.record_mut_at(&mut buf, i * len).expect("view");
        record
            .set_many(&[("a", (i % 256) as i128), ("b", -2), ("c", 7), ("d", -1), ("e", 300), ("f", -(i as i128))])
            .expect("set_many");
    }
    buf
}

fn sum_all(codec: &Codec, buf: &[u8]) -> i128 {
    let len = codec.layout().byte_len();
    let mut sum = 0i128;
    for i in 0..RECORDS {
        let record = codec.record_at(buf, i * len).expect("view");
        for v in record.values().expect("values") {
            sum += v;
        }
    }
    sum
}

fn bench_record_access(c: &mut Criterion) {
    let resolved = ResolvedSchema::resolve(parse(SCHEMA).expect("parse")).expect("resolve");
    let packed = codec(&resolved, "Mixed");
    let aligned = codec(&resolved, "Aligned");
    let packed_buf = filled_buffer(&packed);
    let aligned_buf = filled_buffer(&aligned);

    c.bench_function("read_all_fields_bit_packed", |b| {
        b.iter(|| black_box(sum_all(&packed, black_box(&packed_buf))))
    });

    c.bench_function("read_all_fields_byte_aligned", |b| {
        b.iter(|| black_box(sum_all(&aligned, black_box(&aligned_buf))))
    });

    c.bench_function("write_one_field_bit_packed", |b| {
        let mut buf = packed_buf.clone();
        let len = packed.layout().byte_len();
        b.iter(|| {
            for i in 0..RECORDS {
                let mut record = packed.record_mut_at(&mut buf, i * len).expect("view");
                record.set("e", black_box(4095)).expect("set");
            }
        })
    });

    c.bench_function("encode_record_bit_packed", |b| {
        b.iter(|| {
            black_box(
                packed
                    .encode_record(&[("a", 1), ("b", -1), ("e", 8191), ("f", i32::MIN as i128)])
                    .expect("encode"),
            )
        })
    });
}

criterion_group!(benches, bench_record_access);
criterion_main!(benches);
