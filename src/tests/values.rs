use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use pretty_assertions::assert_eq;

use super::{element, generate_with};
use crate::{
    oid::ObjectId,
    spec::BinarySubtype,
    DateTime,
    GeneratorOptions,
    Regex,
    RegexFlags,
    Timestamp,
};

fn with_header(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![tag, b'v', 0];
    bytes.extend_from_slice(payload);
    bytes
}

fn string_payload(s: &str) -> Vec<u8> {
    let mut bytes = ((s.len() + 1) as i32).to_le_bytes().to_vec();
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    bytes
}

#[test]
fn int32() {
    assert_eq!(element(|g| g.write_i32(-2)), with_header(0x10, &(-2i32).to_le_bytes()));
}

#[test]
fn int64() {
    assert_eq!(
        element(|g| g.write_i64(1 << 40)),
        with_header(0x12, &(1i64 << 40).to_le_bytes())
    );
}

#[test]
fn double() {
    assert_eq!(element(|g| g.write_f64(1.5)), with_header(0x01, &1.5f64.to_le_bytes()));
}

#[test]
fn float_is_widened() {
    assert_eq!(
        element(|g| g.write_f32(0.1)),
        with_header(0x01, &f64::from(0.1f32).to_le_bytes())
    );
}

#[test]
fn boolean_and_null() {
    assert_eq!(element(|g| g.write_bool(true)), vec![0x08, b'v', 0, 1]);
    assert_eq!(element(|g| g.write_bool(false)), vec![0x08, b'v', 0, 0]);
    assert_eq!(element(|g| g.write_null()), vec![0x0A, b'v', 0]);
}

#[test]
fn string_length_counts_utf8_bytes() {
    assert_eq!(
        element(|g| g.write_string("hé")),
        vec![0x02, b'v', 0, 4, 0, 0, 0, b'h', 0xC3, 0xA9, 0]
    );
    assert_eq!(element(|g| g.write_string("")), vec![0x02, b'v', 0, 1, 0, 0, 0, 0]);
}

#[test]
fn datetime() {
    assert_eq!(
        element(|g| g.write_datetime(DateTime::from_millis(1_500))),
        with_header(0x09, &1_500i64.to_le_bytes())
    );
}

#[test]
fn object_id_words_are_big_endian() {
    assert_eq!(
        element(|g| g.write_object_id(ObjectId::from_parts(1, 2, 3))),
        with_header(0x07, &[0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3])
    );

    let oid = ObjectId::parse_str("541b1a00e8a23afa832b218e").unwrap();
    assert_eq!(element(|g| g.write_object_id(oid)), with_header(0x07, &oid.bytes()));
}

#[test]
fn regex_options_are_ordered() {
    let flags = RegexFlags::DOT_ALL | RegexFlags::CASE_INSENSITIVE | RegexFlags::MULTILINE;
    assert_eq!(
        element(|g| g.write_regex(&Regex::new("a+", flags))),
        vec![0x0B, b'v', 0, b'a', b'+', 0, b'i', b'm', b's', 0]
    );
    assert_eq!(
        element(|g| g.write_regex(&Regex::new("", RegexFlags::NONE))),
        vec![0x0B, b'v', 0, 0, 0]
    );
}

#[test]
fn timestamp_increment_comes_first() {
    assert_eq!(
        element(|g| g.write_timestamp(Timestamp { time: 1, increment: 2 })),
        vec![0x11, b'v', 0, 2, 0, 0, 0, 1, 0, 0, 0]
    );
}

#[test]
fn symbol_and_code() {
    assert_eq!(element(|g| g.write_symbol("s")), with_header(0x0E, &string_payload("s")));
    assert_eq!(element(|g| g.write_code("f()")), with_header(0x0D, &string_payload("f()")));
}

#[test]
fn preencoded_number_is_a_string() {
    assert_eq!(
        element(|g| g.write_number_str("1.50")),
        with_header(0x02, &string_payload("1.50"))
    );
}

#[test]
fn binary() {
    assert_eq!(
        element(|g| g.write_binary(BinarySubtype::Generic, &[1, 2])),
        vec![0x05, b'v', 0, 2, 0, 0, 0, 0x00, 1, 2]
    );
    assert_eq!(
        element(|g| g.write_binary(BinarySubtype::UserDefined(0x80), &[])),
        vec![0x05, b'v', 0, 0, 0, 0, 0, 0x80]
    );
}

#[test]
fn binary_range_declares_requested_length() {
    assert_eq!(
        element(|g| g.write_binary_range(BinarySubtype::Generic, &[1, 2, 3, 4], 1, 2)),
        vec![0x05, b'v', 0, 2, 0, 0, 0, 0x00, 2, 3]
    );
    // only the bytes that exist are copied
    assert_eq!(
        element(|g| g.write_binary_range(BinarySubtype::Generic, &[1, 2, 3], 1, 5)),
        vec![0x05, b'v', 0, 5, 0, 0, 0, 0x00, 2, 3]
    );
}

#[test]
fn raw_text_is_utf16_binary() {
    assert_eq!(
        element(|g| g.write_raw_text("hi")),
        vec![0x05, b'v', 0, 4, 0, 0, 0, 0x00, b'h', 0, b'i', 0]
    );
}

#[test]
fn big_integer_picks_the_narrowest_type() {
    let i32_max = BigInt::from(i32::MAX);
    assert_eq!(
        element(|g| g.write_big_integer(&i32_max)),
        with_header(0x10, &i32::MAX.to_le_bytes())
    );
    let i32_min = BigInt::from(i32::MIN);
    assert_eq!(
        element(|g| g.write_big_integer(&i32_min)),
        with_header(0x10, &i32::MIN.to_le_bytes())
    );

    let past_i32 = BigInt::from(i32::MAX) + 1;
    assert_eq!(
        element(|g| g.write_big_integer(&past_i32)),
        with_header(0x12, &(i64::from(i32::MAX) + 1).to_le_bytes())
    );
    let i64_min = BigInt::from(i64::MIN);
    assert_eq!(
        element(|g| g.write_big_integer(&i64_min)),
        with_header(0x12, &i64::MIN.to_le_bytes())
    );

    let past_i64 = BigInt::from(i64::MAX) + 1;
    assert_eq!(
        element(|g| g.write_big_integer(&past_i64)),
        with_header(0x02, &string_payload("9223372036854775808"))
    );
    let wide = BigInt::from(1) << 64u32;
    assert_eq!(
        element(|g| g.write_big_integer(&wide)),
        with_header(0x02, &string_payload("18446744073709551616"))
    );
}

#[test]
fn big_decimal_prefers_float_then_double() {
    let exact = BigDecimal::from_str("1.5").unwrap();
    assert_eq!(
        element(|g| g.write_big_decimal(&exact)),
        with_header(0x01, &1.5f64.to_le_bytes())
    );

    let too_big_for_f32 = BigDecimal::from_str("1e100").unwrap();
    let expected = too_big_for_f32.to_f64().unwrap();
    assert_eq!(
        element(|g| g.write_big_decimal(&too_big_for_f32)),
        with_header(0x01, &expected.to_le_bytes())
    );

    let too_big_for_f64 = BigDecimal::from_str("1e400").unwrap();
    assert_eq!(
        element(|g| g.write_big_decimal(&too_big_for_f64)),
        with_header(0x02, &string_payload(&too_big_for_f64.to_string()))
    );
}

#[test]
fn big_decimal_as_string() {
    let options = GeneratorOptions::builder()
        .force_decimals_as_strings(true)
        .build();
    let value = BigDecimal::from_str("1.5").unwrap();
    let bytes = generate_with(options, |g| {
        g.begin_document()?;
        g.write_field_name("v")?;
        g.write_big_decimal(&value)?;
        g.end_document()
    });
    assert_eq!(&bytes[4..bytes.len() - 1], &with_header(0x02, &string_payload("1.5"))[..]);
}
