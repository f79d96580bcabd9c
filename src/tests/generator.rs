use std::{
    io::{self, Write},
    sync::Arc,
};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::{declared_length, generate, generate_with};
use crate::{
    error::{ErrorKind, Result},
    escape::{AsciiEscapes, EscapeCode},
    Generator,
    GeneratorOptions,
};

#[test]
fn empty_document() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.end_document()
    });
    assert_eq!(bytes, vec![5, 0, 0, 0, 0]);
}

#[test]
fn single_int32_field() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.write_i32(1)?;
        g.end_document()
    });
    assert_eq!(bytes, vec![0x0C, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]);
}

#[test]
fn array_elements_get_index_keys() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("arr")?;
        g.begin_array()?;
        g.write_bool(true)?;
        g.write_null()?;
        g.end_array()?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            22, 0, 0, 0, 0x04, b'a', b'r', b'r', 0, 12, 0, 0, 0, 0x08, b'0', 0, 1, 0x0A, b'1', 0,
            0, 0,
        ]
    );
}

#[test]
fn array_keys_continue_past_nine() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.begin_array()?;
        for i in 0..11 {
            g.write_i32(i)?;
        }
        g.end_array()?;
        g.end_document()
    });
    assert!(bytes.windows(4).any(|w| w == [0x10, b'1', b'0', 0]));
    assert!(!bytes.windows(4).any(|w| w == [0x10, b'1', b'1', 0]));
}

#[test]
fn array_keys_restart_in_nested_arrays() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.begin_array()?;
        g.begin_array()?;
        g.write_bool(false)?;
        g.end_array()?;
        g.write_bool(true)?;
        g.end_array()?;
        g.end_document()
    });
    // inner array: 4 + ("0": bool) + 1
    let inner = [9, 0, 0, 0, 0x08, b'0', 0, 0, 0];
    let mut outer = vec![4 + 3 + 9 + 4 + 1, 0, 0, 0, 0x04, b'0', 0];
    outer.extend_from_slice(&inner);
    outer.extend_from_slice(&[0x08, b'1', 0, 1, 0]);
    assert_eq!(&bytes[7..bytes.len() - 1], &outer[..]);
}

#[test]
fn nested_lengths_are_backpatched() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.begin_document()?;
        g.write_field_name("b")?;
        g.begin_document()?;
        g.end_document()?;
        g.end_document()?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            21, 0, 0, 0, 0x03, b'a', 0, 13, 0, 0, 0, 0x03, b'b', 0, 5, 0, 0, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn sequential_top_level_documents() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.end_document()?;
        g.begin_document()?;
        g.end_document()
    });
    assert_eq!(bytes, vec![5, 0, 0, 0, 0, 5, 0, 0, 0, 0]);
}

#[test]
fn field_and_element_slots() {
    let expected = generate(|g| {
        g.begin_document()?;
        g.write_field_name("n")?;
        g.write_i64(5)?;
        g.write_field_name("tags")?;
        g.begin_array()?;
        g.write_string("x")?;
        g.end_array()?;
        g.end_document()
    });
    let bytes = generate(|g| {
        g.begin_document()?;
        g.field("n")?.write_i64(5)?;
        g.field("tags")?.begin_array()?;
        g.element()?.write_string("x")?;
        g.end_array()?;
        g.end_document()
    });
    assert_eq!(bytes, expected);
}

#[test]
fn code_with_scope_lengths() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("f")?;
        g.write_code_with_scope("x", &1, &|y: &i32, g: &mut Generator<Vec<u8>>| -> Result<()> {
            g.write_field_name("y")?;
            g.write_i32(*y)
        })?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            30, 0, 0, 0, 0x0F, b'f', 0, 22, 0, 0, 0, 2, 0, 0, 0, b'x', 0, 12, 0, 0, 0, 0x10, b'y',
            0, 1, 0, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn code_with_scope_as_array_element() {
    let bytes = generate(|g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.begin_array()?;
        let empty = |_: &(), _: &mut Generator<Vec<u8>>| -> Result<()> { Ok(()) };
        g.write_code_with_scope("", &(), &empty)?;
        g.end_array()?;
        g.end_document()
    });
    assert_eq!(declared_length(&bytes), bytes.len());
    // "0" key, then 4 (total) + 5 (empty code) + 5 (empty scope)
    assert_eq!(&bytes[11..18], &[0x0F, b'0', 0, 14, 0, 0, 0]);
}

#[test]
fn unbalanced_scope_is_rejected() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("f").unwrap();
    let err = g
        .write_code_with_scope("", &(), &|_: &(), g: &mut Generator<Vec<u8>>| {
            g.write_field_name("inner")?;
            g.begin_document()
        })
        .unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(err.to_string().contains("unbalanced"));
}

#[test]
fn value_where_name_expected() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    let err = g.write_i32(1).unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(err.to_string().contains("expecting a field name"), "{err}");
}

#[test]
fn two_names_in_a_row() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    let err = g.write_field_name("b").unwrap_err();
    assert!(err.is_protocol_violation());
    assert_eq!(err.key.as_deref(), Some("b"));
}

#[test]
fn name_inside_array() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.begin_array().unwrap();
    let err = g.write_field_name("x").unwrap_err();
    assert!(err.to_string().contains("ARRAY"), "{err}");
}

#[test]
fn scalar_at_top_level() {
    let mut g = Generator::new(Vec::new());
    let err = g.write_string("x").unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(err.to_string().contains("top level"), "{err}");
}

#[test]
fn element_outside_array() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    assert!(g.element().is_err());
}

#[test]
fn mismatched_end() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    let err = g.end_array().unwrap_err();
    assert!(err.to_string().contains("not an ARRAY but OBJECT"), "{err}");

    let mut g = Generator::new(Vec::new());
    g.begin_array().unwrap();
    let err = g.end_document().unwrap_err();
    assert!(err.to_string().contains("not an OBJECT but ARRAY"), "{err}");
}

#[test]
fn end_without_begin() {
    let mut g = Generator::new(Vec::new());
    let err = g.end_document().unwrap_err();
    assert!(err.to_string().contains("ROOT"), "{err}");
}

#[test]
fn end_with_a_dangling_field_name() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    let err = g.end_document().unwrap_err();
    assert!(err.is_protocol_violation());
}

#[test]
fn errors_poison_the_session() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_i32(1).unwrap_err();

    let err = g.write_field_name("a").unwrap_err();
    assert!(err.to_string().contains("earlier error"), "{err}");

    g.close().unwrap();
    assert!(g.get_ref().is_empty());
}

#[test]
fn close_ends_open_containers() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.begin_array().unwrap();
    g.write_i32(1).unwrap();
    assert_eq!(g.depth(), 2);
    g.close().unwrap();

    let bytes = g.into_inner();
    assert_eq!(bytes.len(), 20);
    assert_eq!(declared_length(&bytes), 20);
    assert_eq!(declared_length(&bytes[7..]), 12);
    assert_eq!(&bytes[18..], &[0, 0]);
}

#[test]
fn close_without_auto_close() {
    let options = GeneratorOptions::builder().auto_close_content(false).build();
    let bytes = generate_with(options, |g| g.begin_document());
    assert_eq!(bytes, vec![0, 0, 0, 0]);
}

#[test]
fn close_is_idempotent() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.end_document().unwrap();
    g.close().unwrap();
    g.close().unwrap();
    assert_eq!(g.get_ref().len(), 5);

    assert!(g.begin_document().unwrap_err().to_string().contains("closed"));
    assert!(g.flush().is_err());
}

#[test]
fn flush_before_end_prevents_backpatching() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.write_i32(1).unwrap();
    g.flush().unwrap();
    assert_eq!(g.get_ref().len(), 11);

    let err = g.end_document().unwrap_err();
    assert_matches!(err.kind, ErrorKind::FlushedRegion { offset: 0, .. });
}

#[test]
fn nothing_reaches_the_sink_before_close() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.end_document().unwrap();
    assert!(g.get_ref().is_empty());
    assert_eq!(g.buffered(), &[5, 0, 0, 0, 0]);
}

#[test]
fn storage_is_handed_back_for_reuse() {
    let options = GeneratorOptions::builder().reuse_buffers(true).build();
    let mut g = Generator::with_options(Vec::new(), options.clone());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.write_i32(1).unwrap();
    g.end_document().unwrap();
    g.close().unwrap();
    let (first, storage) = g.into_parts();
    assert!(storage.is_empty());
    assert!(storage.capacity() >= 12);

    let mut g = Generator::with_storage(Vec::new(), options, storage);
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.write_i32(1).unwrap();
    g.end_document().unwrap();
    g.close().unwrap();
    assert_eq!(g.into_inner(), first);
}

#[test]
fn interior_null_in_field_name() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    let err = g.write_field_name("a\0b").unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidCString(_));
    assert_eq!(err.key.as_deref(), Some("a\0b"));
}

#[test]
fn escapes_apply_to_names_and_strings() {
    let bytes = generate(|g| {
        g.set_character_escapes(Some(Arc::new(AsciiEscapes::new().with_escape('.', "_"))));
        g.begin_document()?;
        g.write_field_name("a.b")?;
        g.write_string("x.y")?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            18, 0, 0, 0, 0x02, b'a', b'_', b'b', 0, 4, 0, 0, 0, b'x', b'_', b'y', 0, 0,
        ]
    );
}

#[test]
fn escapes_skip_preencoded_strings() {
    let bytes = generate(|g| {
        g.set_character_escapes(Some(Arc::new(AsciiEscapes::new().with_escape('.', "_"))));
        g.begin_document()?;
        g.write_field_name("v")?;
        g.write_utf8_string(b"x.y")?;
        g.end_document()
    });
    assert!(bytes.windows(3).any(|w| w == b"x.y"));
}

#[test]
fn escape_without_sequence() {
    let mut g = Generator::new(Vec::new());
    g.set_character_escapes(Some(Arc::new(
        AsciiEscapes::new().with_code('$', EscapeCode::Custom),
    )));
    assert!(g.character_escapes().is_some());
    g.begin_document().unwrap();
    let err = g.write_field_name("$x").unwrap_err();
    assert_matches!(err.kind, ErrorKind::EscapeConfiguration { character: '$', .. });
    assert_eq!(err.key.as_deref(), Some("$x"));
}

#[test]
fn invalid_utf8_string() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    g.write_field_name("v").unwrap();
    let err = g.write_utf8_string(&[0x66, 0xFF]).unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidUtf8);
}

#[test]
fn dropped_field_slot_fails_the_session() {
    let mut g = Generator::new(Vec::new());
    g.begin_document().unwrap();
    drop(g.field("a").unwrap());

    let err = g.write_field_name("b").unwrap_err();
    assert!(err.is_protocol_violation());
    assert!(err.to_string().contains("earlier error"), "{err}");

    g.close().unwrap();
    assert!(g.get_ref().is_empty());
}

#[test]
fn dropped_element_slot_fails_the_session() {
    let mut g = Generator::new(Vec::new());
    g.begin_array().unwrap();
    drop(g.element().unwrap());
    assert!(g.end_array().unwrap_err().is_protocol_violation());
}

/// A sink that rejects every write.
struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_error_on_close() {
    let mut g = Generator::new(BrokenSink);
    g.begin_document().unwrap();
    g.end_document().unwrap();

    let err = g.close().unwrap_err();
    assert!(err.is_io(), "{err}");

    assert!(g.begin_document().unwrap_err().is_protocol_violation());
    g.close().unwrap();
}

#[test]
fn sink_error_while_streaming() {
    let options = GeneratorOptions::builder().enable_streaming(true).build();
    let mut g = Generator::with_options(BrokenSink, options);
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();

    let err = g.write_i32(1).unwrap_err();
    assert!(err.is_io(), "{err}");

    let err = g.write_field_name("b").unwrap_err();
    assert!(err.is_protocol_violation());
    g.close().unwrap();
    g.close().unwrap();
}
