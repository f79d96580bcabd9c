use pretty_assertions::assert_eq;

use super::generate_with;
use crate::{error::Result, Generator, GeneratorOptions};

fn streaming() -> GeneratorOptions {
    GeneratorOptions::builder().enable_streaming(true).build()
}

#[test]
fn lengths_stay_zero_at_every_depth() {
    let bytes = generate_with(streaming(), |g| {
        g.begin_document()?;
        g.write_field_name("a")?;
        g.begin_document()?;
        g.write_field_name("b")?;
        g.write_i32(1)?;
        g.end_document()?;
        g.write_field_name("c")?;
        g.begin_array()?;
        g.end_array()?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            0, 0, 0, 0, 0x03, b'a', 0, 0, 0, 0, 0, 0x10, b'b', 0, 1, 0, 0, 0, 0, 0x04, b'c', 0, 0,
            0, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn code_with_scope_length_stays_zero() {
    let bytes = generate_with(streaming(), |g| {
        g.begin_document()?;
        g.write_field_name("f")?;
        let scope = |_: &(), _: &mut Generator<Vec<u8>>| -> Result<()> { Ok(()) };
        g.write_code_with_scope("x", &(), &scope)?;
        g.end_document()
    });
    assert_eq!(
        bytes,
        vec![
            0, 0, 0, 0, 0x0F, b'f', 0, 0, 0, 0, 0, 2, 0, 0, 0, b'x', 0, 0, 0, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn every_value_is_flushed() {
    let mut g = Generator::with_options(Vec::new(), streaming());
    g.begin_document().unwrap();
    g.write_field_name("a").unwrap();
    g.write_i32(1).unwrap();
    assert_eq!(g.get_ref().len(), 11);
    assert!(g.buffered().is_empty());

    g.end_document().unwrap();
    assert_eq!(g.get_ref().len(), 12);
    g.close().unwrap();
    assert_eq!(g.get_ref().len(), 12);
}

#[test]
fn streaming_reuses_buffers_by_default() {
    assert!(streaming().reuse_buffers());
    assert!(!GeneratorOptions::default().reuse_buffers());
    let options = GeneratorOptions::builder()
        .enable_streaming(true)
        .reuse_buffers(false)
        .build();
    assert!(!options.reuse_buffers());
}

#[test]
fn only_lengths_differ_from_buffered_output() {
    fn write(g: &mut Generator<Vec<u8>>) -> Result<()> {
        g.begin_document()?;
        g.write_field_name("s")?;
        g.write_string("text")?;
        g.write_field_name("n")?;
        g.write_i64(7)?;
        g.end_document()
    }

    let mut buffered = generate_with(GeneratorOptions::default(), write);
    let streamed = generate_with(streaming(), write);
    buffered[..4].fill(0);
    assert_eq!(buffered, streamed);
}
