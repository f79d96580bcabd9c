use std::io::Write;

use super::Generator;
use crate::error::Result;

/// Writes the scope of a code-with-scope value.
///
/// By the time [`serialize_scope`](ScopeSerializer::serialize_scope) is called, the generator has
/// already opened the scope document; the implementation writes its field names and values and
/// returns without ending it.
///
/// Any `Fn(&T, &mut Generator<W>) -> Result<()>` is a `ScopeSerializer`:
///
/// ```
/// use bson_generator::{error::Result, Generator};
///
/// let mut generator = Generator::new(Vec::new());
/// generator.begin_document()?;
/// generator.write_field_name("f")?;
/// generator.write_code_with_scope("x + 1", &1, &|x: &i32, g: &mut Generator<Vec<u8>>| -> Result<()> {
///     g.write_field_name("x")?;
///     g.write_i32(*x)
/// })?;
/// generator.end_document()?;
/// # Ok::<(), bson_generator::error::Error>(())
/// ```
pub trait ScopeSerializer<T: ?Sized, W: Write> {
    fn serialize_scope(&self, scope: &T, generator: &mut Generator<W>) -> Result<()>;
}

impl<T, W, F> ScopeSerializer<T, W> for F
where
    T: ?Sized,
    W: Write,
    F: Fn(&T, &mut Generator<W>) -> Result<()>,
{
    fn serialize_scope(&self, scope: &T, generator: &mut Generator<W>) -> Result<()> {
        self(scope, generator)
    }
}
