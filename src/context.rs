//! Call-sequence validation: which write call is legal next.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteContext {
    Root,
    ObjectExpectName,
    ObjectExpectValue,
    ArrayExpectValue,
}

impl WriteContext {
    fn describe(self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::ObjectExpectName | Self::ObjectExpectValue => "OBJECT",
            Self::ArrayExpectValue => "ARRAY",
        }
    }
}

/// What kind of value a write call is about to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Container,
    Scalar,
}

/// A stack of [`WriteContext`]s, one per open container plus the root.
#[derive(Debug)]
pub(crate) struct ContextStack {
    stack: Vec<WriteContext>,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self {
            stack: vec![WriteContext::Root],
        }
    }
}

impl ContextStack {
    #[inline]
    pub(crate) fn current(&self) -> WriteContext {
        self.stack.last().copied().unwrap_or(WriteContext::Root)
    }

    fn set_current(&mut self, ctx: WriteContext) {
        if let Some(top) = self.stack.last_mut() {
            *top = ctx;
        }
    }

    /// The number of open containers.
    pub(crate) fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Validate that a value may be written now, and record that it was.
    pub(crate) fn write_value(&mut self, kind: ValueKind, what: &str) -> Result<()> {
        match (self.current(), kind) {
            (WriteContext::Root, ValueKind::Container) => Ok(()),
            (WriteContext::Root, ValueKind::Scalar) => Err(Error::protocol_violation(format!(
                "cannot {what} at the top level, expecting a document"
            ))),
            (WriteContext::ObjectExpectName, _) => Err(Error::protocol_violation(format!(
                "cannot {what}, expecting a field name"
            ))),
            (WriteContext::ObjectExpectValue, _) => {
                self.set_current(WriteContext::ObjectExpectName);
                Ok(())
            }
            (WriteContext::ArrayExpectValue, _) => Ok(()),
        }
    }

    pub(crate) fn write_field_name(&mut self) -> Result<()> {
        match self.current() {
            WriteContext::ObjectExpectName => {
                self.set_current(WriteContext::ObjectExpectValue);
                Ok(())
            }
            WriteContext::ObjectExpectValue => Err(Error::protocol_violation(
                "cannot write a field name, expecting a value",
            )),
            ctx => Err(Error::protocol_violation(format!(
                "cannot write a field name, current context is {} rather than OBJECT",
                ctx.describe()
            ))),
        }
    }

    pub(crate) fn push_object(&mut self) {
        self.stack.push(WriteContext::ObjectExpectName);
    }

    pub(crate) fn push_array(&mut self) {
        self.stack.push(WriteContext::ArrayExpectValue);
    }

    /// Validate that the innermost container is an object that may end here, and pop it.
    pub(crate) fn pop_object(&mut self) -> Result<()> {
        match self.current() {
            WriteContext::ObjectExpectName => {
                self.stack.pop();
                Ok(())
            }
            WriteContext::ObjectExpectValue => Err(Error::protocol_violation(
                "cannot end an object, expecting a value for the last field name",
            )),
            ctx => Err(Error::protocol_violation(format!(
                "current context not an OBJECT but {}",
                ctx.describe()
            ))),
        }
    }

    /// Validate that the innermost container is an array, and pop it.
    pub(crate) fn pop_array(&mut self) -> Result<()> {
        match self.current() {
            WriteContext::ArrayExpectValue => {
                self.stack.pop();
                Ok(())
            }
            ctx => Err(Error::protocol_violation(format!(
                "current context not an ARRAY but {}",
                ctx.describe()
            ))),
        }
    }
}
