//! Bookkeeping for open documents and arrays: where each reserved length field lives, and which
//! key the next array element gets.

/// A document or array whose end has not been written yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenContainer {
    /// Absolute buffer offset of the reserved 4-byte length field.
    pub(crate) header_offset: usize,

    /// The index of the next element, or `None` if this is not an array.
    pub(crate) array_index: Option<usize>,
}

impl OpenContainer {
    pub(crate) fn is_array(&self) -> bool {
        self.array_index.is_some()
    }

    /// The number of bytes from the length field through the end marker, given the offset just
    /// past the end marker.
    pub(crate) fn length(&self, end: usize) -> usize {
        end - self.header_offset
    }
}

#[derive(Debug, Default)]
pub(crate) struct DocumentStack {
    open: Vec<OpenContainer>,
}

impl DocumentStack {
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    pub(crate) fn top(&self) -> Option<&OpenContainer> {
        self.open.last()
    }

    /// If the innermost container is an array, return the key of its next element and advance
    /// the index.
    pub(crate) fn next_array_key(&mut self) -> Option<usize> {
        let top = self.open.last_mut()?;
        let index = top.array_index?;
        top.array_index = Some(index + 1);
        Some(index)
    }

    pub(crate) fn open(&mut self, header_offset: usize, is_array: bool) {
        self.open.push(OpenContainer {
            header_offset,
            array_index: is_array.then_some(0),
        });
    }

    pub(crate) fn close(&mut self) -> Option<OpenContainer> {
        self.open.pop()
    }
}
