//! The file table entry: an open handle plus, for RANDOM files, the field
//! buffer that `FIELD`/`LSET`/`RSET`/`GET`/`PUT` operate on.

use crate::io::{FileHandle, FileMode};

/// One window of a field buffer, published as a string variable.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    /// Scalar-store key of the field variable.
    pub key: String,
    pub offset: usize,
    pub width: usize,
}

pub struct FileEntry {
    pub handle: Box<dyn FileHandle>,
    pub mode: FileMode,
    /// Record length `GET`/`PUT` use; `FIELD` resizes it to the summed
    /// field widths.
    pub record_len: usize,
    /// Record length given to `OPEN`; the ceiling a `FIELD` layout may use.
    pub open_record_len: usize,
    /// Record workspace; allocated by `FIELD`.
    pub buffer: Vec<u8>,
    pub fields: Vec<FieldDef>,
    /// Last record touched by `GET`/`PUT` (1-based; 0 before any access).
    pub current_record: usize,
    /// Column counter for `PRINT #` comma zones on this file.
    pub column: usize,
}

impl FileEntry {
    pub fn new(handle: Box<dyn FileHandle>, mode: FileMode, record_len: usize) -> FileEntry {
        FileEntry {
            handle,
            mode,
            record_len,
            open_record_len: record_len,
            buffer: Vec::new(),
            fields: Vec::new(),
            current_record: 0,
            column: 0,
        }
    }

    /// Installs a `FIELD` layout: a space-filled buffer of the summed
    /// widths, which also becomes the record length from here on.
    pub fn set_fields(&mut self, fields: Vec<FieldDef>) {
        let total: usize = fields.iter().map(|f| f.width).sum();
        self.buffer = vec![b' '; total];
        self.fields = fields;
        self.record_len = total;
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn window(&self, field: &FieldDef) -> &[u8] {
        &self.buffer[field.offset..field.offset + field.width]
    }

    /// Writes `data` into a field's window, left- or right-justified and
    /// space-padded to the field width.
    pub fn store_field(&mut self, field: &FieldDef, data: &[u8], right_justify: bool) {
        let window = &mut self.buffer[field.offset..field.offset + field.width];
        for b in window.iter_mut() {
            *b = b' ';
        }
        let take = data.len().min(field.width);
        if right_justify {
            let start = field.width - take;
            window[start..].copy_from_slice(&data[..take]);
        } else {
            window[..take].copy_from_slice(&data[..take]);
        }
    }
}
