//! Fixed limits and conventions of the MBASIC dialect.

/// Largest line number a program may use.
pub const MAX_LINE_NUMBER: u16 = 65529;

/// Strings are capped at 255 bytes; exceeding it raises *String too long*.
pub const MAX_STRING_LEN: usize = 255;

/// File numbers run 1..=15.
pub const MAX_FILE_NUMBER: usize = 15;

/// `PRINT` comma separators advance to the next zone of this width.
pub const PRINT_ZONE_WIDTH: usize = 14;

/// Console width before any `WIDTH` statement.
pub const DEFAULT_WIDTH: usize = 80;

/// Record length assumed by `OPEN` when none is given.
pub const DEFAULT_RECORD_LEN: usize = 128;

/// `LOC` on sequential files reports in blocks of this many bytes.
pub const SEQUENTIAL_BLOCK: usize = 128;

/// Value reported by `FRE(x)`; memory is not modeled.
pub const FRE_REPORT: f64 = 65535.0;

/// `DEF FN` calls deeper than this raise *Out of memory*.
pub const MAX_FN_DEPTH: usize = 100;

/// Result of a true relational or logical expression.
pub const TRUE: f64 = -1.0;

/// Result of a false relational or logical expression.
pub const FALSE: f64 = 0.0;
