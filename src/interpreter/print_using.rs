//! `PRINT USING` field formatting: expands a format string field by field
//! over the value list, cycling the format when values remain.

use crate::error::{ErrorCode, ExecResult};
use crate::value::{bytes_to_text, Value};

#[derive(Default)]
struct Numeric {
    lead_plus: bool,
    trail_plus: bool,
    trail_minus: bool,
    dollar: bool,
    asterisk: bool,
    commas: bool,
    decimal: bool,
    digits_before: usize,
    digits_after: usize,
    exponent: bool,
    width: usize,
}

enum Field {
    Numeric(Numeric),
    /// `!` — first character of the string.
    StringSingle,
    /// `\ .. \` — fixed width, left-justified.
    StringFixed(usize),
    /// `&` — the string unchanged.
    StringAll,
}

fn parse_numeric(format: &[u8], start: usize) -> Option<(Numeric, usize)> {
    let len = format.len();
    let mut n = Numeric::default();
    let mut j = start;

    if j < len && format[j] == b'+' {
        n.lead_plus = true;
        n.width += 1;
        j += 1;
    }
    if j + 1 < len && format[j] == b'*' && format[j + 1] == b'*' {
        n.asterisk = true;
        n.width += 2;
        n.digits_before += 2;
        j += 2;
        if j < len && format[j] == b'$' {
            n.dollar = true;
            n.width += 1;
            j += 1;
        }
    } else if j + 1 < len && format[j] == b'$' && format[j + 1] == b'$' {
        n.dollar = true;
        n.width += 2;
        n.digits_before += 1;
        j += 2;
    }
    while j < len && (format[j] == b'#' || format[j] == b',') {
        if format[j] == b',' {
            n.commas = true;
        } else {
            n.digits_before += 1;
        }
        n.width += 1;
        j += 1;
    }
    if j < len && format[j] == b'.' {
        let digits_follow = j + 1 < len && format[j + 1] == b'#';
        if digits_follow || n.digits_before > 0 {
            n.decimal = true;
            n.width += 1;
            j += 1;
            while j < len && format[j] == b'#' {
                n.digits_after += 1;
                n.width += 1;
                j += 1;
            }
        }
    }
    if n.digits_before + n.digits_after == 0 {
        return None;
    }
    if format[j..].starts_with(b"^^^^") {
        n.exponent = true;
        n.width += 4;
        j += 4;
    }
    if j < len && format[j] == b'+' && !n.lead_plus {
        n.trail_plus = true;
        n.width += 1;
        j += 1;
    } else if j < len && format[j] == b'-' {
        n.trail_minus = true;
        n.width += 1;
        j += 1;
    }
    Some((n, j))
}

/// Collects literal text from `from` up to the next field (or the end).
fn next_field(format: &[u8], from: usize) -> (String, Option<(Field, usize)>) {
    let len = format.len();
    let mut literal = String::new();
    let mut i = from;
    while i < len {
        match format[i] {
            b'_' => {
                if i + 1 < len {
                    literal.push(char::from(format[i + 1]));
                    i += 2;
                } else {
                    literal.push('_');
                    i += 1;
                }
            }
            b'!' => return (literal, Some((Field::StringSingle, i + 1))),
            b'&' => return (literal, Some((Field::StringAll, i + 1))),
            b'\\' => match format[i + 1..].iter().position(|&b| b == b'\\') {
                Some(gap) => {
                    return (literal, Some((Field::StringFixed(gap + 2), i + gap + 2)));
                }
                None => {
                    literal.push('\\');
                    i += 1;
                }
            },
            c => match parse_numeric(format, i) {
                Some((numeric, next)) => {
                    return (literal, Some((Field::Numeric(numeric), next)));
                }
                None => {
                    literal.push(char::from(c));
                    i += 1;
                }
            },
        }
    }
    (literal, None)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn format_numeric(n: &Numeric, value: &Value) -> ExecResult<String> {
    if value.is_string() {
        return Err(ErrorCode::TypeMismatch.into());
    }
    let x = value.to_number();
    let negative = x < 0.0;

    let body = if n.exponent {
        let magnitude = x.abs();
        let slots = n.digits_before.max(1) as i32;
        let mut shift = if magnitude == 0.0 {
            0
        } else {
            magnitude.log10().floor() as i32 - (slots - 1)
        };
        let mut mantissa = magnitude / 10f64.powi(shift);
        // Rounding may carry into one more digit; renormalize once.
        if format!("{:.*}", n.digits_after, mantissa)
            .split('.')
            .next()
            .map(|s| s.len() as i32 > slots)
            .unwrap_or(false)
        {
            shift += 1;
            mantissa = magnitude / 10f64.powi(shift);
        }
        let mut text = format!("{:.*}", n.digits_after, mantissa);
        if n.decimal && n.digits_after == 0 {
            text.push('.');
        }
        let sign = if shift < 0 { '-' } else { '+' };
        format!("{}E{}{:02}", text, sign, shift.abs())
    } else {
        let rounded = format!("{:.*}", n.digits_after, x.abs());
        let mut parts = rounded.splitn(2, '.');
        let int_part = parts.next().unwrap_or("0");
        let frac_part = parts.next().unwrap_or("");
        let mut text = if n.commas {
            group_thousands(int_part)
        } else {
            int_part.to_string()
        };
        if n.decimal {
            text.push('.');
            text.push_str(frac_part);
        }
        text
    };

    let mut prefix = String::new();
    let mut suffix = String::new();
    if negative {
        if n.trail_minus {
            suffix.push('-');
        } else {
            prefix.push('-');
        }
    } else if n.lead_plus {
        prefix.push('+');
    } else if n.trail_plus {
        suffix.push('+');
    } else if n.trail_minus {
        suffix.push(' ');
    }
    if n.dollar {
        prefix.push('$');
    }

    let full = format!("{}{}{}", prefix, body, suffix);
    if full.len() > n.width {
        // Overflow indicator: the value refuses to fit its field.
        return Ok(format!("%{}", full));
    }
    let pad = if n.asterisk { "*" } else { " " };
    Ok(format!("{}{}", pad.repeat(n.width - full.len()), full))
}

fn format_field(field: &Field, value: &Value) -> ExecResult<String> {
    if let Field::Numeric(numeric) = field {
        return format_numeric(numeric, value);
    }
    let bytes = value.as_bytes()?;
    Ok(match field {
        Field::StringSingle => bytes
            .first()
            .map(|&b| char::from(b).to_string())
            .unwrap_or_else(|| " ".to_string()),
        Field::StringFixed(width) => {
            let mut text = bytes_to_text(&bytes[..(*width).min(bytes.len())]);
            while text.len() < *width {
                text.push(' ');
            }
            text
        }
        Field::StringAll => bytes_to_text(bytes),
        Field::Numeric(_) => unreachable!(),
    })
}

/// Renders `values` through `format`. The format cycles when more values
/// remain; a format with no field at all is an *Illegal function call*.
pub fn format_using(format: &[u8], values: &[Value]) -> ExecResult<String> {
    let mut out = String::new();
    if values.is_empty() {
        let (literal, _) = next_field(format, 0);
        out.push_str(&literal);
        return Ok(out);
    }

    let mut pos = 0;
    let mut index = 0;
    let mut wrapped = false;
    while index < values.len() {
        let (literal, field) = next_field(format, pos);
        match field {
            Some((field, next)) => {
                out.push_str(&literal);
                out.push_str(&format_field(&field, &values[index])?);
                index += 1;
                pos = next;
                wrapped = false;
            }
            None => {
                if pos == 0 || wrapped {
                    return Err(ErrorCode::IllegalFunctionCall.into());
                }
                out.push_str(&literal);
                pos = 0;
                wrapped = true;
            }
        }
    }
    let (trailing, _) = next_field(format, pos);
    out.push_str(&trailing);
    Ok(out)
}
