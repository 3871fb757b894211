//! Helpers for programs that talk in ASCII.
//!
//! Many Intcode programs exchange text with their caller: each character travels as its ASCII
//! code, one value per input or output instruction, and lines are terminated by `10`. Values
//! outside of the ASCII range usually carry a final numeric answer instead of text.

/// Encodes `text` as a sequence of input values, one per byte.
///
/// No newline is appended. See [`encode_line`] for that.
pub fn encode(text: &str) -> impl Iterator<Item = i64> + '_ {
    text.bytes().map(i64::from)
}

/// Encodes `line` followed by a newline.
pub fn encode_line(line: &str) -> impl Iterator<Item = i64> + '_ {
    encode(line).chain(std::iter::once(i64::from(b'\n')))
}

/// Returns whether `value` is the code of an ASCII character.
#[inline(always)]
pub fn is_ascii(value: i64) -> bool {
    (0..=127).contains(&value)
}

/// Splits output values into the text they spell and the values that are not ASCII codes.
///
/// Both parts keep the order in which values were emitted.
pub fn decode(values: &[i64]) -> (String, Vec<i64>) {
    let mut text = String::new();
    let mut others = Vec::new();

    for &value in values {
        match u8::try_from(value) {
            Ok(byte) if byte.is_ascii() => text.push(char::from(byte)),
            _ => others.push(value),
        }
    }

    (text, others)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lines() {
        let values: Vec<i64> = encode_line("NOT A J").collect();
        assert_eq!(values, [78, 79, 84, 32, 65, 32, 74, 10]);
    }

    #[test]
    fn separates_text_from_numbers() {
        let (text, others) = decode(&[35, 46, 10, 19_348_840, -1, 128]);
        assert_eq!(text, "#.\n");
        assert_eq!(others, [19_348_840, -1, 128]);
        assert!(others.iter().all(|&value| !is_ascii(value)));
    }
}
