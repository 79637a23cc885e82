//! HTTP token grammar (RFC 9110 §5.6.2), as used by the Fetch standard for
//! header names and method names.

/// `tchar` lookup table, indexed by byte.
const TCHAR: [bool; 256] = build_tchar_table();

const fn build_tchar_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut b = b'0';
    while b <= b'9' {
        table[b as usize] = true;
        b += 1;
    }
    let mut b = b'a';
    while b <= b'z' {
        table[b as usize] = true;
        table[(b - b'a' + b'A') as usize] = true;
        b += 1;
    }
    let specials = b"!#$%&'*+-.^_`|~";
    let mut i = 0;
    while i < specials.len() {
        table[specials[i] as usize] = true;
        i += 1;
    }
    table
}

/// Reports whether `s` is a non-empty sequence of `tchar` bytes.
#[inline]
#[must_use]
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| TCHAR[b as usize])
}
