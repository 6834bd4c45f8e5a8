//! Reversible escaping of member names inside operation descriptors.
//!
//! Characters that carry meaning in the descriptor encoding (and in host
//! method names) are replaced by `\` followed by a mnemonic. The empty name is
//! encoded as `\=`. Decoding keeps unknown mnemonics literally.

const ESCAPE_CHAR: char = '\\';
const EMPTY_NAME: &str = "\\=";

const ENCODINGS: [(char, char); 10] = [
    ('/', '|'),
    ('.', ','),
    (';', '?'),
    ('$', '%'),
    ('<', '^'),
    ('>', '_'),
    ('[', '{'),
    (']', '}'),
    (':', '!'),
    ('\\', '-'),
];

fn mnemonic_for(c: char) -> Option<char> {
    ENCODINGS.iter().find(|(raw, _)| *raw == c).map(|(_, m)| *m)
}

fn char_for(m: char) -> Option<char> {
    ENCODINGS.iter().find(|(_, mnemonic)| *mnemonic == m).map(|(raw, _)| *raw)
}

pub fn encode(name: &str) -> String {
    if name.is_empty() {
        return EMPTY_NAME.to_string();
    }
    let mut encoded = String::with_capacity(name.len());
    for c in name.chars() {
        match mnemonic_for(c) {
            Some(m) => {
                encoded.push(ESCAPE_CHAR);
                encoded.push(m);
            }
            None => encoded.push(c),
        }
    }
    encoded
}

pub fn decode(name: &str) -> String {
    if name == EMPTY_NAME {
        return String::new();
    }
    let mut decoded = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE_CHAR {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some(m) => match char_for(m) {
                Some(raw) => decoded.push(raw),
                None => {
                    decoded.push(ESCAPE_CHAR);
                    decoded.push(m);
                }
            },
            None => decoded.push(ESCAPE_CHAR),
        }
    }
    decoded
}
