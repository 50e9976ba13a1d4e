// Symbols and the decoded symbol stream.
//
// A symbol is one pair of bits read from a single input line ("00", "01",
// "10", "11"). Its integer code is `b1 + 2*b0`, so the code order matches the
// lexicographic order of the two-character text form.
//
// `SymbolStream::decode` splits raw input on '\n' and keeps only lines that
// are exactly two '0'/'1' characters; a line still carrying a '\r' is three
// bytes long and therefore malformed. Anything else is skipped without error;
// the stream only remembers how many lines it dropped so the caller can log
// it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded 2-bit unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    b0: bool,
    b1: bool,
}

impl Symbol {
    /// Number of distinct symbol values.
    pub const COUNT: usize = 4;

    /// The "00" symbol.
    pub const ZERO: Symbol = Symbol { b0: false, b1: false };

    pub const fn new(b0: bool, b1: bool) -> Self {
        Symbol { b0, b1 }
    }

    /// Build a symbol from its integer code (`b1 + 2*b0`). Returns `None` for
    /// codes above 3.
    pub fn from_code(code: u8) -> Option<Self> {
        if code >= Self::COUNT as u8 {
            return None;
        }
        Some(Symbol {
            b0: code & 0b10 != 0,
            b1: code & 0b01 != 0,
        })
    }

    /// Parse one raw line. Only the exact forms "00", "01", "10" and "11"
    /// are accepted.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let bit = |c: u8| match c {
            b'0' => Some(false),
            b'1' => Some(true),
            _ => None,
        };
        match line {
            [a, b] => Some(Symbol {
                b0: bit(*a)?,
                b1: bit(*b)?,
            }),
            _ => None,
        }
    }

    /// First bit (leftmost character on the input line).
    pub fn b0(self) -> bool {
        self.b0
    }

    /// Second bit.
    pub fn b1(self) -> bool {
        self.b1
    }

    /// Integer code `b1 + 2*b0`, in `0..=3`.
    pub fn code(self) -> u8 {
        u8::from(self.b1) + 2 * u8::from(self.b0)
    }

    /// Code as an index into 4-element arrays.
    pub fn index(self) -> usize {
        self.code() as usize
    }

    /// All four symbols in code order.
    pub fn all() -> [Symbol; 4] {
        [
            Symbol::new(false, false),
            Symbol::new(false, true),
            Symbol::new(true, false),
            Symbol::new(true, true),
        ]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", u8::from(self.b0), u8::from(self.b1))
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> String {
        symbol.to_string()
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(value.as_bytes()).ok_or_else(|| format!("invalid symbol {value:?}"))
    }
}

/// An ordered, finite sequence of accepted symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolStream {
    symbols: Vec<Symbol>,
    /// Lines that were not exactly two binary characters. The empty fragment
    /// after a trailing newline is not counted.
    skipped: usize,
}

impl SymbolStream {
    /// Decode newline-separated input.
    pub fn decode(data: &[u8]) -> Self {
        let mut stream = SymbolStream::default();
        let mut lines = data.split(|&b| b == b'\n').peekable();
        let mut line_number = 0usize;
        while let Some(line) = lines.next() {
            line_number += 1;
            match Symbol::parse(line) {
                Some(symbol) => stream.symbols.push(symbol),
                None if line.is_empty() && lines.peek().is_none() => {}
                None => {
                    tracing::debug!(line_number, len = line.len(), "skipping malformed line");
                    stream.skipped += 1;
                }
            }
        }
        stream
    }

    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        SymbolStream {
            symbols,
            skipped: 0,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of malformed lines dropped during decoding.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }
}
