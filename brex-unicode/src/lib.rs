//! Codepoint model for the brex regex engine.
/*!
## Features
- Closed codepoint [ranges](ranges) with the set algebra automaton
  construction needs (normalize, complement, alphabet partitions)
- Fast [ASCII](ascii) validation scans
- [UTF-8](utf8) decoding into codepoint sequences with error offsets
*/
pub mod ascii;
pub mod ranges;
pub mod utf8;

/// A single codepoint. A Unicode scalar value in Unicode mode, a byte value
/// in `[0, 127]` in ASCII mode.
pub type CodePoint = u32;

/// The largest codepoint of the Unicode alphabet.
pub const MAX_UNICODE_CP: CodePoint = 0x10FFFF;

/// The largest codepoint of the ASCII alphabet.
pub const MAX_ASCII_CP: CodePoint = 0x7F;
