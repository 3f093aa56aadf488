// Copyright (c) 2026 rezky_nightky

use rand::Rng;

const BINARY: &[&str] = &["0", "1"];
const BINARY_WEIGHT: usize = 3;

const PUNCTUATION: &[&str] = &[
    "{", "}", "[", "]", "(", ")", "<", ">", ";", ":", "=", "=>", "/", "*", "&&", "||", "!=",
    "++", "::", "#",
];

const KEYWORDS: &[&str] = &[
    "fn", "let", "const", "if", "else", "for", "while", "return", "async", "await", "import",
    "export", "class", "match", "impl", "struct", "null", "true", "false",
];

const TAGS: &[&str] = &[
    "<div>", "</div>", "<span>", "<a>", "<p>", "<nav>", "<main>", "<svg>", "<canvas>", "<img/>",
];

/// Labels for the rotating icon layer. ASCII only: the canvas lays text out
/// one cell per char, and ambiguous-width symbols take two cells in some
/// terminals.
pub const ICON_LABELS: &[&str] = &[
    "</>", "{ }", "[ ]", "( )", "#!", "$_", "=>", "::", "&&", "||", "~/", "0x", "++", "!=", "@",
    "%",
];

/// Which tokens the floating code-glyph layer draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphSet {
    /// Binary digits (weighted), punctuation, keywords and tag names.
    Code,
    Binary,
    Symbols,
}

pub fn glyph_set_from_str(raw: &str) -> Result<GlyphSet, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "code" | "default" => Ok(GlyphSet::Code),
        "binary" | "bin" | "01" => Ok(GlyphSet::Binary),
        "symbols" | "punc" => Ok(GlyphSet::Symbols),
        other => Err(format!("unsupported glyph set: {} (see --list-glyphs)", other)),
    }
}

/// Flattened token list; weighting is done by repetition so a uniform pick
/// honours it.
pub fn build_tokens(set: GlyphSet) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    match set {
        GlyphSet::Code => {
            for _ in 0..BINARY_WEIGHT {
                out.extend_from_slice(BINARY);
            }
            out.extend_from_slice(PUNCTUATION);
            out.extend_from_slice(KEYWORDS);
            out.extend_from_slice(TAGS);
        }
        GlyphSet::Binary => out.extend_from_slice(BINARY),
        GlyphSet::Symbols => out.extend_from_slice(PUNCTUATION),
    }
    out
}

pub fn pick<R: Rng + ?Sized>(rng: &mut R, tokens: &[&'static str]) -> &'static str {
    if tokens.is_empty() {
        return "0";
    }
    tokens[rng.random_range(0..tokens.len())]
}

pub fn random_bit<R: Rng + ?Sized>(rng: &mut R) -> char {
    if rng.random_bool(0.5) {
        '1'
    } else {
        '0'
    }
}

pub fn print_list_glyphs() {
    println!("VALUE        DESCRIPTION");
    println!("code         Binary digits (3x weight), punctuation, keywords, tag names");
    println!("binary       0 and 1 only (aliases: bin, 01)");
    println!("symbols      Punctuation and operators (alias: punc)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_set_weights_binary_digits_three_times() {
        let tokens = build_tokens(GlyphSet::Code);
        let ones = tokens.iter().filter(|t| **t == "1").count();
        let braces = tokens.iter().filter(|t| **t == "{").count();
        assert_eq!(ones, 3);
        assert_eq!(braces, 1);
        assert!(tokens.contains(&"<div>"));
        assert!(tokens.contains(&"return"));
    }

    #[test]
    fn glyph_set_parses_aliases() {
        assert_eq!(glyph_set_from_str("01").unwrap(), GlyphSet::Binary);
        assert_eq!(glyph_set_from_str(" CODE ").unwrap(), GlyphSet::Code);
        assert!(glyph_set_from_str("klingon").is_err());
    }

    #[test]
    fn every_drawn_token_is_one_cell_per_char() {
        for set in [GlyphSet::Code, GlyphSet::Binary, GlyphSet::Symbols] {
            for t in build_tokens(set) {
                assert!(t.is_ascii(), "{t:?}");
            }
        }
        for label in ICON_LABELS {
            assert!(label.is_ascii(), "{label:?}");
        }
    }

    #[test]
    fn binary_set_has_only_0_and_1() {
        assert_eq!(build_tokens(GlyphSet::Binary), vec!["0", "1"]);
    }
}
