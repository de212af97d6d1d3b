/// ASCII normalization for script text
/// Box-drawing and typographic characters are rewritten so scripts render in plain terminals
use std::borrow::Cow;

/// Fixed replacement table. No replacement contains a character from the left column,
/// so a single pass is enough.
pub const REPLACEMENTS: [(char, &str); 11] = [
    ('\u{2500}', "-"),   // ─
    ('\u{2502}', "|"),   // │
    ('\u{2514}', "+"),   // └
    ('\u{250C}', "+"),   // ┌
    ('\u{2510}', "+"),   // ┐
    ('\u{2518}', "+"),   // ┘
    ('\u{251C}', "+"),   // ├
    ('\u{2524}', "+"),   // ┤
    ('\u{2192}', "->"),  // →
    ('\u{2022}', "*"),   // •
    ('\u{2026}', "..."), // …
];

pub fn replacement_for(c: char) -> Option<&'static str> {
    REPLACEMENTS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

pub fn needs_normalization(input: &str) -> bool {
    input.chars().any(|c| replacement_for(c).is_some())
}

/// Replace every mapped character in `input` with its ASCII form.
/// Input without any mapped character is returned borrowed.
pub fn normalize(input: &str) -> Cow<'_, str> {
    if !needs_normalization(input) {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match replacement_for(c) {
            Some(ascii) => output.push_str(ascii),
            None => output.push(c),
        }
    }
    Cow::Owned(output)
}
