use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Base letters first (case and accents ignored), then accents, then case
/// with lowercase ahead.
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = CollationKey::new(a);
    let b = CollationKey::new(b);
    a.base
        .cmp(&b.base)
        .then_with(|| a.marks.cmp(&b.marks))
        .then_with(|| a.case.cmp(&b.case))
}

/// Case- and accent-folded form used for substring search.
pub fn fold(text: &str) -> String {
    CollationKey::new(text).base.into_iter().collect()
}

#[derive(Debug, Default)]
struct CollationKey {
    base: Vec<char>,
    // Combining marks attached to each base letter, in canonical order.
    marks: Vec<Vec<char>>,
    case: Vec<u8>,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let mut key = Self::default();
        for ch in text.nfd() {
            if is_combining_mark(ch) {
                key.attach_mark(ch);
                continue;
            }
            let upper = u8::from(ch.is_uppercase());
            for lower in ch.to_lowercase() {
                if is_combining_mark(lower) {
                    key.attach_mark(lower);
                } else {
                    key.base.push(lower);
                    key.marks.push(Vec::new());
                    key.case.push(upper);
                }
            }
        }
        key
    }

    fn attach_mark(&mut self, mark: char) {
        match self.marks.last_mut() {
            Some(marks) => marks.push(mark),
            None => {
                self.base.push(mark);
                self.marks.push(Vec::new());
                self.case.push(0);
            }
        }
    }
}
