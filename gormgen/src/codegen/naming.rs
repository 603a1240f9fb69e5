//! Naming utilities for code generation

/// Convert a raw table or column name into a Go identifier.
///
/// Letters are grouped into segments. A segment starts after any
/// non-alphanumeric separator, after a digit, where a lowercase letter is
/// followed by an uppercase one, and at the last uppercase letter of an
/// uppercase run that continues in lowercase (`XId` -> `X|Id`). The first
/// letter of every segment is upper-cased and the rest of the segment is
/// lower-cased, so `ID` becomes `Id`. When `capitalize_first` is false the very first segment stays
/// lowercase (`created_at` -> `createdAt`).
///
/// Separators produce no output, except that a digit directly following a
/// separator keeps an `_` in front of it (`item_2` -> `Item_2`). Digits are
/// otherwise copied verbatim, including leading ones: the result is not
/// checked for being a valid identifier.
///
/// The result normalizes to itself, except where single-letter segments are
/// adjacent: `a_b` gives `AB`, which reads back as the one segment `Ab`.
pub fn normalize(name: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    let mut seg_start = true;
    let mut first_segment = true;
    let mut after_separator = false;
    let mut prev_lower = false;
    let mut prev_upper = false;

    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_ascii_alphabetic() {
            if ch.is_ascii_uppercase() {
                let next_lower = chars.peek().is_some_and(|c| c.is_ascii_lowercase());
                if prev_lower || (prev_upper && next_lower) {
                    seg_start = true;
                }
            }
            if seg_start {
                if first_segment && !capitalize_first {
                    out.push(ch.to_ascii_lowercase());
                } else {
                    out.push(ch.to_ascii_uppercase());
                }
                seg_start = false;
                first_segment = false;
            } else {
                out.push(ch.to_ascii_lowercase());
            }
            prev_lower = ch.is_ascii_lowercase();
            prev_upper = ch.is_ascii_uppercase();
            after_separator = false;
        } else if ch.is_ascii_digit() {
            if after_separator {
                out.push('_');
            }
            out.push(ch);
            seg_start = true;
            prev_lower = false;
            prev_upper = false;
            after_separator = false;
        } else {
            seg_start = true;
            prev_lower = false;
            prev_upper = false;
            after_separator = true;
        }
    }

    out
}

/// Exported Go type name for a table, e.g. `user_profile` -> `UserProfile`
pub fn to_type_name(table_name: &str) -> String {
    normalize(table_name, true)
}

/// Unexported instance name for a table, e.g. `user_profile` -> `userProfile`
pub fn to_instance_name(table_name: &str) -> String {
    normalize(table_name, false)
}
