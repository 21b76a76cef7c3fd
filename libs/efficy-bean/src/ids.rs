//! Identifier list parsing.
//!
//! ID fields come either as a bare delimited list (`12,13;14`) or as a serialized
//! collection (`["12","13"]`, `{"12","13"}`). Both forms normalize to the same
//! ordered, de-duplicated list of non-empty ids.

const SEPARATORS: [char; 2] = [',', ';'];
const QUOTES: [char; 2] = ['"', '\''];

/// Split one textual id field into ids, in order, without duplicates or empties.
#[must_use]
pub fn split_id_list(input: &str) -> Vec<String> {
    let mut ids = Vec::new();
    push_ids(&mut ids, input);
    ids
}

/// Append the ids found in `input` to `ids`, skipping any already present.
pub(crate) fn push_ids(ids: &mut Vec<String>, input: &str) {
    for part in strip_wrapping(input).split(SEPARATORS) {
        let id = strip_wrapping(part);
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_owned());
        }
    }
}

/// Trim whitespace, then any brackets, braces and quotes around the text.
fn strip_wrapping(text: &str) -> &str {
    text.trim()
        .trim_start_matches(['[', '{'])
        .trim_end_matches([']', '}'])
        .trim()
        .trim_matches(QUOTES)
        .trim()
}
