//! Word-bounded diffing of a single field edit.
//!
//! When a user fixes "the beatles" into "The Beatles" by hand, the changed
//! region is widened to whole words so the result can be stored as a reusable
//! case-correction rule instead of a single-letter patch.

use shared::exception::ExceptionSuggestion;

/// The changed fragment of a string, before and after the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub original: String,
    pub corrected: String,
}

/// ASCII alphanumerics, underscore and the Latin-1 letters U+00C0..=U+00FF.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ('\u{00C0}'..='\u{00FF}').contains(&c)
}

fn expand_end(chars: &[char], mut end: usize) -> usize {
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }
    end
}

/// Smallest pair of whole-word fragments that differ between `before` and
/// `after`, or `None` when the strings are equal.
///
/// Works on `char`s, so multi-byte letters are never split. If widening still
/// leaves one side empty (an insertion made only of separators), the full
/// strings are returned instead.
pub fn smart_diff(before: &str, after: &str) -> Option<Diff> {
    if before == after {
        return None;
    }

    let s1: Vec<char> = before.chars().collect();
    let s2: Vec<char> = after.chars().collect();

    let mut start = 0;
    while start < s1.len() && start < s2.len() && s1[start] == s2[start] {
        start += 1;
    }

    // Suffix search stops at the prefix so the two never overlap.
    let mut end1 = s1.len();
    let mut end2 = s2.len();
    while end1 > start && end2 > start && s1[end1 - 1] == s2[end2 - 1] {
        end1 -= 1;
        end2 -= 1;
    }

    // s1[..start] == s2[..start], so one backward expansion serves both.
    let mut expanded_start = start;
    while expanded_start > 0 && is_word_char(s1[expanded_start - 1]) {
        expanded_start -= 1;
    }
    let expanded_end1 = expand_end(&s1, end1);
    let expanded_end2 = expand_end(&s2, end2);

    let original: String = s1[expanded_start..expanded_end1].iter().collect();
    let corrected: String = s2[expanded_start..expanded_end2].iter().collect();

    if original.is_empty() || corrected.is_empty() {
        return Some(Diff {
            original: before.to_string(),
            corrected: after.to_string(),
        });
    }

    Some(Diff {
        original,
        corrected,
    })
}

/// Remembers the value a field had when editing started and turns the final
/// value into a rule suggestion.
#[derive(Debug, Default, Clone)]
pub struct EditTracker {
    value_on_focus: String,
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_edit(&mut self, value: impl ToString) {
        self.value_on_focus = value.to_string();
    }

    /// Only edits where both values are non-empty and different qualify.
    pub fn finish_edit(
        &mut self,
        field: &str,
        new_value: impl ToString,
    ) -> Option<ExceptionSuggestion> {
        let new_value = new_value.to_string();
        if new_value.is_empty() || self.value_on_focus.is_empty() || new_value == self.value_on_focus
        {
            return None;
        }

        smart_diff(&self.value_on_focus, &new_value).map(|diff| ExceptionSuggestion {
            original: diff.original,
            corrected: diff.corrected,
            category: field.to_string(),
        })
    }
}
