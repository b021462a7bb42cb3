//! ``src/model/entry_filter.rs``
//! ============================================================================
//! # Filter/Sort engine for tab listings
//!
//! A filter is a whitespace separated list of tokens. Each token matches a
//! name when its characters appear in that name in order, with anything in
//! between (`"abc"` matches `"a_b_c"`). Every token has to match. Matching
//! is case-insensitive unless the filter contains an uppercase letter
//! anywhere.

use std::cmp::Ordering;

use regex::Regex;
use smallvec::SmallVec;
use tracing::warn;

use crate::fs::object_info::ObjectInfo;

/// Ordering applied to the filtered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntrySort {
    #[default]
    ByName,
    ByModifiedDesc,
    BySizeAsc,
}

impl std::fmt::Display for EntrySort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &'_ str = match self {
            Self::ByName => "name",
            Self::ByModifiedDesc => "modified",
            Self::BySizeAsc => "size",
        };

        write!(f, "{s}")
    }
}

impl EntrySort {
    pub fn compare(self, a: &ObjectInfo, b: &ObjectInfo) -> Ordering {
        match self {
            Self::ByName => a.name.cmp(&b.name),

            // Most recent first; unknown times are the oldest.
            Self::ByModifiedDesc => match (a.modified, b.modified) {
                (Some(am), Some(bm)) => bm.cmp(&am),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },

            Self::BySizeAsc => a.size.cmp(&b.size),
        }
    }
}

/// True when `s` contains no uppercase (or otherwise cased non-lowercase)
/// letter. Non-letters are ignored.
pub fn is_all_lower(s: &str) -> bool {
    s.chars().all(|c| c.is_lowercase() || !c.is_alphabetic())
}

/// Loose in-order pattern for one token: `abc` becomes `a.*b.*c`.
pub fn build_pattern(token: &str) -> String {
    let mut doc = String::with_capacity(token.len() * 4);
    let mut pre = "";

    for c in token.chars() {
        doc.push_str(pre);
        doc.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        pre = ".*";
    }

    doc
}

/// Compiled filter text.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    tokens: SmallVec<[Regex; 4]>,
    case_insensitive: bool,
    invalid: bool,
}

impl EntryFilter {
    pub fn new(filter: &str) -> Self {
        let case_insensitive = is_all_lower(filter);
        let text = if case_insensitive {
            filter.to_lowercase()
        } else {
            filter.to_string()
        };

        let mut tokens = SmallVec::new();
        let mut invalid = false;

        for token in text.split_whitespace() {
            match Regex::new(&build_pattern(token)) {
                Ok(re) => tokens.push(re),
                Err(e) => {
                    warn!("Filter token {:?} rejected: {}", token, e);
                    invalid = true;
                }
            }
        }

        Self {
            tokens,
            case_insensitive,
            invalid,
        }
    }

    pub const fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// True when `name` survives the filter.
    pub fn matches(&self, name: &str) -> bool {
        if self.invalid {
            return false;
        }

        if self.case_insensitive {
            let lowered = name.to_lowercase();
            self.tokens.iter().all(|re| re.is_match(&lowered))
        } else {
            self.tokens.iter().all(|re| re.is_match(name))
        }
    }
}

/// Filter `entries` by `filter_text`, then sort the survivors.
pub fn filter_and_sort(entries: &[ObjectInfo], filter_text: &str, sort: EntrySort) -> Vec<ObjectInfo> {
    let mut filtered: Vec<ObjectInfo> = if filter_text.is_empty() {
        entries.to_vec()
    } else {
        let filter = EntryFilter::new(filter_text);
        entries
            .iter()
            .filter(|e| filter.matches(e.name.as_str()))
            .cloned()
            .collect()
    };

    sort_entries(&mut filtered, sort);
    filtered
}

/// Stable in-place sort.
pub fn sort_entries(entries: &mut [ObjectInfo], sort: EntrySort) {
    entries.sort_by(|a, b| sort.compare(a, b));
}
