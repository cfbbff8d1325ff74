// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hint-accelerated reference scanner
//!
//! Documents can be tens of megabytes, and running a tolerant regular
//! expression over the whole text is slow. Every pattern is therefore paired
//! with a literal *hint* that occurs inside each real match. The scanner looks
//! for the hint with `memchr::memmem` and only runs the regex inside a small
//! byte window around each hint occurrence. When the window does not match,
//! scanning continues after that hint.
//!
//! ```text
//!   ...<  app:imageURI >tex/roof.png</app:imageURI>...
//!      |<- before ->|hint|<- after ->|
//!                   regex window
//! ```

use crate::Result;
use memchr::memmem::Finder;
use regex::bytes::Regex;
use std::collections::BTreeSet;
use std::path::Path;

/// Window sizes around each hint occurrence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Bytes before the hint included in the regex window
    pub search_range_before_hint: usize,
    /// Bytes after the hint included in the regex window
    pub search_range_after_hint: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            search_range_before_hint: 5,
            search_range_after_hint: 10,
        }
    }
}

/// Delimiter pair enclosing one kind of reference
#[derive(Clone, Debug)]
pub struct TagPattern {
    begin: Regex,
    end: Regex,
    begin_hint: Finder<'static>,
    end_hint: Finder<'static>,
}

impl TagPattern {
    /// Compile a delimiter pair
    ///
    /// Each hint must occur within every match of its regex.
    pub fn new(begin: &str, end: &str, begin_hint: &str, end_hint: &str) -> Result<Self> {
        Ok(Self {
            begin: Regex::new(begin)?,
            end: Regex::new(end)?,
            begin_hint: Finder::new(begin_hint.as_bytes()).into_owned(),
            end_hint: Finder::new(end_hint.as_bytes()).into_owned(),
        })
    }

    /// `<app:imageURI>` ... `</app:imageURI>`, spaces allowed around `<`, `/` and `>`
    pub fn image_uri() -> Result<Self> {
        Self::new(r"< *app:imageURI *>", r"< */ *app:imageURI *>", "app:imageURI", "app:imageURI")
    }

    /// `codeSpace="` ... `"`, spaces allowed around `=`
    pub fn code_space() -> Result<Self> {
        Self::new(r#"codeSpace *= *""#, r#"""#, "codeSpace", "\"")
    }
}

/// Extracts texture and code-list references from document text
#[derive(Clone, Debug)]
pub struct ReferenceScanner {
    config: ScanConfig,
    patterns: Vec<TagPattern>,
}

impl ReferenceScanner {
    /// Scanner for image and code-list references
    pub fn new(config: ScanConfig) -> Result<Self> {
        Ok(Self::with_patterns(config, vec![TagPattern::image_uri()?, TagPattern::code_space()?]))
    }

    pub fn with_patterns(config: ScanConfig, patterns: Vec<TagPattern>) -> Self {
        Self { config, patterns }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Every distinct non-empty reference found by any pattern
    pub fn scan(&self, content: &[u8]) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for pattern in &self.patterns {
            self.scan_between(content, pattern, &mut found);
        }
        found
    }

    /// Read a file and scan it
    pub fn scan_file(&self, path: &Path) -> Result<BTreeSet<String>> {
        let content = std::fs::read(path)?;
        Ok(self.scan(&content))
    }

    /// Collect the text between each begin match and the next end match
    ///
    /// A begin match without a following end match takes the rest of the
    /// content and ends the scan.
    fn scan_between(&self, content: &[u8], pattern: &TagPattern, found: &mut BTreeSet<String>) {
        let mut pos = 0;
        while let Some((_, value_start)) = self.search_with_hint(content, pos, &pattern.begin, &pattern.begin_hint) {
            match self.search_with_hint(content, value_start, &pattern.end, &pattern.end_hint) {
                Some((value_end, next)) => {
                    insert_reference(found, &content[value_start..value_end]);
                    pos = next;
                }
                None => {
                    insert_reference(found, &content[value_start..]);
                    break;
                }
            }
        }
    }

    /// First regex match at or after `from`, looked for only around hint hits
    fn search_with_hint(&self, content: &[u8], from: usize, regex: &Regex, hint: &Finder<'_>) -> Option<(usize, usize)> {
        let hint_len = hint.needle().len();
        let mut pos = from;
        while pos < content.len() {
            let hit = pos + hint.find(&content[pos..])?;
            let window_start = hit.saturating_sub(self.config.search_range_before_hint).max(from);
            let window_end = (hit + hint_len + self.config.search_range_after_hint).min(content.len());
            if let Some(m) = regex.find(&content[window_start..window_end]) {
                return Some((window_start + m.start(), window_start + m.end()));
            }
            pos = hit + hint_len.max(1);
        }
        None
    }
}

fn insert_reference(found: &mut BTreeSet<String>, bytes: &[u8]) {
    if !bytes.is_empty() {
        found.insert(String::from_utf8_lossy(bytes).into_owned());
    }
}
