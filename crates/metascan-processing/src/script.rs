//! Embedded payload signature scanning

use std::collections::BTreeSet;

use metascan_core::{RiskCategory, RiskFinding, ScriptInjection};
use regex::bytes::Regex;

/// Distinct categories needed before a file is flagged.
pub const MIN_SUSPICIOUS_CATEGORIES: usize = 2;

/// Most categories listed in `patterns_found`.
const MAX_REPORTED_CATEGORIES: usize = 5;

/// Signature catalogue: (category, case-insensitive byte pattern).
const SIGNATURES: &[(&str, &str)] = &[
    ("script_tag", r"<script[^>]*>"),
    ("script_tag", r"javascript:"),
    ("script_tag", r"vbscript:"),
    ("event_handler", r"onload\s*="),
    ("event_handler", r"onerror\s*="),
    ("server_template", r"<\?php"),
    ("server_template", r"<%[^%>]{1,200}%>"),
    ("shell_command", r"#!/bin/sh"),
    ("shell_command", r"#!/bin/bash"),
    ("shell_command", r"cmd\.exe"),
    ("shell_command", r"powershell"),
    ("code_execution", r"eval\s*\("),
    ("code_execution", r"exec\s*\("),
    ("code_execution", r"system\s*\("),
    ("code_execution", r"shell_exec"),
    ("obfuscation", r"base64_decode"),
    ("obfuscation", r"gzinflate"),
];

struct Signature {
    category: &'static str,
    pattern: Regex,
}

/// Matches known payload signatures against metadata text and the leading and
/// trailing windows of the raw file.
pub struct ScriptInjectionScanner {
    signatures: Vec<Signature>,
    window: usize,
}

impl ScriptInjectionScanner {
    pub fn new(window: usize) -> Result<Self, regex::Error> {
        let signatures = SIGNATURES
            .iter()
            .map(|&(category, pattern)| {
                Regex::new(&format!("(?i-u){}", pattern)).map(|pattern| Signature {
                    category,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            signatures,
            window: window.max(1),
        })
    }

    /// Byte regions scanned: the whole file when it fits in two windows,
    /// otherwise its first and last window.
    fn regions<'a>(&self, data: &'a [u8]) -> Vec<&'a [u8]> {
        if data.len() <= self.window * 2 {
            vec![data]
        } else {
            vec![&data[..self.window], &data[data.len() - self.window..]]
        }
    }

    pub fn scan(&self, data: &[u8], metadata_text: &str) -> ScriptInjection {
        let regions = self.regions(data);
        let whole_file = regions.len() == 1;

        let mut categories = BTreeSet::new();
        let mut pattern_count = 0;
        for signature in &self.signatures {
            let raw_hits: usize = regions
                .iter()
                .map(|region| signature.pattern.find_iter(region).count())
                .sum();
            let text_hits = signature
                .pattern
                .find_iter(metadata_text.as_bytes())
                .count();
            // Uncompressed metadata text is already part of a fully scanned file.
            let hits = if whole_file {
                raw_hits.max(text_hits)
            } else {
                raw_hits + text_hits
            };
            if hits > 0 {
                pattern_count += hits;
                categories.insert(signature.category);
            }
        }

        let suspicious = categories.len() >= MIN_SUSPICIOUS_CATEGORIES;
        let analysis = match (categories.len(), suspicious) {
            (0, _) => "No malicious payload signatures found".to_string(),
            (_, false) => format!(
                "Single signature category matched ({} occurrence(s)); treated as incidental",
                pattern_count
            ),
            (n, true) => format!(
                "{} signature categories matched across {} occurrence(s)",
                n, pattern_count
            ),
        };

        ScriptInjection {
            suspicious,
            pattern_count,
            patterns_found: categories
                .into_iter()
                .take(MAX_REPORTED_CATEGORIES)
                .map(str::to_string)
                .collect(),
            analysis,
        }
    }
}

pub fn script_findings(result: &ScriptInjection) -> Vec<RiskFinding> {
    if result.suspicious {
        vec![RiskFinding::new(RiskCategory::ScriptInjection)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> ScriptInjectionScanner {
        ScriptInjectionScanner::new(64).unwrap()
    }

    #[test]
    fn test_all_signatures_compile() {
        assert_eq!(scanner().signatures.len(), SIGNATURES.len());
    }

    #[test]
    fn test_clean_bytes_are_not_suspicious() {
        let result = scanner().scan(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10], "Canon EOS 5D");
        assert!(!result.suspicious);
        assert_eq!(result.pattern_count, 0);
        assert!(result.patterns_found.is_empty());
        assert!(script_findings(&result).is_empty());
    }

    #[test]
    fn test_single_category_is_not_suspicious() {
        let result = scanner().scan(b"", "<SCRIPT>alert(1)</script> javascript:void(0)");
        assert!(!result.suspicious);
        assert_eq!(result.patterns_found, vec!["script_tag"]);
        assert_eq!(result.pattern_count, 2);
    }

    #[test]
    fn test_two_categories_are_suspicious() {
        let result = scanner().scan(b"<?php eval($_GET['x']); ?>", "");
        assert!(result.suspicious);
        assert_eq!(
            result.patterns_found,
            vec!["code_execution", "server_template"]
        );
        assert_eq!(
            script_findings(&result),
            vec![RiskFinding::new(RiskCategory::ScriptInjection)]
        );
    }

    #[test]
    fn test_categories_combine_across_bytes_and_metadata() {
        let result = scanner().scan(b"#!/bin/bash\nrm -rf /", "<img onerror=x>");
        assert!(result.suspicious);
        assert!(result.patterns_found.contains(&"shell_command".to_string()));
        assert!(result.patterns_found.contains(&"event_handler".to_string()));
    }

    #[test]
    fn test_metadata_already_in_small_file_is_counted_once() {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.extend_from_slice(b"tEXtComment\0<script>x</script>");
        let result = scanner().scan(&data, "Comment: <script>x</script>");
        assert_eq!(result.pattern_count, 1);
        assert_eq!(result.patterns_found, vec!["script_tag"]);
    }

    #[test]
    fn test_metadata_outside_scanned_windows_adds_to_count() {
        let mut data = b"<script>".to_vec();
        data.extend(vec![0u8; 200]);
        let result = scanner().scan(&data, "<script>");
        assert_eq!(result.pattern_count, 2);
    }

    #[test]
    fn test_only_head_and_tail_windows_are_scanned() {
        let mut data = vec![0u8; 64];
        data.extend_from_slice(b"<?php eval(1) ?>");
        data.extend(vec![0u8; 64]);

        let result = scanner().scan(&data, "");
        assert_eq!(result.pattern_count, 0);

        data.extend_from_slice(b"powershell -enc AAAA base64_decode(");
        let result = scanner().scan(&data, "");
        assert!(result.suspicious);
    }

    #[test]
    fn test_binary_bytes_do_not_break_matching() {
        let mut data = vec![0xFFu8, 0x00, 0xC3, 0x28];
        data.extend_from_slice(b"gzinflate(");
        data.extend_from_slice(&[0x80, 0x81]);
        data.extend_from_slice(b"SHELL_EXEC");
        let result = scanner().scan(&data, "");
        assert!(result.suspicious);
    }
}
