// src/compiler/rules.rs

//! Built-in line-oriented rule language.
//!
//! ```text
//! # comments and blank lines are ignored
//! counter errors
//! counter warnings
//!
//! /^ERROR\b/   errors
//! /^WARN(ING)?/ warnings
//! ```
//!
//! `counter <name>` declares a metric; `/<regex>/ <name>` counts lines
//! matching the regex into a previously declared metric. A `/` inside the
//! pattern is written as `\/`.

use std::collections::HashSet;
use std::fmt::Write as _;

use blake3::Hasher;
use regex::Regex;

use super::{Compiler, Diagnostic};

/// One compiled `/regex/ metric` line.
#[derive(Debug, Clone)]
pub struct Rule {
    pub line: usize,
    pub pattern: Regex,
    pub metric: String,
}

/// Compiled form of a rule program.
#[derive(Debug, Clone)]
pub struct RuleProgram {
    metrics: Vec<String>,
    rules: Vec<Rule>,
    fingerprint: String,
}

impl RuleProgram {
    /// Declared metrics, in declaration order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// blake3 hex digest of the source this program was compiled from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Metrics that `line` would increment, one entry per matching rule.
    pub fn count_matches<'a>(&'a self, line: &str) -> Vec<&'a str> {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(line))
            .map(|rule| rule.metric.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCompiler;

impl RuleCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for RuleCompiler {
    type Program = RuleProgram;

    fn compile(&self, name: &str, source: &[u8]) -> Result<RuleProgram, Vec<Diagnostic>> {
        let text = std::str::from_utf8(source).map_err(|e| {
            vec![Diagnostic::new(
                name,
                None,
                format!("source is not valid UTF-8: {e}"),
            )]
        })?;

        let mut diagnostics = Vec::new();
        let mut metrics: Vec<String> = Vec::new();
        let mut declared: HashSet<String> = HashSet::new();
        let mut rules = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("counter") {
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    diagnostics.push(Diagnostic::new(
                        name,
                        Some(lineno),
                        format!("unrecognised statement {line:?}"),
                    ));
                    continue;
                }
                let metric = rest.trim();
                if !is_ident(metric) {
                    diagnostics.push(Diagnostic::new(
                        name,
                        Some(lineno),
                        format!("invalid metric name {metric:?}"),
                    ));
                } else if !declared.insert(metric.to_string()) {
                    diagnostics.push(Diagnostic::new(
                        name,
                        Some(lineno),
                        format!("metric {metric:?} declared twice"),
                    ));
                } else {
                    metrics.push(metric.to_string());
                }
                continue;
            }

            if line.starts_with('/') {
                match parse_rule(line, lineno, &declared) {
                    Ok(rule) => rules.push(rule),
                    Err(message) => {
                        diagnostics.push(Diagnostic::new(name, Some(lineno), message))
                    }
                }
                continue;
            }

            diagnostics.push(Diagnostic::new(
                name,
                Some(lineno),
                format!("unrecognised statement {line:?}"),
            ));
        }

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let mut hasher = Hasher::new();
        hasher.update(source);

        Ok(RuleProgram {
            metrics,
            rules,
            fingerprint: hasher.finalize().to_hex().to_string(),
        })
    }

    fn dump(&self, name: &str, program: &RuleProgram) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "program {name} (fingerprint {})", program.fingerprint);
        for metric in &program.metrics {
            let _ = writeln!(out, "  counter {metric}");
        }
        for (idx, rule) in program.rules().iter().enumerate() {
            let _ = writeln!(
                out,
                "  rule {idx} (line {}): /{}/ -> {}",
                rule.line,
                rule.pattern.as_str(),
                rule.metric
            );
        }
        out
    }
}

fn parse_rule(line: &str, lineno: usize, declared: &HashSet<String>) -> Result<Rule, String> {
    let body = &line[1..];
    let close = find_closing_slash(body).ok_or_else(|| "unterminated pattern".to_string())?;

    let pattern_src = body[..close].replace("\\/", "/");
    if pattern_src.is_empty() {
        return Err("empty pattern".to_string());
    }
    let pattern = Regex::new(&pattern_src).map_err(|e| format!("invalid pattern: {e}"))?;

    let metric = body[close + 1..].trim();
    if metric.is_empty() {
        return Err("rule has no target metric".to_string());
    }
    if !is_ident(metric) {
        return Err(format!("invalid metric name {metric:?}"));
    }
    if !declared.contains(metric) {
        return Err(format!("metric {metric:?} used before declaration"));
    }

    Ok(Rule {
        line: lineno,
        pattern,
        metric: metric.to_string(),
    })
}

/// Byte index of the first `/` not escaped by an odd run of backslashes.
fn find_closing_slash(body: &str) -> Option<usize> {
    let mut backslashes = 0usize;
    for (idx, ch) in body.char_indices() {
        match ch {
            '\\' => backslashes += 1,
            '/' if backslashes % 2 == 0 => return Some(idx),
            _ => backslashes = 0,
        }
    }
    None
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
