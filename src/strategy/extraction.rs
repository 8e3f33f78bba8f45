// Constant mining. Source text under test is scanned for literals adjacent
// to comparison operators; the mined constants are injected into sample
// pools for any domain that admits them, so boundary conditions written in
// the code itself get exercised early.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Root directory whose files are scanned for literals.
    pub glob_source: Option<PathBuf>,
    /// Inline source fragments to scan, for predicates whose text is not on
    /// disk.
    pub source_snippets: Vec<String>,
    /// Cap on the number of mined numeric constants.
    pub max_num_const: usize,
    /// Comparison pairs spanning a range wider than this are not expanded.
    pub numeric_const_max_range: i64,
    /// Cap on derived string constants (pairwise concatenations).
    pub max_string_transformations: usize,
}

impl Default for ExtractionConfig {
    fn default() -> ExtractionConfig {
        ExtractionConfig {
            glob_source: None,
            source_snippets: Vec::new(),
            max_num_const: 100,
            numeric_const_max_range: 100,
            max_string_transformations: 50,
        }
    }
}

impl ExtractionConfig {
    pub fn from_snippets<S: Into<String>>(snippets: impl IntoIterator<Item = S>) -> Self {
        ExtractionConfig {
            source_snippets: snippets.into_iter().map(Into::into).collect(),
            ..ExtractionConfig::default()
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ExtractionConfig { glob_source: Some(path.into()), ..ExtractionConfig::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Punct(&'static str),
    Num(i64),
    Str(String),
    Other,
}

const PUNCTS: [&str; 16] = [
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "-", "+", "*", "/", "%", "=",
];

fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            match text.parse::<f64>() {
                Ok(n) if n.is_finite() => tokens.push(Token::Num(n.trunc() as i64)),
                _ => tokens.push(Token::Other),
            }
        } else if c == '"' || c == '\'' || c == '`' {
            let quote = c;
            i += 1;
            let mut s = String::new();
            while i < chars.len() && chars[i] != quote {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    i += 1;
                }
                s.push(chars[i]);
                i += 1;
            }
            i += 1; // closing quote
            tokens.push(Token::Str(s));
        } else if c.is_alphanumeric() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Other);
        } else {
            let mut matched = None;
            for p in PUNCTS {
                if chars[i..].starts_with(&p.chars().collect::<Vec<char>>()[..]) {
                    matched = Some(p);
                    break;
                }
            }
            match matched {
                Some(p) => {
                    tokens.push(Token::Punct(p));
                    i += p.len();
                }
                None => {
                    tokens.push(Token::Other);
                    i += 1;
                }
            }
        }
    }
    tokens
}

/// Constants mined from source text, ready to seed sample pools.
#[derive(Debug, Clone, Default)]
pub struct ExtractedConstants {
    pub numerics: Vec<i64>,
    pub strings: Vec<String>,
}

impl ExtractedConstants {
    pub fn mine(config: &ExtractionConfig) -> ExtractedConstants {
        let mut sources: Vec<String> = config.source_snippets.clone();
        if let Some(root) = &config.glob_source {
            for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                match fs::read_to_string(entry.path()) {
                    Ok(text) => sources.push(text),
                    Err(err) => {
                        warn!(path = %entry.path().display(), %err, "skipping unreadable source");
                    }
                }
            }
        }

        let mut numerics: Vec<i64> = Vec::new();
        let mut greater_than: Vec<i64> = Vec::new();
        let mut lesser_than: Vec<i64> = Vec::new();
        let mut strings: Vec<String> = Vec::new();

        for source in &sources {
            let tokens = tokenize(source);
            for (i, token) in tokens.iter().enumerate() {
                match token {
                    Token::Str(s) => strings.push(s.clone()),
                    Token::Num(v) => {
                        let prev = if i > 0 { &tokens[i - 1] } else { &Token::Other };
                        match prev {
                            Token::Punct("==") | Token::Punct("===")
                            | Token::Punct("=") => numerics.push(*v),
                            Token::Punct("!=") | Token::Punct("!==") => {
                                numerics.push(v - 1);
                                numerics.push(v + 1);
                            }
                            Token::Punct(">=") => {
                                numerics.push(*v);
                                greater_than.push(*v);
                            }
                            Token::Punct("<=") => {
                                numerics.push(*v);
                                lesser_than.push(*v);
                            }
                            Token::Punct(">") => {
                                numerics.push(v + 1);
                                greater_than.push(v + 1);
                            }
                            Token::Punct("<") => {
                                numerics.push(v - 1);
                                lesser_than.push(v - 1);
                            }
                            Token::Punct("-") => numerics.push(-v),
                            _ => numerics.push(*v),
                        }
                    }
                    _ => {}
                }
            }
        }

        // Bounded comparison pairs expand to every integer they bracket.
        for &low in &greater_than {
            for &high in &lesser_than {
                if low <= high && high - low <= config.numeric_const_max_range {
                    numerics.extend(low..=high);
                }
            }
        }

        numerics.sort_unstable();
        numerics.dedup();
        numerics.truncate(config.max_num_const);

        strings.sort();
        strings.dedup();
        let mut derived = Vec::new();
        'outer: for a in &strings {
            for b in &strings {
                if derived.len() >= config.max_string_transformations {
                    break 'outer;
                }
                derived.push(format!("{}{}", a, b));
            }
        }
        strings.extend(derived);
        strings.sort();
        strings.dedup();

        debug!(
            numerics = numerics.len(),
            strings = strings.len(),
            "mined constants from {} source(s)",
            sources.len()
        );
        ExtractedConstants { numerics, strings }
    }

    /// Candidate values to offer each domain. Membership filtering happens
    /// at injection time via `can_generate`.
    pub fn candidates(&self) -> Vec<Value> {
        let mut out: Vec<Value> = Vec::new();
        for &v in &self.numerics {
            out.push(Value::Int(v));
            // Collection domains admit a constant as a repeated element.
            for len in 1..=4usize {
                out.push(Value::Array(vec![Value::Int(v); len]));
            }
            // String domains admit mined lengths.
            if (0..=20).contains(&v) {
                out.push(Value::Str("a".repeat(v as usize)));
            }
        }
        for s in &self.strings {
            out.push(Value::Str(s.clone()));
        }
        out
    }
}
