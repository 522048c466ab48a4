//! Solidity signature hashing for call and event filters.
//!
//! A function selector is the first four bytes of
//! `keccak256("name(type1,type2,...)")`; an event's topic0 is the full hash.
//! Filters accept either the hex value or a human-readable signature, with or
//! without parameter names (`transfer(address to, uint256 amount)`).

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of `input`.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// Reduce a signature to its canonical ABI form: parameter names and
/// `indexed`/`memory`/`calldata` qualifiers are dropped, whitespace removed.
///
/// `"Transfer(address indexed from, address to, uint256 value)"` →
/// `"Transfer(address,address,uint256)"`.
pub fn canonical_signature(signature: &str) -> String {
    let signature = signature.trim();
    let Some(open) = signature.find('(') else {
        return signature.to_string();
    };
    // "function transfer" / "event Transfer" -> bare name
    let name = signature[..open].split_whitespace().last().unwrap_or("");
    let body = signature[open + 1..]
        .strip_suffix(')')
        .unwrap_or(&signature[open + 1..]);

    let params: Vec<String> = split_top_level(body)
        .into_iter()
        .map(|param| param_type(param.trim()))
        .filter(|ty| !ty.is_empty())
        .collect();
    format!("{name}({})", params.join(","))
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// The type part of one parameter declaration, tuples canonicalised
/// recursively.
fn param_type(param: &str) -> String {
    if let Some(inner) = param.strip_prefix('(') {
        // tuple: "(uint256 a, address b)[] name"
        let close = matching_paren(inner).unwrap_or(inner.len());
        let fields: Vec<String> = split_top_level(&inner[..close])
            .into_iter()
            .map(|p| param_type(p.trim()))
            .filter(|t| !t.is_empty())
            .collect();
        let suffix: String = inner
            .get(close + 1..)
            .unwrap_or("")
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();
        return format!("({}){suffix}", fields.join(","));
    }
    param
        .split_whitespace()
        .next()
        .map(elementary_type)
        .unwrap_or_default()
}

/// Expand the shorthand elementary types (`uint`, `int`, `byte`, `fixed`,
/// `ufixed`) to their canonical names, keeping any array suffix.
fn elementary_type(ty: &str) -> String {
    let (base, suffix) = ty.split_at(ty.find('[').unwrap_or(ty.len()));
    let base = match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        "fixed" => "fixed128x18",
        "ufixed" => "ufixed128x18",
        other => other,
    };
    format!("{base}{suffix}")
}

fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn is_hex(s: &str, digits: usize) -> bool {
    s.strip_prefix("0x")
        .map_or(false, |h| h.len() == digits && h.chars().all(|c| c.is_ascii_hexdigit()))
}

// ─── FunctionSelector ────────────────────────────────────────────────────────

/// A 4-byte function selector, lowercase `0x`-prefixed.
///
/// Built from either `"0xa9059cbb"` or `"transfer(address,uint256)"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FunctionSelector(String);

impl FunctionSelector {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `selector` (from a transaction input) equals this one.
    pub fn matches(&self, selector: &str) -> bool {
        self.0.eq_ignore_ascii_case(selector)
    }
}

impl From<String> for FunctionSelector {
    fn from(s: String) -> Self {
        let lower = s.trim().to_ascii_lowercase();
        if is_hex(&lower, 8) {
            return Self(lower);
        }
        let hash = keccak256(canonical_signature(&s).as_bytes());
        Self(format!("0x{}", hex::encode(&hash[..4])))
    }
}

impl From<&str> for FunctionSelector {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<FunctionSelector> for String {
    fn from(selector: FunctionSelector) -> Self {
        selector.0
    }
}

// ─── Topic ───────────────────────────────────────────────────────────────────

/// A 32-byte log topic, lowercase `0x`-prefixed.
///
/// Built from either a hex topic or an event signature, which hashes to the
/// event's topic0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the log's `topic` equals this one.
    pub fn matches(&self, topic: &str) -> bool {
        self.0.eq_ignore_ascii_case(topic)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("0x") || !trimmed.contains('(') {
            return Self(trimmed.to_ascii_lowercase());
        }
        let hash = keccak256(canonical_signature(trimmed).as_bytes());
        Self(format!("0x{}", hex::encode(hash)))
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}
