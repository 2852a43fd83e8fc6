//! Parses and reconstructs the full `Plural-Forms` header value
//! (`nplurals=K; plural=<expr>;`) and evaluates it for a given `n`.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::plural::ast::Expr;
use crate::plural::parser;

lazy_static! {
    static ref HEADER_RE: Regex =
        Regex::new(r"(?s)^\s*nplurals\s*=\s*(\d+)\s*;\s*plural\s*=\s*(.*?)\s*;\s*$").unwrap();
    static ref TERNARY_RE: Regex = Regex::new(r"\?\s*(\d+)\s*:\s*").unwrap();
}

/// An ordered list of Boolean rules; the whole expresses `nplurals = len+1`
/// choices. `eval(n)` returns the index of the first rule that holds, or
/// `len()-1` if none does (and an empty list always returns 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRules(Vec<Expr>);

impl PluralRules {
    /// One plural form only (Japanese-style): `nplurals=1; plural=0;`.
    pub fn one_form() -> Self {
        PluralRules(Vec::new())
    }

    /// Parses the full header value, e.g.
    /// `nplurals=3; plural=n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2;`.
    pub fn parse(header_value: &str) -> Result<Self> {
        let caps = HEADER_RE
            .captures(header_value)
            .ok_or_else(|| Error::format(format!("malformed Plural-Forms value {header_value:?}")))?;
        let nplurals: usize = caps[1]
            .parse()
            .map_err(|_| Error::format(format!("invalid nplurals in {header_value:?}")))?;
        let rule_expr = caps[2].trim();

        if nplurals == 0 {
            return Err(Error::format("nplurals shouldn't be zero"));
        }
        if nplurals == 1 {
            if rule_expr != "0" {
                return Err(Error::format("rules count mismatch"));
            }
            return Ok(PluralRules(Vec::new()));
        }
        if nplurals == 2 {
            let expr = parser::parse(rule_expr)?;
            return Ok(PluralRules(vec![expr]));
        }

        let mut segments = Vec::new();
        let mut last_end = 0;
        let mut expected = 0usize;
        for caps in TERNARY_RE.captures_iter(rule_expr) {
            let m = caps.get(0).unwrap();
            let idx: usize = caps[1]
                .parse()
                .map_err(|_| Error::format(format!("invalid choice index in {rule_expr:?}")))?;
            if idx != expected {
                return Err(Error::format(format!(
                    "unexpected choice {idx}, expected {expected}"
                )));
            }
            segments.push(rule_expr[last_end..m.start()].trim().to_string());
            last_end = m.end();
            expected += 1;
        }
        let tail = rule_expr[last_end..].trim();
        if tail != (nplurals - 1).to_string() {
            return Err(Error::format(format!(
                "unexpected choice {tail}, expected {}",
                nplurals - 1
            )));
        }
        if segments.len() != nplurals - 1 {
            return Err(Error::format("rules count mismatch"));
        }

        let rules = segments
            .into_iter()
            .map(|s| parser::parse(&s))
            .collect::<Result<Vec<_>>>()?;
        Ok(PluralRules(rules))
    }

    /// Number of distinct plural forms, `len(rules) + 1`.
    pub fn len(&self) -> usize {
        self.0.len() + 1
    }

    /// Chooses a plural form index for `n`. The two-form case is special:
    /// the single rule's Boolean value *is* the form index (`1` if it
    /// holds, else `0`). With three or more forms the rules are a ternary
    /// chain, so the first rule that holds selects its own index, falling
    /// through to the last index if none does.
    pub fn eval(&self, n: i64) -> usize {
        if self.0.len() == 1 {
            return if self.0[0].check(n) { 1 } else { 0 };
        }
        self.0
            .iter()
            .position(|rule| rule.check(n))
            .unwrap_or(self.0.len())
    }
}

impl Default for PluralRules {
    fn default() -> Self {
        PluralRules::one_form()
    }
}

impl fmt::Display for PluralRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => write!(f, "nplurals=1; plural=0;"),
            1 => write!(f, "nplurals=2; plural={};", self.0[0]),
            n => {
                write!(f, "nplurals={}; plural=", n + 1)?;
                for (i, rule) in self.0.iter().enumerate() {
                    write!(f, "{rule} ? {i} : ")?;
                }
                write!(f, "{};", n)
            }
        }
    }
}
