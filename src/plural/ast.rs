//! The Boolean/arithmetic AST evaluated against the free variable `n`, and
//! its canonical `Display` form (used to reconstruct `Plural-Forms` text).

use std::fmt;

/// A comparison operator in a `cmp` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn eval(self, a: i64, b: i64) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the `Plural-Forms` expression grammar. Arithmetic leaves
/// (`Lit`, `Var`, `Mod`) and Boolean nodes (`Cmp`, `And`, `Or`, `Paren`) share
/// one type so a `PluralRule` tree can be built, evaluated, and printed
/// without a second parallel hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Lit(i64),
    Var,
    Mod(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
}

impl Expr {
    /// Evaluates an arithmetic subtree (`Lit`/`Var`/`Mod`/`Paren`) for `n`.
    /// Division by zero in `%` is undefined by the grammar; this returns 0.
    pub fn eval_int(&self, n: i64) -> i64 {
        match self {
            Expr::Lit(v) => *v,
            Expr::Var => n,
            Expr::Mod(a, b) => {
                let divisor = b.eval_int(n);
                if divisor == 0 {
                    0
                } else {
                    a.eval_int(n) % divisor
                }
            }
            Expr::Paren(inner) => inner.eval_int(n),
            Expr::Cmp(..) | Expr::And(..) | Expr::Or(..) => {
                unreachable!("Boolean node in an arithmetic position")
            }
        }
    }

    /// Evaluates a Boolean subtree (`Cmp`/`And`/`Or`/`Paren`) for `n`.
    pub fn check(&self, n: i64) -> bool {
        match self {
            Expr::Cmp(op, a, b) => op.eval(a.eval_int(n), b.eval_int(n)),
            Expr::And(a, b) => a.check(n) && b.check(n),
            Expr::Or(a, b) => a.check(n) || b.check(n),
            Expr::Paren(inner) => inner.check(n),
            Expr::Lit(..) | Expr::Var | Expr::Mod(..) => {
                unreachable!("arithmetic node in a Boolean position")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(v) => write!(f, "{v}"),
            Expr::Var => f.write_str("n"),
            Expr::Mod(a, b) => write!(f, "{a}%{b}"),
            Expr::Cmp(op, a, b) => write!(f, "{a} {op} {b}"),
            Expr::And(a, b) => write!(f, "{a} && {b}"),
            Expr::Or(a, b) => write!(f, "{a} || {b}"),
            Expr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod_and_cmp_display_without_spaces_around_percent() {
        let e = Expr::Cmp(
            CmpOp::Eq,
            Box::new(Expr::Mod(Box::new(Expr::Var), Box::new(Expr::Lit(10)))),
            Box::new(Expr::Lit(1)),
        );
        assert_eq!(e.to_string(), "n%10 == 1");
        assert!(e.check(1));
        assert!(!e.check(2));
    }

    #[test]
    fn division_by_zero_in_mod_is_zero() {
        let e = Expr::Mod(Box::new(Expr::Var), Box::new(Expr::Lit(0)));
        assert_eq!(e.eval_int(5), 0);
    }
}
