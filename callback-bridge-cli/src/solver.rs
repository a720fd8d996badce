//! "24 points" puzzle solver
//!
//! Given a handful of integers, find an expression using each exactly once
//! with `+ - * /` and any grouping whose value equals the target.

const EPSILON: f64 = 1e-6;

/// Largest input the search handles within an interactive response time
///
/// The search grows factorially: 5 numbers take tens of milliseconds and 6
/// take seconds.
pub const MAX_NUMBERS: usize = 4;

/// Find an expression over `numbers` equal to `target`
///
/// Returns the expression text, e.g. `8 / (3 - 8 / 3)`, or `None` if no
/// combination works.
pub fn solve(numbers: &[i64], target: i64) -> Option<String> {
    if numbers.is_empty() {
        return None;
    }

    let terms: Vec<Term> = numbers
        .iter()
        .map(|&n| Term {
            value: n as f64,
            expr: n.to_string(),
            op: None,
        })
        .collect();

    search(terms, target as f64).map(|t| t.expr)
}

#[derive(Debug, Clone)]
struct Term {
    value: f64,
    expr: String,
    /// Top-level operator, used to decide where parentheses are needed
    op: Option<char>,
}

fn search(terms: Vec<Term>, target: f64) -> Option<Term> {
    if terms.len() == 1 {
        let term = terms.into_iter().next()?;
        return ((term.value - target).abs() < EPSILON).then_some(term);
    }

    for i in 0..terms.len() {
        for j in 0..terms.len() {
            if i == j {
                continue;
            }

            let rest: Vec<Term> = terms
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != i && k != j)
                .map(|(_, t)| t.clone())
                .collect();

            for combined in combine(&terms[i], &terms[j], i < j) {
                let mut next = rest.clone();
                next.push(combined);
                if let Some(found) = search(next, target) {
                    return Some(found);
                }
            }
        }
    }

    None
}

/// All terms reachable from `a op b`
///
/// Commutative operators are only tried once per unordered pair.
fn combine(a: &Term, b: &Term, ordered: bool) -> Vec<Term> {
    let mut out = Vec::with_capacity(4);

    if ordered {
        out.push(binary(a, b, '+', a.value + b.value));
        out.push(binary(a, b, '*', a.value * b.value));
    }
    out.push(binary(a, b, '-', a.value - b.value));
    if b.value.abs() > EPSILON {
        out.push(binary(a, b, '/', a.value / b.value));
    }

    out
}

fn binary(a: &Term, b: &Term, op: char, value: f64) -> Term {
    let left = operand(a, op, false);
    let right = operand(b, op, true);
    Term {
        value,
        expr: format!("{} {} {}", left, op, right),
        op: Some(op),
    }
}

fn operand(term: &Term, parent: char, is_right: bool) -> String {
    let needs_parens = match term.op {
        None => false,
        Some(child) => {
            let (child_prec, parent_prec) = (precedence(child), precedence(parent));
            child_prec < parent_prec
                || (is_right && child_prec == parent_prec && (parent == '-' || parent == '/'))
        }
    };

    if needs_parens {
        format!("({})", term.expr)
    } else {
        term.expr.clone()
    }
}

fn precedence(op: char) -> u8 {
    match op {
        '*' | '/' => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tiny evaluator so tests can check solutions independently
    fn eval(expr: &str) -> f64 {
        fn parse_expr(tokens: &[char], pos: &mut usize) -> f64 {
            let mut value = parse_term(tokens, pos);
            while *pos < tokens.len() && (tokens[*pos] == '+' || tokens[*pos] == '-') {
                let op = tokens[*pos];
                *pos += 1;
                let rhs = parse_term(tokens, pos);
                value = if op == '+' { value + rhs } else { value - rhs };
            }
            value
        }
        fn parse_term(tokens: &[char], pos: &mut usize) -> f64 {
            let mut value = parse_atom(tokens, pos);
            while *pos < tokens.len() && (tokens[*pos] == '*' || tokens[*pos] == '/') {
                let op = tokens[*pos];
                *pos += 1;
                let rhs = parse_atom(tokens, pos);
                value = if op == '*' { value * rhs } else { value / rhs };
            }
            value
        }
        fn parse_atom(tokens: &[char], pos: &mut usize) -> f64 {
            if tokens[*pos] == '(' {
                *pos += 1;
                let value = parse_expr(tokens, pos);
                *pos += 1; // ')'
                return value;
            }
            let start = *pos;
            while *pos < tokens.len() && tokens[*pos].is_ascii_digit() {
                *pos += 1;
            }
            tokens[start..*pos].iter().collect::<String>().parse().unwrap()
        }

        let tokens: Vec<char> = expr.chars().filter(|c| !c.is_whitespace()).collect();
        let mut pos = 0;
        parse_expr(&tokens, &mut pos)
    }

    #[test]
    fn test_solvable_sets() {
        for numbers in [[1i64, 2, 3, 4], [4, 7, 8, 8], [3, 3, 8, 8], [1, 5, 5, 5], [10, 10, 4, 4]] {
            let expr = solve(&numbers, 24).unwrap_or_else(|| panic!("no solution for {:?}", numbers));
            assert!((eval(&expr) - 24.0).abs() < 1e-6, "{} != 24", expr);
        }
    }

    #[test]
    fn test_unsolvable_sets() {
        assert_eq!(solve(&[1, 1, 1, 1], 24), None);
        assert_eq!(solve(&[1, 1, 1, 2], 24), None);
    }

    #[test]
    fn test_other_targets_and_sizes() {
        assert_eq!(solve(&[7], 7).as_deref(), Some("7"));
        assert_eq!(solve(&[], 24), None);
        let expr = solve(&[2, 3], 6).unwrap();
        assert_eq!(eval(&expr), 6.0);
    }

    #[test]
    fn test_parenthesization() {
        let a = Term { value: 3.0, expr: "3".into(), op: None };
        let b = Term { value: 2.0, expr: "2".into(), op: None };
        let sum = binary(&a, &b, '-', 1.0);
        let product = binary(&sum, &a, '*', 3.0);
        assert_eq!(product.expr, "(3 - 2) * 3");
        let diff = binary(&a, &sum, '-', 2.0);
        assert_eq!(diff.expr, "3 - (3 - 2)");
    }
}
