//! Textual rewrites that adapt keypad output to a backend's grammar.
//!
//! The keypad emits one token set (`fact(`, `root(`, `random()`, postfix `!`)
//! regardless of the backend. fasteval has no postfix operators, and fend has
//! none of the extension functions, so each backend gets the expression in a
//! form it understands.

use std::borrow::Cow;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_operand_char(c: char) -> bool {
    is_name_char(c) || c == '.'
}

/// Byte index of the `(` matching the `)` that ends `text`.
fn matching_open(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().rev() {
        match b {
            b')' => depth += 1,
            b'(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the `)` matching the `(` that starts `text`.
fn matching_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Start of the operand that ends `text`: a number or name, a bracketed
/// group, or a call such as `sqrt(4)`.
fn operand_start(text: &str) -> Option<usize> {
    let operand = text.trim_end();
    let mut start = operand.len();
    if operand.ends_with(')') {
        start = matching_open(operand)?;
    }
    start = text[..start].trim_end_matches(is_operand_char).len();
    (start < operand.len()).then_some(start)
}

/// Turn postfix `!` into `fact(..)` around the preceding operand.
///
/// `2+3!` becomes `2+fact(3)`, `(2+3)!` becomes `fact((2+3))`. A `!` with no
/// operand before it, or one that starts `!=`, is left alone.
pub fn expand_factorials(expression: &str) -> Cow<'_, str> {
    if !expression.contains('!') {
        return Cow::Borrowed(expression);
    }

    let mut out = String::with_capacity(expression.len() + 8);
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '!' && chars.peek() != Some(&'=') {
            if let Some(start) = operand_start(&out) {
                out.insert_str(start, "fact(");
                out.push(')');
                continue;
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Split call arguments on commas outside of brackets.
fn split_arguments(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut from = 0;
    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                args.push(inner[from..i].trim());
                from = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[from..].trim());
    args
}

/// Replace every call `name(args)` with whatever `render` makes of its
/// arguments. Nested calls are rewritten first; calls `render` declines are
/// kept as written.
fn rewrite_calls(
    expression: &str,
    name: &str,
    render: &dyn Fn(&[&str]) -> Option<String>,
) -> String {
    let pattern = format!("{name}(");
    let mut out = String::with_capacity(expression.len());
    let mut rest = expression;

    while let Some(pos) = rest.find(&pattern) {
        let open = pos + name.len();
        out.push_str(&rest[..pos]);

        let preceded_by_name = out.chars().next_back().is_some_and(is_name_char);
        let close = match matching_close(&rest[open..]) {
            Some(offset) if !preceded_by_name => open + offset,
            _ => {
                out.push_str(&rest[pos..=open]);
                rest = &rest[open + 1..];
                continue;
            }
        };

        let inner = rewrite_calls(&rest[open + 1..close], name, render);
        match render(&split_arguments(&inner)) {
            Some(replacement) => out.push_str(&replacement),
            None => {
                out.push_str(&pattern);
                out.push_str(&inner);
                out.push(')');
            }
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Translate the keypad's extension calls into fend syntax.
///
/// `fact(x)` becomes `((x)!)`, `root(x, n)` becomes `((x)^(1/(n)))` and
/// `random()` is replaced by a freshly drawn number in `[0, 1)`.
pub fn to_fend_syntax(expression: &str) -> Cow<'_, str> {
    if !["fact(", "root(", "random("]
        .iter()
        .any(|name| expression.contains(name))
    {
        return Cow::Borrowed(expression);
    }

    let text = rewrite_calls(expression, "random", &|args| match args {
        [""] => Some(format!("({})", rand::random::<f64>())),
        _ => None,
    });
    let text = rewrite_calls(&text, "root", &|args| match args {
        [x, n] => Some(format!("(({x})^(1/({n})))")),
        _ => None,
    });
    let text = rewrite_calls(&text, "fact", &|args| match args {
        [x] => Some(format!("(({x})!)")),
        _ => None,
    });
    Cow::Owned(text)
}
