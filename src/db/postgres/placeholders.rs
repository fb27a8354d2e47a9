//! Placeholder translation for PostgreSQL.
//!
//! Queries are written with positional `?` placeholders. PostgreSQL expects
//! numbered `$n` placeholders, so each `?` outside of string literals, quoted
//! identifiers, comments and dollar-quoted bodies is rewritten in order.

/// Rewrite `?` placeholders to `$1..$n`.
pub fn translate_placeholders(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut count = 0usize;
    let mut i = 0;

    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let end = match c {
            '\'' => {
                let backslash_escapes = i > 0 && matches!(chars[i - 1], 'E' | 'e');
                Some(skip_quoted(&chars, i, '\'', backslash_escapes))
            }
            '"' => Some(skip_quoted(&chars, i, '"', false)),
            '-' if next == Some('-') => Some(skip_line_comment(&chars, i)),
            '/' if next == Some('*') => Some(skip_block_comment(&chars, i)),
            '$' => skip_dollar_quoted(&chars, i),
            _ => None,
        };

        if let Some(end) = end {
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        if c == '?' {
            count += 1;
            out.push('$');
            out.push_str(&count.to_string());
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

/// Index just past the closing quote (or the end of input).
fn skip_quoted(chars: &[char], start: usize, quote: char, backslash_escapes: bool) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if backslash_escapes && c == '\\' {
            i += 2;
            continue;
        }
        if c == quote {
            // doubled quote is an escaped quote
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

fn skip_line_comment(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |offset| start + offset)
}

fn skip_block_comment(chars: &[char], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

/// Skip a `$tag$ ... $tag$` body. Returns `None` if `start` is not an opening tag.
fn skip_dollar_quoted(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    if chars.get(j) != Some(&'$') {
        return None;
    }

    let tag = &chars[start..=j];
    let mut i = j + 1;
    while i + tag.len() <= chars.len() {
        if &chars[i..i + tag.len()] == tag {
            return Some(i + tag.len());
        }
        i += 1;
    }
    Some(chars.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT name FROM users WHERE id = ?", "SELECT name FROM users WHERE id = $1")]
    #[case("INSERT INTO t (a, b) VALUES (?, ?)", "INSERT INTO t (a, b) VALUES ($1, $2)")]
    #[case("SELECT 1", "SELECT 1")]
    #[case("SELECT $1", "SELECT $1")]
    fn test_translates_placeholders(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(translate_placeholders(input), expected);
    }

    #[rstest]
    #[case("SELECT '?' , ?", "SELECT '?' , $1")]
    #[case("SELECT 'it''s ?', ?", "SELECT 'it''s ?', $1")]
    #[case(r"SELECT E'it\'s ?', ?", r"SELECT E'it\'s ?', $1")]
    #[case(r#"SELECT "col?" FROM t WHERE a = ?"#, r#"SELECT "col?" FROM t WHERE a = $1"#)]
    #[case("SELECT ? -- why?\n, ?", "SELECT $1 -- why?\n, $2")]
    #[case("SELECT /* ? */ ?", "SELECT /* ? */ $1")]
    #[case("SELECT $$ ? $$, ?", "SELECT $$ ? $$, $1")]
    #[case("SELECT $body$ ? $body$, ?", "SELECT $body$ ? $body$, $1")]
    fn test_skips_quoted_and_commented(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(translate_placeholders(input), expected);
    }

    #[test]
    fn test_unterminated_literal_is_copied() {
        assert_eq!(translate_placeholders("SELECT '?"), "SELECT '?");
    }
}
