//! CSV splitting for query values (`filter[name]="Smith, John",Doe`).

/// Splits one query value into its comma-separated parts.
///
/// Unquoted commas split. A value that starts with `"` and never closes a
/// quote before a comma (no `",` anywhere) is one literal, outer quotes
/// stripped. Inside quotes, `""` is an escaped quote.
pub fn split_csv(value: &str) -> Vec<String> {
    if value.starts_with('"') && !value.contains("\",") {
        let inner = value.strip_prefix('"').unwrap_or(value);
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        return vec![inner.replace("\"\"", "\"")];
    }

    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(core::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    values.push(current);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_commas_split() {
        assert_eq!(split_csv("1,2,3"), vec!["1", "2", "3"]);
        assert_eq!(split_csv("20"), vec!["20"]);
    }

    #[test]
    fn single_quoted_value_is_literal() {
        assert_eq!(split_csv("\"Smith, John\""), vec!["Smith, John"]);
        assert_eq!(split_csv("\"a,b,c"), vec!["a,b,c"]);
    }

    #[test]
    fn quoted_values_in_a_list() {
        assert_eq!(split_csv("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(split_csv("x,\"y, z\""), vec!["x", "y, z"]);
    }

    #[test]
    fn escaped_quotes() {
        assert_eq!(split_csv("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn empty_parts_are_kept() {
        assert_eq!(split_csv(""), vec![""]);
        assert_eq!(split_csv("a,,b"), vec!["a", "", "b"]);
    }
}
