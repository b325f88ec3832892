//! Expand SQL templates such as `replace({0}, {1}, {2})`.

use query_engine_sql::sql;

use crate::translation::error::Error;

/// Replace each `{n}` placeholder with the n-th argument. Anything else, including braces
/// that do not enclose a number, is copied verbatim.
pub fn expand(
    template: &str,
    args: Vec<sql::ast::Expression>,
) -> Result<sql::ast::Expression, Error> {
    let mut items = vec![];
    let mut text = String::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let placeholder = after
            .find('}')
            .and_then(|end| after[..end].parse::<usize>().ok().map(|index| (index, end)));

        match placeholder {
            Some((index, end)) => {
                let arg = args
                    .get(index)
                    .ok_or_else(|| Error::TemplatePlaceholderOutOfRange {
                        template: template.to_string(),
                        index,
                        count: args.len(),
                    })?;
                text.push_str(&rest[..start]);
                if !text.is_empty() {
                    items.push(sql::ast::RawSql::RawText(std::mem::take(&mut text)));
                }
                items.push(sql::ast::RawSql::Expression(arg.clone()));
                rest = &after[end + 1..];
            }
            None => {
                text.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        items.push(sql::ast::RawSql::RawText(text));
    }

    Ok(sql::ast::Expression::RawSql(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(n: i64) -> sql::ast::Expression {
        sql::ast::Expression::Value(sql::ast::Value::Int8(n))
    }

    #[test]
    fn placeholders_become_expressions() {
        let expanded = expand("f({1}, {0})", vec![arg(0), arg(1)]).unwrap();
        assert_eq!(
            expanded,
            sql::ast::Expression::RawSql(vec![
                sql::ast::RawSql::RawText("f(".to_string()),
                sql::ast::RawSql::Expression(arg(1)),
                sql::ast::RawSql::RawText(", ".to_string()),
                sql::ast::RawSql::Expression(arg(0)),
                sql::ast::RawSql::RawText(")".to_string()),
            ])
        );
    }

    #[test]
    fn braces_without_a_number_are_text() {
        let expanded = expand("'{x}' || {0}", vec![arg(3)]).unwrap();
        assert_eq!(
            expanded,
            sql::ast::Expression::RawSql(vec![
                sql::ast::RawSql::RawText("'{x}' || ".to_string()),
                sql::ast::RawSql::Expression(arg(3)),
            ])
        );
    }

    #[test]
    fn out_of_range_placeholders_fail() {
        assert_eq!(
            expand("f({2})", vec![arg(0)]),
            Err(Error::TemplatePlaceholderOutOfRange {
                template: "f({2})".to_string(),
                index: 2,
                count: 1,
            })
        );
    }
}
