//! Translate the sources of a query: its from clause and its joins.

use query_engine_sql::sql;
use querydsl_models as models;

use super::filtering;
use super::root;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope, Source};

/// Declare every source of the query in `scope` and build the FROM clause and joins.
///
/// Each join condition is translated as soon as its join is declared, so it can only refer
/// to aliases declared before it (or in enclosing queries).
pub fn translate_sources<'a>(
    env: &Env<'a>,
    scope: &mut Scope<'_, 'a>,
    query: &models::QueryDescriptor,
) -> Result<(Option<sql::ast::From>, Vec<sql::ast::Join>), Error> {
    let mut from = None;
    let mut joins = vec![];

    for (index, entity) in query.from.iter().enumerate() {
        let source = Source::aliased_table(env, &entity.entity, &entity.alias)?;
        let relation = table_relation(&source, &entity.alias)?;
        scope.add_source(&entity.alias, source)?;
        // further sources without a predicate form a cartesian product
        if index == 0 {
            from = Some(relation);
        } else {
            joins.push(sql::ast::Join::CrossJoin(sql::ast::CrossJoin { relation }));
        }
    }

    if from.is_none() && !query.joins.is_empty() {
        return Err(Error::JoinWithoutFrom);
    }

    for join in &query.joins {
        joins.push(translate_join(env, scope, join)?);
    }

    Ok((from, joins))
}

fn translate_join<'a>(
    env: &Env<'a>,
    scope: &mut Scope<'_, 'a>,
    join: &models::JoinClause,
) -> Result<sql::ast::Join, Error> {
    match &join.target {
        models::JoinTarget::Association { path, alias } => {
            let (source, association_on) = association_source(env, scope, path, alias)?;
            let relation = table_relation(&source, &alias.alias)?;
            scope.add_source(&alias.alias, source)?;
            let on = match &join.on {
                None => association_on,
                Some(on) => sql::helpers::and(
                    association_on,
                    filtering::translate_expression(env, scope, on)?,
                ),
            };
            Ok(match join.kind {
                models::JoinKind::Left => {
                    sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin { relation, on })
                }
                models::JoinKind::Inner | models::JoinKind::Cartesian => {
                    sql::ast::Join::InnerJoin(sql::ast::InnerJoin { relation, on })
                }
            })
        }
        models::JoinTarget::Entity(entity) => {
            if join.fetch {
                return Err(Error::FetchJoinWithoutAssociation);
            }
            let source = Source::aliased_table(env, &entity.entity, &entity.alias)?;
            let relation = table_relation(&source, &entity.alias)?;
            scope.add_source(&entity.alias, source)?;
            join_relation(env, scope, join, relation)
        }
        models::JoinTarget::SubQuery { query, alias } => {
            if join.fetch {
                return Err(Error::FetchJoinWithoutAssociation);
            }
            let (select, columns) = root::translate_subquery(env, scope, query)?;
            let table_alias = sql::helpers::make_table_alias(alias.clone());
            let relation = sql::ast::From::Select {
                select: Box::new(select),
                alias: table_alias.clone(),
            };
            scope.add_source(
                alias,
                Source::Derived {
                    reference: sql::ast::TableReference::AliasedTable(table_alias),
                    columns,
                },
            )?;
            join_relation(env, scope, join, relation)
        }
    }
}

/// Join a relation that has no implied predicate. Without `on` an inner join is a
/// cartesian product.
fn join_relation(
    env: &Env,
    scope: &Scope,
    join: &models::JoinClause,
    relation: sql::ast::From,
) -> Result<sql::ast::Join, Error> {
    let on = join
        .on
        .as_ref()
        .map(|on| filtering::translate_expression(env, scope, on))
        .transpose()?;

    Ok(match (join.kind, on) {
        (models::JoinKind::Left, on) => sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin {
            relation,
            on: on.unwrap_or_else(sql::helpers::true_expr),
        }),
        (models::JoinKind::Inner | models::JoinKind::Cartesian, Some(on)) => {
            sql::ast::Join::InnerJoin(sql::ast::InnerJoin { relation, on })
        }
        (models::JoinKind::Inner | models::JoinKind::Cartesian, None) => {
            sql::ast::Join::CrossJoin(sql::ast::CrossJoin { relation })
        }
    })
}

/// Resolve the target of an association join and the foreign key predicate that links it
/// to its owner.
fn association_source<'a>(
    env: &Env<'a>,
    scope: &Scope<'_, 'a>,
    path: &models::Path,
    alias: &models::EntityPath,
) -> Result<(Source<'a>, sql::ast::Expression), Error> {
    let owner = scope.lookup_entity(&path.root.alias, &path.root.entity)?;
    let Source::Table { entity, info, .. } = owner else {
        return Err(Error::NotAnEntity(path.root.alias.clone()));
    };

    let association = info.lookup_association(&path.attribute).ok_or_else(|| {
        if info.lookup_column(&path.attribute).is_some() {
            Error::NotAnAssociation {
                entity: entity.clone(),
                attribute: path.attribute.clone(),
            }
        } else {
            Error::AttributeNotFound {
                entity: entity.clone(),
                attribute: path.attribute.clone(),
            }
        }
    })?;

    if association.target_entity != alias.entity {
        return Err(Error::AssociationTargetMismatch {
            association: path.attribute.clone(),
            expected: association.target_entity.clone(),
            found: alias.entity.clone(),
        });
    }

    let (foreign_key, _) = owner.resolve_attribute(&path.root.alias, &path.attribute)?;
    let target = Source::aliased_table(env, &alias.entity, &alias.alias)?;
    let key = target.key_reference(&alias.alias)?;

    let on = sql::ast::Expression::BinaryOperation {
        left: Box::new(sql::ast::Expression::ColumnReference(foreign_key)),
        operator: filtering::translate_comparison_operator(models::ComparisonOperator::Equal),
        right: Box::new(sql::ast::Expression::ColumnReference(key)),
    };

    Ok((target, on))
}

/// The FROM/JOIN relation of a table source.
fn table_relation(source: &Source, alias: &str) -> Result<sql::ast::From, Error> {
    match source {
        Source::Table { info, .. } => Ok(sql::ast::From::Table {
            reference: sql::helpers::db_table(&info.table_name),
            alias: sql::helpers::make_table_alias(alias.to_string()),
        }),
        Source::Derived { .. } => Err(Error::NotAnEntity(alias.to_string())),
    }
}
