//! Translate the select list and describe how result rows map back to the selected items.

use query_engine_metadata::metadata;
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{
    AssociationLayout, ColumnLayout, EntityLayout, SelectItemLayout,
};
use querydsl_models as models;

use super::filtering;
use super::typing;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope, Source, State};

type Columns = Vec<(sql::ast::ColumnAlias, sql::ast::Expression)>;

/// A fetch join: the association `association` of `owner` is loaded from `target`.
struct FetchJoin<'q> {
    owner: &'q str,
    association: &'q str,
    target: &'q str,
}

/// Translate the select list of a top level query. Entities expand to all of their columns;
/// every output column gets a fresh alias.
pub(crate) fn translate_fields(
    env: &Env,
    state: &mut State,
    scope: &Scope,
    query: &models::QueryDescriptor,
) -> Result<(Columns, Vec<SelectItemLayout>), Error> {
    let fetches = fetch_joins(query);
    let mut columns = vec![];
    let mut layout = vec![];

    for item in &query.select {
        match item.unaliased() {
            models::Expression::Entity(entity) => {
                let source = scope.lookup_entity(&entity.alias, &entity.entity)?;
                let entity_layout = translate_entity(
                    state,
                    scope,
                    &fetches,
                    &entity.alias,
                    source,
                    &mut columns,
                )?;
                layout.push(SelectItemLayout::Entity(entity_layout));
            }
            _ => {
                let expression = filtering::translate_expression(env, scope, item)?;
                let alias = state.make_column_alias();
                columns.push((alias.clone(), expression));
                layout.push(SelectItemLayout::Scalar(ColumnLayout {
                    alias,
                    r#type: typing::infer_type(env, scope, item),
                }));
            }
        }
    }

    Ok((columns, layout))
}

/// Translate the select list of a subquery. Items are named after their output name so an
/// enclosing query can refer to them; entities stand for their key.
pub(crate) fn translate_subquery_fields(
    env: &Env,
    scope: &Scope,
    query: &models::QueryDescriptor,
) -> Result<(Columns, Vec<(String, Option<metadata::ScalarType>)>), Error> {
    let mut columns = vec![];
    let mut output = vec![];

    for (index, item) in query.select.iter().enumerate() {
        let name = item
            .output_name()
            .map_or_else(|| format!("c{index}"), ToString::to_string);
        let expression = filtering::translate_expression(env, scope, item)?;
        columns.push((sql::helpers::make_column_alias(name.clone()), expression));
        output.push((name, typing::infer_type(env, scope, item)));
    }

    Ok((columns, output))
}

fn fetch_joins(query: &models::QueryDescriptor) -> Vec<FetchJoin<'_>> {
    query
        .joins
        .iter()
        .filter(|join| join.fetch)
        .filter_map(|join| match &join.target {
            models::JoinTarget::Association { path, alias } => Some(FetchJoin {
                owner: &path.root.alias,
                association: &path.attribute,
                target: &alias.alias,
            }),
            _ => None,
        })
        .collect()
}

/// Add the columns of an entity to the select list and describe them.
fn translate_entity(
    state: &mut State,
    scope: &Scope,
    fetches: &[FetchJoin],
    alias: &str,
    source: &Source,
    columns: &mut Columns,
) -> Result<EntityLayout, Error> {
    let Source::Table {
        entity,
        info,
        reference,
    } = source
    else {
        return Err(Error::NotAnEntity(alias.to_string()));
    };

    let mut attributes = vec![];
    let mut key = None;
    for (attribute, column_info) in &info.columns {
        let (column_alias, expression) = sql::helpers::make_column(
            reference.clone(),
            sql::ast::ColumnName(column_info.name.clone()),
            state.make_column_alias(),
        );
        columns.push((column_alias.clone(), expression));
        let column = ColumnLayout {
            alias: column_alias,
            r#type: Some(column_info.r#type),
        };
        if *attribute == info.key {
            key = Some(column.clone());
        }
        attributes.push((attribute.clone(), column));
    }
    let key = key.ok_or_else(|| Error::AttributeNotFound {
        entity: entity.clone(),
        attribute: info.key.clone(),
    })?;

    let mut associations = vec![];
    for (name, association) in &info.associations {
        let (column_alias, expression) = sql::helpers::make_column(
            reference.clone(),
            sql::ast::ColumnName(association.foreign_key_column.clone()),
            state.make_column_alias(),
        );
        columns.push((column_alias.clone(), expression));

        let fetched = match fetches
            .iter()
            .find(|fetch| fetch.owner == alias && fetch.association == name)
        {
            Some(fetch) => {
                let target = scope.lookup(fetch.target)?;
                Some(Box::new(translate_entity(
                    state,
                    scope,
                    fetches,
                    fetch.target,
                    target,
                    columns,
                )?))
            }
            None => None,
        };

        associations.push(AssociationLayout {
            name: name.clone(),
            target_entity: association.target_entity.clone(),
            foreign_key: ColumnLayout {
                alias: column_alias,
                r#type: Some(metadata::ScalarType::Integer),
            },
            fetched,
        });
    }

    Ok(EntityLayout {
        entity: entity.clone(),
        key,
        columns: attributes,
        associations,
    })
}
