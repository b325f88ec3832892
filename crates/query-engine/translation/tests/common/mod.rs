use query_engine_metadata::metadata;
use query_engine_sql::sql;

/// Load the Member/Team mapping used across the workspace tests.
pub async fn member_metadata() -> anyhow::Result<metadata::Metadata> {
    let parsed_configuration =
        querydsl_configuration::parse_configuration("../../../static").await?;
    let configuration = querydsl_configuration::make_runtime_configuration(
        parsed_configuration,
        querydsl_configuration::environment::FixedEnvironment::default(),
    )?;
    Ok(configuration.metadata)
}

/// The parameters of a query, numbered the way they appear in the SQL text.
pub fn numbered_params(query: &sql::string::SQL) -> String {
    let params: Vec<(usize, &sql::string::Param)> = query
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| (i + 1, p))
        .collect();
    format!("{params:?}")
}

/// The query pretty printed, followed by its parameters.
pub fn pretty(query: &sql::string::SQL) -> String {
    let pretty = sqlformat::format(
        &query.sql,
        &sqlformat::QueryParams::None,
        sqlformat::FormatOptions::default(),
    );
    format!("{}\n\n{}", pretty, numbered_params(query))
}
