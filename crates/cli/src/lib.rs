//! The commands of the querydsl command line tool.

use std::path::PathBuf;

use clap::Subcommand;

use querydsl_configuration as configuration;

/// The various contextual bits and bobs we need to run.
pub struct Context {
    pub context_path: PathBuf,
}

/// The command invoked by the user.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write an initial configuration, and its JSON schema, into the context directory.
    Initialize,
    /// Print the JSON schema of the configuration file to standard output.
    PrintSchema,
    /// Check that the configuration in the context directory parses and resolves.
    Validate,
}

/// Run a command in a given context.
pub async fn run(command: Command, context: &Context) -> anyhow::Result<()> {
    match command {
        Command::Initialize => initialize(context).await?,
        Command::PrintSchema => print_schema()?,
        Command::Validate => validate(context).await?,
    };
    Ok(())
}

/// Fails if a configuration file already exists, so that an existing project is never
/// overwritten.
async fn initialize(context: &Context) -> anyhow::Result<()> {
    let configuration_file = context
        .context_path
        .join(configuration::CONFIGURATION_FILENAME);
    if tokio::fs::try_exists(&configuration_file).await? {
        anyhow::bail!(
            "a configuration file already exists at {}",
            configuration_file.display()
        );
    }

    configuration::write_parsed_configuration(
        configuration::ParsedConfiguration::initial(),
        &context.context_path,
    )
    .await?;
    tracing::info!(path = %context.context_path.display(), "configuration initialized");
    Ok(())
}

fn print_schema() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(configuration::ParsedConfiguration);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

async fn validate(context: &Context) -> anyhow::Result<()> {
    let parsed = configuration::parse_configuration(&context.context_path).await?;
    let entities = parsed.metadata.tables.0.len();
    configuration::make_runtime_configuration(
        parsed,
        configuration::environment::ProcessEnvironment,
    )?;
    tracing::info!(entities, "configuration is valid");
    Ok(())
}
