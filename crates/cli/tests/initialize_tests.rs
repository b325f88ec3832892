use querydsl_cli::{run, Command, Context};
use querydsl_configuration as configuration;

#[tokio::test]
async fn initialize_writes_a_configuration_that_parses() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let context = Context {
        context_path: dir.path().to_owned(),
    };

    run(Command::Initialize, &context).await?;

    let parsed = configuration::parse_configuration(dir.path()).await?;
    assert_eq!(parsed, configuration::ParsedConfiguration::initial());
    assert!(dir
        .path()
        .join(configuration::CONFIGURATION_JSONSCHEMA_FILENAME)
        .exists());
    Ok(())
}

#[tokio::test]
async fn initialize_refuses_to_overwrite() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let context = Context {
        context_path: dir.path().to_owned(),
    };

    run(Command::Initialize, &context).await?;
    let second = run(Command::Initialize, &context).await;

    assert!(second.is_err());
    Ok(())
}

#[tokio::test]
async fn validate_reports_missing_configuration() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let context = Context {
        context_path: dir.path().to_owned(),
    };

    assert!(run(Command::Validate, &context).await.is_err());
    Ok(())
}
