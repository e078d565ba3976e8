//! Command implementations for the chatscore CLI.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{ChatscoreError, Result};
use crate::ml::MessageContext;
use crate::ml::churn::UserActivity;
use crate::ml::clustering::Conversation;
use crate::ml::pipeline::{MLPipeline, PipelineConfig, ScoredMessage};
use crate::ml::recommendation::RecommendationContext;

/// Execute a CLI command.
pub fn execute_command(args: ChatscoreArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Analyze(analyze_args) => analyze_message(analyze_args.clone(), config, &args),
        Command::Batch(batch_args) => analyze_batch(batch_args.clone(), config, &args),
        Command::Churn(churn_args) => predict_churn(churn_args.clone(), config, &args),
        Command::Recommend(recommend_args) => recommend(recommend_args.clone(), config, &args),
        Command::Faq(faq_args) => generate_faqs(faq_args.clone(), config, &args),
        Command::Config => output_result("Effective configuration", &config, &args),
    }
}

/// Configuration from `--config`, or the defaults.
fn load_config(args: &ChatscoreArgs) -> Result<PipelineConfig> {
    match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            PipelineConfig::from_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Score a single message.
fn analyze_message(
    args: AnalyzeArgs,
    config: PipelineConfig,
    cli_args: &ChatscoreArgs,
) -> Result<()> {
    let mut context: MessageContext = parse_json_arg(args.context.as_deref())?;
    if let Some(user) = args.user {
        context.user_id = Some(user);
    }

    let pipeline = MLPipeline::new(config)?;
    let analysis = runtime()?.block_on(pipeline.analyze_message(&args.message, context));

    output_result("Message analysis", &analysis, cli_args)
}

/// Score every message of a file.
fn analyze_batch(args: BatchArgs, config: PipelineConfig, cli_args: &ChatscoreArgs) -> Result<()> {
    let messages: Vec<ScoredMessage> = read_json_file(&args.messages_file)?;
    debug!("scoring {} messages", messages.len());

    let pipeline = MLPipeline::new(config)?;
    let analyses = runtime()?.block_on(pipeline.analyze_batch(&messages));

    output_result(
        &format!("Analyzed {} messages", analyses.len()),
        &analyses,
        cli_args,
    )
}

/// Predict churn risk for one user.
fn predict_churn(args: ChurnArgs, config: PipelineConfig, cli_args: &ChatscoreArgs) -> Result<()> {
    let activity: UserActivity = read_json_file(&args.activity_file)?;
    let pipeline = MLPipeline::new(config)?;
    let result = pipeline.predict_churn(&args.user_id, &activity);

    output_result("Churn prediction", &result, cli_args)
}

/// Recommend products for one user.
fn recommend(args: RecommendArgs, config: PipelineConfig, cli_args: &ChatscoreArgs) -> Result<()> {
    let context: RecommendationContext = parse_json_arg(args.context.as_deref())?;
    let pipeline = MLPipeline::new(config)?;
    let bundle = pipeline.get_recommendations(&args.user_id, &context);

    output_result("Recommendations", &bundle, cli_args)
}

/// Cluster conversations and draft FAQs.
fn generate_faqs(args: FaqArgs, config: PipelineConfig, cli_args: &ChatscoreArgs) -> Result<()> {
    let conversations: Vec<Conversation> = read_json_file(&args.conversations_file)?;
    let pipeline = MLPipeline::new(config)?;
    let mut report = pipeline.generate_faqs(&conversations)?;

    if !args.clusters {
        report.clusters.clear();
    }

    output_result(
        &format!(
            "{} FAQ entries from {} conversations",
            report.faqs.len(),
            conversations.len()
        ),
        &report,
        cli_args,
    )
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Parse an optional JSON argument; an absent argument yields the default.
fn parse_json_arg<T: DeserializeOwned + Default>(json: Option<&str>) -> Result<T> {
    match json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| ChatscoreError::other(format!("invalid --context JSON: {e}"))),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_json_arg() {
        let context: MessageContext =
            parse_json_arg(Some(r#"{"userId": "u1", "ipMismatch": true}"#)).unwrap();
        assert_eq!(context.user_id.as_deref(), Some("u1"));
        assert!(context.ip_mismatch);

        let context: RecommendationContext = parse_json_arg(None).unwrap();
        assert!(context.category.is_none());

        let result: Result<MessageContext> = parse_json_arg(Some("{"));
        assert!(matches!(result, Err(ChatscoreError::Other(_))));
    }

    #[test]
    fn test_read_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"question": "How do I reset my password?", "answer": "Use the reset link."}}]"#
        )
        .unwrap();

        let conversations: Vec<Conversation> = read_json_file(file.path()).unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].answer, "Use the reset link.");
    }

    #[test]
    fn test_execute_churn_command() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"supportTickets": 2, "satisfactionScore": 0.9}}"#).unwrap();

        let args = ChatscoreArgs {
            verbose: 0,
            quiet: true,
            config: None,
            output_format: OutputFormat::Json,
            pretty: false,
            command: Command::Churn(ChurnArgs {
                user_id: "user_1".to_string(),
                activity_file: file.path().to_path_buf(),
            }),
        };
        assert!(execute_command(args).is_ok());
    }

    #[test]
    fn test_execute_with_missing_config() {
        let args = ChatscoreArgs {
            verbose: 0,
            quiet: true,
            config: Some("/nonexistent/chatscore.json".into()),
            output_format: OutputFormat::Human,
            pretty: false,
            command: Command::Config,
        };
        assert!(matches!(execute_command(args), Err(ChatscoreError::Io(_))));
    }
}
