//! Synthesis-only command

use anyhow::{Context, Result};
use apitest_core::parser::{OpenApiResolver, SchemaResolver};
use apitest_core::runner::{CommandRunner, SuiteRunner};
use apitest_core::test_gen::Synthesizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::load_config;
use crate::cli::app::GenerateArgs;

pub async fn execute(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    args.suite.apply(&mut config.suite);

    let source = args.source.to_source();
    println!("Reading API document from: {}", source);
    let document = source.fetch().await.context("Failed to fetch API document")?;

    let resolution = OpenApiResolver::new().resolve(&document).context("Failed to resolve API document")?;
    for warning in &resolution.warnings {
        println!("  warn {} {}", warning.path.as_deref().unwrap_or("-"), warning.message);
    }

    let synthesis = Synthesizer::new(config.suite.clone()).synthesize(&resolution.document);
    for warning in &synthesis.warnings {
        println!("  warn {} {}", warning.path.as_deref().unwrap_or("-"), warning.message);
    }

    let written = synthesis
        .write_to(&args.out)
        .await
        .with_context(|| format!("Failed to write test package to {}", args.out.display()))?;
    info!("Wrote {} files below {}", written.len(), args.out.display());

    if config.suite.format_output {
        let runner = SuiteRunner::new(config.runner.clone(), Arc::new(CommandRunner::new()));
        let sources: Vec<PathBuf> = synthesis
            .artifacts
            .iter()
            .filter(|a| a.path.extension().is_some_and(|ext| ext == "rs"))
            .map(|a| a.path.clone())
            .collect();
        if let Err(e) = runner.format(&args.out, &sources).await {
            println!("  warn formatting failed: {}", e);
        }
    }

    println!(
        "\n Generated {} test(s) for {} operation(s) in {}",
        synthesis.test_count,
        resolution.document.operations.len(),
        args.out.display()
    );
    println!("  Run them with: cd {} && cargo test --test api_tests", args.out.display());
    Ok(())
}
