//! Full pipeline command

use anyhow::{Result, bail};
use apitest_core::notify::{ChannelSubscriber, ProgressNotifier, SubscriberRegistry};
use apitest_core::pipeline::{DescriptorStore, InMemoryStore, Severity, TestMessage};
use apitest_core::runner::CommandRunner;
use apitest_core::{Orchestrator, PipelineError, TestDescriptor};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::load_config;
use crate::cli::app::RunArgs;

pub async fn execute(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    args.suite.apply(&mut config.suite);
    if let Some(dir) = args.output_dir {
        config.output_root = dir;
    }
    if let Some(dir) = args.archive_dir {
        config.archive_root = dir;
    }
    config.keep_archive |= args.keep_archive;
    if args.timeout.is_some() {
        config.runner.timeout_secs = args.timeout;
    }

    let source = args.source.to_source();
    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(SubscriberRegistry::new());

    let (subscriber, mut updates) = ChannelSubscriber::channel(16);
    let printer_id = registry.subscribe(Arc::new(subscriber));
    let printer = tokio::spawn(async move {
        while let Some(payload) = updates.recv().await {
            match serde_json::from_str::<TestDescriptor>(&payload) {
                Ok(descriptor) => println!("[{}] {}", descriptor.id, descriptor.status),
                Err(e) => debug!("Unreadable progress update: {}", e),
            }
        }
    });

    let notifier = Arc::new(ProgressNotifier::new(store.clone(), registry.clone()));
    let orchestrator = Orchestrator::new(config, Arc::new(CommandRunner::new()), store.clone(), notifier);

    let mut descriptor = TestDescriptor::new();
    info!("Testing {} as run {}", source, descriptor.id);
    let result = orchestrator.run(&mut descriptor, &source).await;

    registry.unsubscribe(printer_id);
    let _ = printer.await;

    let messages = store.messages(descriptor.id).await.unwrap_or_default();
    print_outcomes(&messages);

    match result {
        Ok(summary) => {
            println!("\n✅ {} test(s) passed", summary.succeeded);
            if let Some(path) = summary.log_path {
                println!("  Log: {}", path.display());
            }
            if let Some(path) = summary.archive_path {
                println!("  Archive: {}", path.display());
            }
            Ok(())
        }
        Err(PipelineError::TestsFailed { succeeded, failed }) => {
            println!("\n❌ {} failed, {} passed", failed, succeeded);
            bail!("{} test(s) failed", failed)
        }
        Err(e) => {
            if let PipelineError::ExecutionFailed { log, .. } = &e {
                eprintln!("{}", log.trim_end());
            }
            Err(e.into())
        }
    }
}

fn print_outcomes(messages: &[TestMessage]) {
    let outcomes: Vec<_> = messages.iter().filter(|m| m.path.is_some() || m.severity == Severity::Warning).collect();
    if outcomes.is_empty() {
        return;
    }

    println!("\nResults:");
    for message in outcomes {
        let marker = match message.severity {
            Severity::Success => "ok  ",
            Severity::Error => "FAIL",
            Severity::Warning => "warn",
            Severity::Debug | Severity::Info => "    ",
        };
        println!(
            "  {} {} [{}] {}",
            marker,
            message.path.as_deref().unwrap_or("-"),
            message.context,
            message.message
        );
    }
}
