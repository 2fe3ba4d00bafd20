//! Simplification subcommand handlers.

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use focusflow_core::page::discover;
use focusflow_core::{AdapterOptions, PageAdapter, PageTree, SimplifierService};
use focusflow_protocols::{new_page_id, BatchItem, Grade, OutcomeSource};

use crate::pipeline::Pipeline;

fn source_label(source: OutcomeSource) -> &'static str {
    match source {
        OutcomeSource::Cache => "cache",
        OutcomeSource::Remote => "remote",
        OutcomeSource::Fallback => "fallback",
    }
}

/// Page id derived from the file name, e.g. `article_1700000000000`.
fn page_id_for(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    new_page_id(&stem)
}

async fn load_page(file: &Path) -> Result<PageTree, Box<dyn std::error::Error>> {
    let json = tokio::fs::read_to_string(file).await?;
    Ok(PageTree::from_json(&json)?)
}

pub(crate) async fn probe(pipeline: Pipeline) -> Result<(), Box<dyn std::error::Error>> {
    let available = pipeline.coordinator.probe().await;
    println!(
        "{} ({})",
        if available { "available" } else { "unavailable" },
        pipeline.coordinator.remote().id()
    );
    Ok(())
}

pub(crate) async fn simplify(
    pipeline: Pipeline,
    grade: Option<Grade>,
    page_id: Option<String>,
    text: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let grade = pipeline.grade(grade)?;
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    if text.trim().is_empty() {
        return Err("nothing to simplify".into());
    }
    let page_id = page_id.unwrap_or_else(|| new_page_id("cli"));

    let (service, handle) =
        SimplifierService::new(pipeline.coordinator.clone(), pipeline.service_options());
    let jobs = service.jobs();
    tokio::spawn(service.run());

    let outcome = handle.simplify_text(text, grade, page_id.clone()).await?;
    println!("{}", outcome.text);
    eprintln!("source: {}, grade: {}", source_label(outcome.source), grade);

    // Let the other grades finish warming before the process exits.
    if let Some(job) = jobs.take(&page_id) {
        match job.join().await {
            Ok(report) => info!(
                page_id = %page_id,
                cached = report.cached,
                skipped = report.skipped,
                failed = report.failed,
                "Precompute finished"
            ),
            Err(e) => warn!(page_id = %page_id, error = %e, "Precompute task failed"),
        }
    }
    Ok(())
}

pub(crate) async fn page(
    pipeline: Pipeline,
    file: &Path,
    grade: Option<Grade>,
) -> Result<(), Box<dyn std::error::Error>> {
    let grade = pipeline.grade(grade)?;
    let mut tree = load_page(file).await?;

    let mut options = pipeline.service_options();
    options.precompute_enabled = false;
    let (handle, _task) = SimplifierService::spawn(pipeline.coordinator.clone(), options);

    let mut adapter = PageAdapter::new(
        handle,
        page_id_for(file),
        AdapterOptions::from(&pipeline.config.simplifier),
    );
    let nodes = adapter.discover(&tree);
    let replaced = adapter.simplify_page(&mut tree, grade).await;

    for node in nodes {
        let before = adapter.original(node).unwrap_or_default();
        let after = tree.text_content(node);
        let tag = tree.tag(node).unwrap_or("?");
        println!("[{tag} {node}]");
        println!("  - {before}");
        println!("  + {after}");
    }
    println!(
        "{replaced} block(s) replaced at grade {grade} (remote {:?})",
        adapter.availability()
    );
    Ok(())
}

pub(crate) async fn precache(
    pipeline: Pipeline,
    file: &Path,
    grade: Option<Grade>,
) -> Result<(), Box<dyn std::error::Error>> {
    let grade = pipeline.grade(grade)?;
    let tree = load_page(file).await?;
    let page_id = page_id_for(file);

    let items: Vec<BatchItem> = discover(&tree, pipeline.config.simplifier.min_text_length)
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            BatchItem::new(format!("precache_{index}"), tree.text_content(node).trim())
        })
        .collect();

    // Awaited directly rather than queued so the work completes before exit.
    let report = pipeline.coordinator.pre_cache(&items, grade, &page_id).await;
    if !report.available {
        println!("remote unavailable, nothing cached");
        return Ok(());
    }
    println!(
        "{} block(s) in {} chunk(s), {} newly cached at grade {}",
        items.len(),
        report.chunks,
        report.written,
        grade
    );
    Ok(())
}
