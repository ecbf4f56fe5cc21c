use clap::Parser;
use itertools::Itertools;
use std::fs;
use std::process::ExitCode;
use tocsin::prelude::*;

/// Validate and canonicalize alert workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow YAML document
    workflow_path: String,
    /// Optional path to a provider catalog JSON file
    catalog_path: Option<String>,

    /// Print the canonical form of the document to stdout
    #[arg(short, long)]
    format: bool,

    /// Verify that re-parsing the canonical form reproduces it
    #[arg(long)]
    check_roundtrip: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });

    let catalog = match &cli.catalog_path {
        Some(path) => {
            let catalog_json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read catalog file '{}': {}", path, e))
            });
            ProviderCatalog::from_json(&catalog_json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to parse catalog JSON: {}", e))
            })
        }
        None => ProviderCatalog::default(),
    };

    let output = parse(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workflow: {}", e)));
    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }

    let store = WorkflowStore::new(output.workflow, catalog);

    if store.validation().is_clean() {
        println!("Validation passed: no findings.");
    } else {
        println!("Validation findings:");
        for subject in store.validation().violations().keys().sorted() {
            if let Some(reason) = store.validation().reason(subject) {
                println!("  {}: {}", subject, reason);
            }
        }
    }
    println!("Deployable: {}", store.can_deploy());

    let canonical = store
        .to_document()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workflow: {}", e)));

    if cli.check_roundtrip {
        let reparsed = parse(&canonical).unwrap_or_else(|e| {
            exit_with_error(&format!("Canonical form failed to re-parse: {}", e))
        });
        let canonical_again = serialize(&reparsed.workflow)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workflow: {}", e)));
        if canonical == canonical_again {
            println!("Round-trip check passed.");
        } else {
            exit_with_error("Round-trip check failed: canonical form is not stable.");
        }
    }

    if cli.format {
        println!("{}", canonical);
    }

    if store.can_deploy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
