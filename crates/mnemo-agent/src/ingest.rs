//! Ingestion coordinator.
//!
//! Turns validated paths into exactly one named, persisted, registered
//! memory — or a clear negative result. The batch is partial-failure
//! tolerant: one unreadable file never aborts the rest.

use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info, warn};

use mnemo_store::{artifact, format_size, MemoryHandle, MemoryRegistry, StoreProvider};

use crate::paths::{
    extract_directory_from_query, extract_document_paths, generate_memory_name,
    scan_directory_for_documents, validate_file_paths, ValidationReport,
};
use crate::status::Status;

/// Result of one ingestion call.
#[derive(Debug)]
pub struct IngestOutcome {
    pub status: Status,
    pub response: String,
    /// Descriptor of the produced memory, present only on success.
    pub artifact: Option<MemoryHandle>,
    pub error: Option<String>,
}

impl IngestOutcome {
    fn failure(status: Status, response: impl Into<String>, error: Option<String>) -> Self {
        Self {
            status,
            response: response.into(),
            artifact: None,
            error,
        }
    }
}

/// Coordinates document ingestion against the store collaborator.
pub struct IngestionCoordinator<'a> {
    provider: &'a dyn StoreProvider,
    registry: &'a MemoryRegistry,
    storage_dir: &'a Path,
}

impl<'a> IngestionCoordinator<'a> {
    pub fn new(
        provider: &'a dyn StoreProvider,
        registry: &'a MemoryRegistry,
        storage_dir: &'a Path,
    ) -> Self {
        Self {
            provider,
            registry,
            storage_dir,
        }
    }

    /// Run ingestion for an utterance: discover paths, validate, encode,
    /// persist, and register.
    pub fn ingest_query(&self, query: &str) -> IngestOutcome {
        let mut candidates = extract_document_paths(query);

        // No explicit file references; fall back to a directory scan.
        if candidates.is_empty() {
            if let Some(dir) = extract_directory_from_query(query) {
                candidates = scan_directory_for_documents(Path::new(&dir))
                    .into_iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect();
            }
        }

        if candidates.is_empty() {
            return IngestOutcome::failure(Status::NoDocuments, no_documents_response(), None);
        }

        let report = validate_file_paths(&candidates);
        if report.valid.is_empty() {
            return IngestOutcome::failure(
                Status::InvalidDocuments,
                invalid_documents_response(&report),
                None,
            );
        }

        self.ingest_paths(&report)
    }

    fn ingest_paths(&self, report: &ValidationReport) -> IngestOutcome {
        let memory_name = generate_memory_name(&report.valid);
        let mut encoder = self.provider.encoder();
        let mut processed = 0usize;
        let mut failed = 0usize;

        for path in &report.valid {
            let result = match document_kind(path) {
                DocumentKind::Structured => encoder.add_document(path),
                DocumentKind::Text => read_text(path).and_then(|content| {
                    let mut metadata = HashMap::new();
                    metadata.insert("source".to_string(), file_name(path));
                    encoder.add_text(&content, metadata)
                }),
            };

            match result {
                Ok(()) => {
                    info!("Processed document {}", path.display());
                    processed += 1;
                }
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                    failed += 1;
                }
            }
        }

        if encoder.chunk_count() == 0 {
            return IngestOutcome::failure(
                Status::IngestionError,
                "No content could be extracted from the provided documents.",
                Some(format!(
                    "no extractable content in {} file(s)",
                    report.valid.len()
                )),
            );
        }

        let (content_path, index_path) = artifact::artifact_paths(self.storage_dir, &memory_name);
        if let Err(e) = std::fs::create_dir_all(self.storage_dir) {
            return IngestOutcome::failure(
                Status::IngestionError,
                "There was an error writing the memory to disk.",
                Some(e.to_string()),
            );
        }

        let stats = match encoder.build(&content_path, &index_path) {
            Ok(stats) => stats,
            Err(e) => {
                error!("Failed to build memory {}: {}", memory_name, e);
                return IngestOutcome::failure(
                    Status::IngestionError,
                    "There was an error writing the memory to disk.",
                    Some(e.to_string()),
                );
            }
        };

        let handle = MemoryHandle {
            name: memory_name.clone(),
            content_path: content_path.clone(),
            index_path: index_path.clone(),
        };

        // Load and register the new memory so it is searchable immediately.
        match self.provider.open(&content_path, &index_path) {
            Ok(retriever) => {
                if let Err(e) = self.registry.register(handle.clone(), retriever) {
                    return IngestOutcome::failure(
                        Status::IngestionError,
                        "The memory was written but could not be registered.",
                        Some(e.to_string()),
                    );
                }
            }
            Err(e) => {
                error!("Failed to load new memory {}: {}", memory_name, e);
                return IngestOutcome::failure(
                    Status::IngestionError,
                    "The memory was written but could not be loaded for search.",
                    Some(e.to_string()),
                );
            }
        }

        info!(
            "Created memory {} ({} chunks, {} processed, {} failed)",
            memory_name, stats.chunks, processed, failed
        );

        let mut response = ingestion_summary(
            &memory_name,
            processed,
            failed,
            stats.chunks,
            stats.content_bytes,
        );
        if !report.invalid.is_empty() {
            response.push_str("\n\nSkipped files:\n");
            for (path, reason) in &report.invalid {
                response.push_str(&format!("- {} ({})\n", path, reason));
            }
        }

        IngestOutcome {
            status: Status::IngestionComplete,
            response,
            artifact: Some(handle),
            error: None,
        }
    }
}

enum DocumentKind {
    /// Handed to the store engine for its own extraction (pdf/epub).
    Structured,
    /// Read here and added as raw text with source metadata.
    Text,
}

fn document_kind(path: &Path) -> DocumentKind {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if ext == "pdf" || ext == "epub" {
        DocumentKind::Structured
    } else {
        DocumentKind::Text
    }
}

fn read_text(path: &Path) -> mnemo_core::error::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn no_documents_response() -> String {
    let mut text = String::from("No valid document paths found in your request.\n\n");
    text.push_str("To ingest documents, try:\n");
    text.push_str("- Ingest \"document.pdf\" \"notes.txt\"\n");
    text.push_str("- Process files in \"documents/\"\n");
    text.push_str("- Add \"research_paper.pdf\" to memory\n\n");
    text.push_str(&format!(
        "Supported formats: {}",
        ValidationReport::supported_extensions()
    ));
    text
}

fn invalid_documents_response(report: &ValidationReport) -> String {
    let mut text = String::from("No valid documents found.\n\nInvalid paths:\n");
    for (path, reason) in &report.invalid {
        text.push_str(&format!("- {} ({})\n", path, reason));
    }
    text.push_str(&format!(
        "\nSupported formats: {}",
        ValidationReport::supported_extensions()
    ));
    text
}

fn ingestion_summary(
    name: &str,
    processed: usize,
    failed: usize,
    chunks: usize,
    content_bytes: u64,
) -> String {
    if failed > 0 {
        warn!("{} file(s) failed during ingestion of {}", failed, name);
    }
    let mut text = format!("Created memory '{}'.\n\n", name);
    text.push_str(&format!("- Processed files: {}\n", processed));
    text.push_str(&format!("- Failed files: {}\n", failed));
    text.push_str(&format!("- Total text chunks: {}\n", chunks));
    text.push_str(&format!("- Memory size: {}\n\n", format_size(content_bytes)));
    text.push_str("You can now search this memory by asking questions about its content.");
    text
}

// =============================================================================
// Tests
// =============================================================================
