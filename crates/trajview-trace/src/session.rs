//! The currently loaded trace, held as explicit owned state.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use trajview_core::Span;
use uuid::Uuid;

use crate::error::TraceLoadError;
use crate::model::TraceModel;

/// A successfully loaded trace.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTrace {
    /// Fresh for every load, so clients can tell a reload from the same file.
    pub load_id: Uuid,
    /// File name or other label the trace came from.
    pub source: String,
    #[serde(skip)]
    pub model: Arc<TraceModel>,
}

/// At most one loaded trace plus the span selected in it.
///
/// A load either replaces the trace wholesale or, on failure, leaves the
/// previous one in place.
#[derive(Debug, Default)]
pub struct TraceSession {
    current: Option<LoadedTrace>,
    selected: Option<String>,
}

impl TraceSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and makes it the current trace.
    pub fn load(&mut self, source: impl Into<String>, text: &str) -> Result<&LoadedTrace, TraceLoadError> {
        let source = source.into();
        let model = TraceModel::from_text(text).inspect_err(|e| {
            tracing::warn!(source = %source, "Trace load failed: {}", e);
        })?;
        Ok(self.replace(source, model))
    }

    /// Reads a trajectory file and makes it the current trace.
    pub fn load_path(&mut self, path: &Path) -> Result<&LoadedTrace, TraceLoadError> {
        let model = TraceModel::from_path(path)?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.replace(source, model))
    }

    /// Installs an already-built model, dropping the previous trace and selection.
    pub fn replace(&mut self, source: String, model: TraceModel) -> &LoadedTrace {
        let loaded = LoadedTrace {
            load_id: Uuid::new_v4(),
            source,
            model: Arc::new(model),
        };
        tracing::info!(
            load_id = %loaded.load_id,
            source = %loaded.source,
            spans = loaded.model.len(),
            "Loaded trace"
        );
        self.selected = None;
        self.current.insert(loaded)
    }

    pub fn current(&self) -> Option<&LoadedTrace> {
        self.current.as_ref()
    }

    pub fn model(&self) -> Option<Arc<TraceModel>> {
        self.current.as_ref().map(|loaded| Arc::clone(&loaded.model))
    }

    /// Selects a span of the current trace. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, span_id: &str) -> Option<Arc<Span>> {
        let span = self.current.as_ref()?.model.span(span_id).cloned()?;
        self.selected = Some(span.id.clone());
        Some(span)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
