//! Accessors for the ambient evaluation context.
//!
//! During model evaluation the surrounding platform establishes a
//! [`PredictionContext`] around each prediction. The context mechanism
//! itself lives outside this crate; a provider is registered here once
//! at startup and the `maybe_get_*` accessors consult it. With no
//! provider registered every accessor reports absence.

use crate::error::{TraceWireError, TraceWireResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Ambient context established around a model prediction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionContext {
    /// Request id of the evaluation run, if any.
    pub request_id: Option<String>,
    /// Whether the prediction runs as part of a model evaluation.
    pub is_evaluate: bool,
    /// Schemas of the model's dependencies, propagated into trace tags.
    pub dependencies_schemas: Option<HashMap<String, Value>>,
}

type ContextProvider = dyn Fn() -> Option<PredictionContext> + Send + Sync;

static PREDICTION_CONTEXT_PROVIDER: OnceLock<RwLock<Option<Arc<ContextProvider>>>> =
    OnceLock::new();

fn provider_registry() -> &'static RwLock<Option<Arc<ContextProvider>>> {
    PREDICTION_CONTEXT_PROVIDER.get_or_init(|| RwLock::new(None))
}

/// Register the provider consulted by [`maybe_get_request_id`] and
/// [`maybe_get_dependencies_schemas`]. Replaces any previous provider.
pub fn set_prediction_context_provider<F>(provider: F)
where
    F: Fn() -> Option<PredictionContext> + Send + Sync + 'static,
{
    if let Ok(mut registered) = provider_registry().write() {
        *registered = Some(Arc::new(provider));
    }
}

fn try_get_prediction_context() -> Option<PredictionContext> {
    let provider = provider_registry().read().ok()?.clone()?;
    (*provider)()
}

/// Get the request id if the current prediction is part of a model
/// evaluation.
///
/// Returns `Ok(None)` when no context is established, or when
/// `is_evaluate` is requested but the context is not evaluating. A
/// context that is evaluating without a request id is malformed and
/// yields [`TraceWireError::InvalidArgument`].
pub fn maybe_get_request_id(is_evaluate: bool) -> TraceWireResult<Option<String>> {
    request_id_from(try_get_prediction_context(), is_evaluate)
}

fn request_id_from(
    context: Option<PredictionContext>,
    is_evaluate: bool,
) -> TraceWireResult<Option<String>> {
    let context = match context {
        Some(context) => context,
        None => return Ok(None),
    };
    if is_evaluate && !context.is_evaluate {
        return Ok(None);
    }
    if context.request_id.is_none() && is_evaluate {
        return Err(TraceWireError::InvalidArgument(format!(
            "missing request_id for context {context:?}; \
             request_id can't be None when is_evaluate=true"
        )));
    }
    Ok(context.request_id)
}

/// Get the dependency schemas of the current prediction context, if
/// any.
pub fn maybe_get_dependencies_schemas() -> Option<HashMap<String, Value>> {
    try_get_prediction_context().and_then(|context| context.dependencies_schemas)
}
