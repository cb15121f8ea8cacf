//! Emission order for the built models.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};
use wsdlstub_wsdl::SchemaIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Every model after the models it depends on.
    pub order: Vec<String>,
    /// Models that could never become ready, in index order.
    pub dropped: Vec<String>,
}

/// Topological sort of the index. A model is ready once all of its
/// dependencies have been placed; ready models are placed in index order.
/// Models depending on a missing name or caught in a cycle never become
/// ready and are reported as dropped.
pub fn resolve(index: &SchemaIndex) -> Resolution {
    let mut pending: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut ready = VecDeque::new();

    for model in index.models() {
        pending.insert(&model.name, model.dependencies.len());

        for dependency in &model.dependencies {
            dependents.entry(dependency).or_default().push(&model.name);
        }

        if model.dependencies.is_empty() {
            ready.push_back(model.name.as_str());
        }
    }

    let mut resolution = Resolution::default();

    while let Some(name) = ready.pop_front() {
        resolution.order.push(name.to_owned());

        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*dependent);
                }
            }
        }
    }

    if resolution.order.len() != index.len() {
        resolution.dropped = index
            .names()
            .filter(|name| pending.get(name).map_or(false, |count| *count > 0))
            .map(ToOwned::to_owned)
            .collect();

        for name in &resolution.dropped {
            warn!("{}: unresolvable or cyclic dependencies, model omitted", name);
        }
    }

    debug!(
        "resolved {} models, dropped {}",
        resolution.order.len(),
        resolution.dropped.len()
    );
    resolution
}
