use crate::{
    db::{
        pipeline::Synthesizer,
        populate::{Populator, ScalarMatch},
        store::DocumentStore,
    },
    error::InternalError,
    model::TypeModel,
    overrides::Overrides,
};
use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

///
/// FetchRequest
/// Everything a hydrator needs for one fetch.
///

#[derive(Clone, Copy, Debug)]
pub struct FetchRequest<'a> {
    pub model: &'static TypeModel,
    pub collection: &'a str,
    pub filter: &'a Document,
    pub overrides: &'a Overrides,
    pub scalar_match: ScalarMatch,
}

///
/// Hydrator
///
/// Fetch documents with their enabled reference edges resolved. All
/// implementations must produce the same documents for the same store.
///

pub trait Hydrator {
    fn hydrate<S>(&self, store: &S, request: &FetchRequest<'_>) -> Result<Vec<Document>, InternalError>
    where
        S: DocumentStore + ?Sized;
}

///
/// PopulateHydrator
/// Plain find followed by client-side populate.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PopulateHydrator;

impl Hydrator for PopulateHydrator {
    fn hydrate<S>(&self, store: &S, request: &FetchRequest<'_>) -> Result<Vec<Document>, InternalError>
    where
        S: DocumentStore + ?Sized,
    {
        let docs = store.find(request.collection, request.filter)?;

        populate_all(store, request, docs, false)
    }
}

///
/// PipelineHydrator
///
/// Server-side joins through a synthesized pipeline, then a populate pass
/// for the edges the pipeline does not reach. The pass also checks every
/// joined edge against its local field, so identifier errors and text
/// identifiers behave as they do under the populate strategy.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineHydrator;

impl Hydrator for PipelineHydrator {
    fn hydrate<S>(&self, store: &S, request: &FetchRequest<'_>) -> Result<Vec<Document>, InternalError>
    where
        S: DocumentStore + ?Sized,
    {
        let pipeline = Synthesizer::new(request.overrides)
            .scalar_match(request.scalar_match)
            .synthesize(request.model);

        let docs = if pipeline.is_empty() {
            store.find(request.collection, request.filter)?
        } else {
            debug!(
                collection = request.collection,
                stages = pipeline.len(),
                "hydrate.pipeline.aggregate"
            );
            store.aggregate(request.collection, request.filter, pipeline.stages())?
        };

        populate_all(store, request, docs, !pipeline.is_empty())
    }
}

fn populate_all<S>(
    store: &S,
    request: &FetchRequest<'_>,
    mut docs: Vec<Document>,
    verify_joined: bool,
) -> Result<Vec<Document>, InternalError>
where
    S: DocumentStore + ?Sized,
{
    let populator = Populator::new(store, request.overrides)
        .scalar_match(request.scalar_match)
        .verify_joined(verify_joined);

    for doc in &mut docs {
        populator.populate(request.model, doc)?;
    }

    Ok(docs)
}

///
/// Strategy
/// Configuration-level choice of hydrator.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Populate,
    Pipeline,
}

impl Hydrator for Strategy {
    fn hydrate<S>(&self, store: &S, request: &FetchRequest<'_>) -> Result<Vec<Document>, InternalError>
    where
        S: DocumentStore + ?Sized,
    {
        match self {
            Self::Populate => PopulateHydrator.hydrate(store, request),
            Self::Pipeline => PipelineHydrator.hydrate(store, request),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Populate => "populate",
            Self::Pipeline => "pipeline",
        };
        write!(f, "{label}")
    }
}
