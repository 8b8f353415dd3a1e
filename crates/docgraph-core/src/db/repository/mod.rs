mod config;


pub use config::{ConfigError, RepositoryConfig};

use crate::{
    db::{
        depopulate::Depopulator,
        hydrate::{FetchRequest, Hydrator, Strategy},
        pipeline::{Pipeline, Synthesizer},
        populate::{Populator, ScalarMatch},
        store::DocumentStore,
    },
    error::{ErrorOrigin, InternalError},
    key::Key,
    model::validate_entity_model,
    overrides::Overrides,
    serialize::{from_document, to_document},
    traits::EntityKind,
};
use bson::{Bson, Document};
use std::marker::PhantomData;
use tracing::debug;

///
/// Repository
///
/// Binds one entity type to one collection of a document store and runs
/// reads through the configured hydration strategy. Owns the override
/// table; mutating it needs `&mut self`, so it can never change under an
/// in-flight call.
///

pub struct Repository<E: EntityKind, S: DocumentStore> {
    store: S,
    collection: String,
    overrides: Overrides,
    strategy: Strategy,
    populate: bool,
    backfill_references: bool,
    scalar_match: ScalarMatch,
    _marker: PhantomData<E>,
}

impl<E, S> Repository<E, S>
where
    E: EntityKind,
    S: DocumentStore,
{
    // ======================================================================
    // Construction & configuration
    // ======================================================================

    /// Repository over the entity's declared collection with default settings.
    pub fn new(store: S) -> Result<Self, InternalError> {
        Self::with_config(store, RepositoryConfig::default())
    }

    /// Validates the entity model before anything touches the store.
    pub fn with_config(store: S, config: RepositoryConfig) -> Result<Self, InternalError> {
        validate_entity_model(E::entity_model())?;

        let collection = config.collection.unwrap_or_else(|| E::COLLECTION.to_string());
        if collection.is_empty() {
            return Err(InternalError::repository_configuration(format!(
                "empty collection name for '{}'",
                E::entity_model().path()
            )));
        }

        debug!(
            entity = E::entity_model().path(),
            collection = %collection,
            strategy = %config.strategy,
            "repository.open"
        );

        Ok(Self {
            store,
            collection,
            overrides: config.overrides,
            strategy: config.strategy,
            populate: config.populate,
            backfill_references: config.backfill_references,
            scalar_match: config.scalar_match,
            _marker: PhantomData,
        })
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    #[must_use]
    pub fn with_backfill_references(mut self, backfill: bool) -> Self {
        self.backfill_references = backfill;
        self
    }

    #[must_use]
    pub fn with_scalar_match(mut self, scalar_match: ScalarMatch) -> Self {
        self.scalar_match = scalar_match;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    // ======================================================================
    // Override table
    // ======================================================================

    pub const fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub const fn overrides_mut(&mut self) -> &mut Overrides {
        &mut self.overrides
    }

    pub fn set_override(&mut self, path: impl Into<String>, enabled: bool) -> &mut Self {
        self.overrides.set(path, enabled);
        self
    }

    /// Enable the references at `paths` for subsequent calls.
    pub fn populate<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.overrides.enable(paths);
        self
    }

    /// Disable the references at `paths` for subsequent calls.
    pub fn depopulate<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.overrides.disable(paths);
        self
    }

    /// Drop every override; edges fall back to their declared defaults.
    pub fn reset_populates(&mut self) {
        self.overrides.reset();
    }

    // ======================================================================
    // Reads
    // ======================================================================

    /// Entities matching `filter`, hydrated by the configured strategy.
    pub fn find(&self, filter: &Document) -> Result<Vec<E>, InternalError> {
        let docs = if self.populate {
            self.strategy.hydrate(&self.store, &self.request(filter))?
        } else {
            self.store.find(&self.collection, filter)?
        };

        debug!(
            collection = %self.collection,
            strategy = %self.strategy,
            populate = self.populate,
            count = docs.len(),
            "repository.find"
        );

        docs.into_iter()
            .map(|doc| from_document(doc).map_err(InternalError::from))
            .collect()
    }

    pub fn first(&self, filter: &Document) -> Result<Option<E>, InternalError> {
        Ok(self.find(filter)?.into_iter().next())
    }

    pub fn all(&self) -> Result<Vec<E>, InternalError> {
        self.find(&Document::new())
    }

    pub fn find_by_id(&self, id: impl Into<Key>) -> Result<Option<E>, InternalError> {
        let primary_key = E::entity_model().primary_key;
        let id = id
            .into()
            .to_bson()
            .map_err(|err| err.into_internal(ErrorOrigin::Repository, primary_key))?;

        let mut filter = Document::new();
        filter.insert(primary_key, id);

        self.first(&filter)
    }

    /// Populate an entity that is already in hand.
    pub fn populate_entity(&self, entity: &mut E) -> Result<(), InternalError> {
        let mut doc = to_document(&*entity)?;

        self.populator().populate(E::model(), &mut doc)?;
        *entity = from_document(doc)?;

        Ok(())
    }

    /// Pipeline the current override table would synthesize.
    #[must_use]
    pub fn pipeline(&self) -> Pipeline {
        Synthesizer::new(&self.overrides)
            .scalar_match(self.scalar_match)
            .synthesize(E::model())
    }

    // ======================================================================
    // Writes
    // ======================================================================

    /// Insert `entity` and write the assigned identifier back into it.
    pub fn insert(&self, entity: &mut E) -> Result<Key, InternalError> {
        let primary_key = E::entity_model().primary_key;
        let doc = self.write_document(&*entity)?;
        let id = self.store.insert_one(&self.collection, doc)?;

        let key = Key::from_bson(&id)
            .map_err(|err| err.into_internal(ErrorOrigin::Repository, primary_key))?;

        let mut stored = to_document(&*entity)?;
        stored.insert(primary_key, id);
        *entity = from_document(stored)?;

        debug!(collection = %self.collection, key = %key, "repository.insert");

        Ok(key)
    }

    /// Insert each entity in turn; stops at the first failure.
    pub fn insert_many<'e, I>(&self, entities: I) -> Result<Vec<Key>, InternalError>
    where
        I: IntoIterator<Item = &'e mut E>,
        E: 'e,
    {
        let iter = entities.into_iter();
        let mut keys = Vec::with_capacity(iter.size_hint().0);

        for entity in iter {
            keys.push(self.insert(entity)?);
        }

        Ok(keys)
    }

    /// Replace the stored document with the same identifier.
    ///
    /// Returns `false` when no stored document matched.
    pub fn update(&self, entity: &E) -> Result<bool, InternalError> {
        let primary_key = E::entity_model().primary_key;
        let doc = self.write_document(entity)?;

        let id = match doc.get(primary_key) {
            Some(Bson::Null) | None => {
                return Err(InternalError::invariant(
                    ErrorOrigin::Repository,
                    format!(
                        "cannot update '{}' without a '{primary_key}' value",
                        E::entity_model().path()
                    ),
                ));
            }
            Some(id) => id.clone(),
        };

        let replaced = self.store.replace_one(&self.collection, &id, doc)?;
        debug!(collection = %self.collection, replaced, "repository.update");

        Ok(replaced)
    }

    /// Document that a write of `entity` would store.
    pub fn depopulated(&self, entity: &E) -> Result<Document, InternalError> {
        let doc = to_document(entity)?;

        Ok(self.depopulator().depopulate(E::model(), &doc))
    }

    // ======================================================================
    // Internals
    // ======================================================================

    fn write_document(&self, entity: &E) -> Result<Document, InternalError> {
        if self.populate {
            self.depopulated(entity)
        } else {
            Ok(to_document(entity)?)
        }
    }

    fn request<'a>(&'a self, filter: &'a Document) -> FetchRequest<'a> {
        FetchRequest {
            model: E::model(),
            collection: &self.collection,
            filter,
            overrides: &self.overrides,
            scalar_match: self.scalar_match,
        }
    }

    fn populator(&self) -> Populator<'_, S> {
        Populator::new(&self.store, &self.overrides).scalar_match(self.scalar_match)
    }

    const fn depopulator(&self) -> Depopulator {
        Depopulator::new().backfill(self.backfill_references)
    }
}
