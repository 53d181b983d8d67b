use crate::client::{ApiClient, ClientError};
use crate::entities::{Entity, EntityId};

/// What a page knows about one entity collection while serving a request.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<T> {
    pub loading: bool,
    pub updating: bool,
    pub entities: Vec<T>,
    pub entity: T,
    pub update_success: bool,
    pub error_message: Option<String>,
}

impl<T: Default> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            updating: false,
            entities: vec![],
            entity: T::default(),
            update_success: false,
            error_message: None,
        }
    }
}

impl<T: Default> EntityState<T> {
    fn pending_read(&mut self) {
        self.error_message = None;
        self.update_success = false;
        self.loading = true;
    }

    fn pending_write(&mut self) {
        self.error_message = None;
        self.update_success = false;
        self.updating = true;
    }

    fn list_fulfilled(&mut self, entities: Vec<T>) {
        self.loading = false;
        self.entities = entities;
    }

    fn entity_fulfilled(&mut self, entity: T) {
        self.loading = false;
        self.entity = entity;
    }

    fn write_fulfilled(&mut self, entity: T) {
        self.updating = false;
        self.loading = false;
        self.update_success = true;
        self.entity = entity;
    }

    fn delete_fulfilled(&mut self) {
        self.updating = false;
        self.update_success = true;
        self.entity = T::default();
    }

    fn rejected(&mut self, error: &ClientError) {
        self.loading = false;
        self.updating = false;
        self.update_success = false;
        self.error_message = Some(error.to_string());
    }

    /// The list refresh that follows a successful write. A failure is only
    /// recorded, the write itself stays successful.
    fn refresh_settled(&mut self, result: Result<Vec<T>, ClientError>) {
        match result {
            Ok(entities) => self.list_fulfilled(entities),
            Err(e) => {
                self.loading = false;
                self.error_message = Some(e.to_string());
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.loading && !self.updating
    }
}

/// One entity collection's state plus the operations that drive it.
pub struct EntitySlice<'a, T: Entity> {
    client: &'a ApiClient,
    state: EntityState<T>,
}

impl<'a, T: Entity> EntitySlice<'a, T> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            state: EntityState::default(),
        }
    }

    pub fn state(&self) -> &EntityState<T> {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = EntityState::default();
    }

    #[tracing::instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn get_entities(&mut self) -> &EntityState<T> {
        self.state.pending_read();
        match self.client.list::<T>().await {
            Ok(entities) => self.state.list_fulfilled(entities),
            Err(e) => self.state.rejected(&e),
        }

        &self.state
    }

    #[tracing::instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn get_entity(&mut self, id: EntityId) -> &EntityState<T> {
        self.state.pending_read();
        match self.client.get::<T>(id).await {
            Ok(entity) => self.state.entity_fulfilled(entity),
            Err(e) => self.state.rejected(&e),
        }

        &self.state
    }

    #[tracing::instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn create_entity(&mut self, entity: &T) -> &EntityState<T> {
        self.state.pending_write();
        let result = self.client.create(entity).await;
        self.write_settled(result).await
    }

    #[tracing::instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn update_entity(&mut self, entity: &T) -> &EntityState<T> {
        self.state.pending_write();
        let result = self.client.update(entity).await;
        self.write_settled(result).await
    }

    #[tracing::instrument(skip_all, fields(kind = %T::KIND))]
    pub async fn partial_update_entity(&mut self, entity: &T) -> &EntityState<T> {
        self.state.pending_write();
        let result = self.client.partial_update(entity).await;
        self.write_settled(result).await
    }

    #[tracing::instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn delete_entity(&mut self, id: EntityId) -> &EntityState<T> {
        self.state.pending_write();
        match self.client.delete::<T>(id).await {
            Ok(()) => {
                let refreshed = self.refresh().await;
                self.state.delete_fulfilled();
                self.state.refresh_settled(refreshed);
            }
            Err(e) => self.state.rejected(&e),
        }

        &self.state
    }

    async fn write_settled(&mut self, result: Result<T, ClientError>) -> &EntityState<T> {
        match result {
            Ok(entity) => {
                let refreshed = self.refresh().await;
                self.state.write_fulfilled(entity);
                self.state.refresh_settled(refreshed);
            }
            Err(e) => self.state.rejected(&e),
        }

        &self.state
    }

    async fn refresh(&mut self) -> Result<Vec<T>, ClientError> {
        self.state.pending_read();
        self.client.list::<T>().await
    }
}
