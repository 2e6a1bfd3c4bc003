//! Row-level operations on the bound entity.

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::IntoValueTuple;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Iterable,
    PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, TryIntoModel,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::base::Repository;
use crate::criteria::ConditionSet;
use crate::error::{RepositoryError, Result};

/// Primary key value of entity `E`: a scalar for single-column keys, a tuple
/// for composite keys.
pub type PrimaryKeyValue<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Direct operations on single rows of `E`, independent of any query chain.
#[async_trait]
pub trait EntityStore<E: EntityTrait>: Send + Sync {
    /// Look up one row by primary key.
    async fn find(&self, id: PrimaryKeyValue<E>) -> Result<Option<E::Model>>;

    /// Like [`EntityStore::find`], failing with `NotFound` when absent.
    async fn find_or_fail(&self, id: PrimaryKeyValue<E>) -> Result<E::Model>;

    async fn find_many(&self, ids: Vec<PrimaryKeyValue<E>>) -> Result<Vec<E::Model>>;

    async fn all(&self) -> Result<Vec<E::Model>>;

    /// Insert a row built from a JSON object of attributes.
    async fn create(&self, attributes: JsonValue) -> Result<E::Model>;

    /// Merge `attributes` into the row with key `id` and save it.
    async fn update(&self, id: PrimaryKeyValue<E>, attributes: JsonValue) -> Result<E::Model>;

    /// Delete one row by primary key, returning the affected-row count.
    async fn delete(&self, id: PrimaryKeyValue<E>) -> Result<u64>;

    async fn delete_many(&self, ids: Vec<PrimaryKeyValue<E>>) -> Result<u64>;

    /// First row matching `attributes`, or an unsaved active model built from them.
    async fn first_or_new(&self, attributes: JsonValue) -> Result<E::ActiveModel>;

    /// First row matching `attributes`, inserting one when none exists.
    async fn first_or_create(&self, attributes: JsonValue) -> Result<E::Model>;

    /// Update the first row matching `attributes` with `values`, or insert
    /// the union of both.
    async fn update_or_create(&self, attributes: JsonValue, values: JsonValue) -> Result<E::Model>;
}

#[async_trait]
impl<'c, E, C> EntityStore<E> for Repository<'c, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + TryIntoModel<E::Model> + Send + Sync,
{
    async fn find(&self, id: PrimaryKeyValue<E>) -> Result<Option<E::Model>> {
        let select = E::find_by_id(id);
        self.record(&select);
        Ok(select.one(self.connection()).await?)
    }

    async fn find_or_fail(&self, id: PrimaryKeyValue<E>) -> Result<E::Model> {
        let missing = RepositoryError::not_found(self.entity_name(), &id);
        self.find(id).await?.ok_or(missing)
    }

    async fn find_many(&self, ids: Vec<PrimaryKeyValue<E>>) -> Result<Vec<E::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let select = E::find().filter(any_primary_key::<E>(ids));
        self.record(&select);
        Ok(select.all(self.connection()).await?)
    }

    async fn all(&self) -> Result<Vec<E::Model>> {
        let select = E::find();
        self.record(&select);
        Ok(select.all(self.connection()).await?)
    }

    async fn create(&self, attributes: JsonValue) -> Result<E::Model> {
        require_object(&attributes)?;
        let active =
            <E::ActiveModel as ActiveModelTrait>::from_json(attributes).map_err(RepositoryError::persistence)?;
        self.record(&E::insert(active.clone()));

        let model = active.insert(self.connection()).await.map_err(RepositoryError::persistence)?;
        debug!("Created {} row {:?}", self.entity_name(), model);
        Ok(model)
    }

    async fn update(&self, id: PrimaryKeyValue<E>, attributes: JsonValue) -> Result<E::Model> {
        require_object(&attributes)?;
        let model = self.find_or_fail(id).await?;
        self.save_merged(model, attributes).await
    }

    async fn delete(&self, id: PrimaryKeyValue<E>) -> Result<u64> {
        let delete = E::delete_many().filter(primary_key_condition::<E>(id));
        self.record(&delete);
        Ok(delete.exec(self.connection()).await?.rows_affected)
    }

    async fn delete_many(&self, ids: Vec<PrimaryKeyValue<E>>) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let delete = E::delete_many().filter(any_primary_key::<E>(ids));
        self.record(&delete);
        Ok(delete.exec(self.connection()).await?.rows_affected)
    }

    async fn first_or_new(&self, attributes: JsonValue) -> Result<E::ActiveModel> {
        require_object(&attributes)?;
        match self.wheres(ConditionSet::from(&attributes)).first_model().await? {
            Some(model) => Ok(model.into_active_model()),
            None => <E::ActiveModel as ActiveModelTrait>::from_json(attributes).map_err(RepositoryError::persistence),
        }
    }

    async fn first_or_create(&self, attributes: JsonValue) -> Result<E::Model> {
        require_object(&attributes)?;
        match self.wheres(ConditionSet::from(&attributes)).first_model().await? {
            Some(model) => Ok(model),
            None => self.create(attributes).await,
        }
    }

    async fn update_or_create(&self, attributes: JsonValue, values: JsonValue) -> Result<E::Model> {
        require_object(&attributes)?;
        require_object(&values)?;
        match self.wheres(ConditionSet::from(&attributes)).first_model().await? {
            Some(model) => self.save_merged(model, values).await,
            None => self.create(merge_attributes(attributes, values)).await,
        }
    }
}

impl<'c, E, C> Repository<'c, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + TryIntoModel<E::Model> + Send + Sync,
{
    /// Overlay `attributes` on a loaded row and write every column back.
    ///
    /// The primary key of `model` is kept whatever `attributes` says.
    async fn save_merged(&self, model: E::Model, attributes: JsonValue) -> Result<E::Model> {
        let merged = merge_attributes(serde_json::to_value(&model)?, attributes);
        let mut active = model.into_active_model();
        active.set_from_json(merged).map_err(RepositoryError::persistence)?;
        self.record(&E::update(active.clone()));

        let model = active.update(self.connection()).await.map_err(RepositoryError::persistence)?;
        debug!("Updated {} row {:?}", self.entity_name(), model);
        Ok(model)
    }
}

fn primary_key_condition<E: EntityTrait>(id: PrimaryKeyValue<E>) -> sea_orm::Condition {
    E::PrimaryKey::iter()
        .zip(id.into_value_tuple())
        .fold(sea_orm::Condition::all(), |condition, (key, value)| {
            condition.add(key.into_column().eq(value))
        })
}

fn any_primary_key<E: EntityTrait>(ids: Vec<PrimaryKeyValue<E>>) -> sea_orm::Condition {
    ids.into_iter()
        .fold(sea_orm::Condition::any(), |condition, id| condition.add(primary_key_condition::<E>(id)))
}

fn require_object(attributes: &JsonValue) -> Result<()> {
    if attributes.is_object() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(format!(
            "attributes must be a JSON object, got {}",
            attributes
        )))
    }
}

/// Copy every key of `overlay` onto `base`. Non-object inputs leave `base` as is.
fn merge_attributes(mut base: JsonValue, overlay: JsonValue) -> JsonValue {
    if let (Some(target), JsonValue::Object(source)) = (base.as_object_mut(), overlay) {
        target.extend(source);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_attributes_overrides_keys() {
        let merged = merge_attributes(json!({"id": 1, "name": "bob", "age": 28}), json!({"age": 29}));
        assert_eq!(merged, json!({"id": 1, "name": "bob", "age": 29}));
    }

    #[test]
    fn test_require_object() {
        assert!(require_object(&json!({"name": "x"})).is_ok());
        assert!(matches!(
            require_object(&json!(["name", "x"])),
            Err(RepositoryError::Validation(_))
        ));
    }
}
