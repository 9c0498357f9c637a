//! In-memory property store
//!
//! Properties registered here live in a process-local map and are never
//! written to PostgreSQL. Ids are `count + 1`, computed and inserted under
//! the same lock; seeds are rejected unless their ids run `1..=N`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lb_core::config::{CityMatch, ConfigError};
use lb_core::Id;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::properties::{CreatePropertyDto, PropertyRow};
use crate::property_search::PropertySearch;
use crate::repository::{PropertyStore, RepositoryResult};

/// Seed file layout: an object keyed by id, or a plain array
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Keyed(BTreeMap<String, PropertyRow>),
    List(Vec<PropertyRow>),
}

#[derive(Clone, Default)]
pub struct InMemoryPropertyStore {
    properties: Arc<Mutex<BTreeMap<Id, PropertyRow>>>,
    city_match: CityMatch,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city_match(mut self, city_match: CityMatch) -> Self {
        self.city_match = city_match;
        self
    }

    /// Ids must run exactly `1..=N` so that `count + 1` stays unused
    pub fn with_properties(
        properties: impl IntoIterator<Item = PropertyRow>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for property in properties {
            let id = property.id;
            if map.insert(id, property).is_some() {
                return Err(ConfigError::FileError(format!("duplicate property id {}", id)));
            }
        }
        if let Some((expected, id)) = (1..).zip(map.keys()).find(|(n, id)| n != *id) {
            return Err(ConfigError::FileError(format!(
                "property ids must run from 1 without gaps, found {} where {} was expected",
                id, expected
            )));
        }

        Ok(Self {
            properties: Arc::new(Mutex::new(map)),
            city_match: CityMatch::default(),
        })
    }

    /// Parse seed JSON. Entries without an id take it from their key in a
    /// keyed object, or from their 1-based position in an array.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let seed: SeedFile =
            serde_json::from_str(json).map_err(|e| ConfigError::FileError(e.to_string()))?;

        let rows = match seed {
            SeedFile::List(rows) => (1..)
                .zip(rows)
                .map(|(position, mut row)| {
                    if row.id == 0 {
                        row.id = position;
                    }
                    row
                })
                .collect(),
            SeedFile::Keyed(map) => map
                .into_iter()
                .map(|(key, mut row)| {
                    if row.id == 0 {
                        row.id = key.parse().map_err(|_| {
                            ConfigError::FileError(format!("property key '{}' is not an id", key))
                        })?;
                    }
                    Ok(row)
                })
                .collect::<Result<Vec<_>, ConfigError>>()?,
        };

        Self::with_properties(rows)
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!("Failed to read property seed {}: {}", path.display(), e);
            ConfigError::FileError(format!("{}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} seed properties from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.properties.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.lock().is_empty()
    }

    pub fn get(&self, id: Id) -> Option<PropertyRow> {
        self.properties.lock().get(&id).cloned()
    }

    fn matches(&self, row: &PropertyRow, filters: &PropertySearch) -> bool {
        if let Some(city) = filters.city_filter() {
            let hit = match self.city_match {
                CityMatch::CaseSensitive => row.city.contains(city),
                CityMatch::CaseInsensitive => {
                    row.city.to_lowercase().contains(&city.to_lowercase())
                }
            };
            if !hit {
                return false;
            }
        }
        if filters.owner_id.is_some_and(|owner| row.owner_id != owner) {
            return false;
        }
        if filters
            .minimum_price_per_night
            .is_some_and(|min| row.cost_per_night < min)
        {
            return false;
        }
        if filters
            .maximum_price_per_night
            .is_some_and(|max| row.cost_per_night > max)
        {
            return false;
        }
        if let Some(min) = filters.minimum_rating {
            // No reviews are held in memory, so only seeded ratings can pass
            return row.average_rating.is_some_and(|avg| avg >= min);
        }
        true
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn search(
        &self,
        filters: &PropertySearch,
        limit: i64,
    ) -> RepositoryResult<Vec<PropertyRow>> {
        let take = usize::try_from(limit).unwrap_or(0);
        let properties = self.properties.lock();
        Ok(properties
            .values()
            .filter(|row| self.matches(row, filters))
            .take(take)
            .cloned()
            .collect())
    }

    async fn create(&self, dto: CreatePropertyDto) -> RepositoryResult<PropertyRow> {
        let mut properties = self.properties.lock();
        let id = properties.len() as Id + 1;
        let row = dto.into_row(id);
        properties.insert(id, row.clone());

        tracing::debug!(id, "Stored property in memory");

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: Id, city: &str, cost: i32, rating: Option<f64>) -> PropertyRow {
        PropertyRow {
            id,
            owner_id: id % 2 + 1,
            title: format!("Property {}", id),
            city: city.to_string(),
            cost_per_night: cost,
            active: true,
            average_rating: rating,
            ..Default::default()
        }
    }

    fn seeded() -> InMemoryPropertyStore {
        InMemoryPropertyStore::with_properties(vec![
            property(1, "East Boston", 10000, Some(4.5)),
            property(2, "BOSTON", 20000, Some(2.0)),
            property(3, "Vancouver", 30000, None),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_count_plus_one() {
        let store = seeded();
        let row = store
            .create(CreatePropertyDto {
                title: "Habit mix".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(row.id, 4);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(4).map(|p| p.title), Some("Habit mix".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = InMemoryPropertyStore::new();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(CreatePropertyDto::default()).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<Id>>());
        assert_eq!(store.len(), 32);
    }

    #[tokio::test]
    async fn test_search_city_case_sensitive_substring() {
        let store = seeded();
        let rows = store
            .search(&PropertySearch::new().city("Boston"), 10)
            .await
            .unwrap();

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_search_city_case_insensitive() {
        let store = seeded().with_city_match(CityMatch::CaseInsensitive);
        let rows = store
            .search(&PropertySearch::new().city("boston"), 10)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_search_price_bounds_inclusive_and_rating() {
        let store = seeded();

        let rows = store
            .search(
                &PropertySearch::new().minimum_price(10000).maximum_price(20000),
                10,
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let rows = store
            .search(&PropertySearch::new().minimum_rating(2.0), 10)
            .await
            .unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let rows = seeded().search(&PropertySearch::new(), 2).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_from_json_keyed_object() {
        let store = InMemoryPropertyStore::from_json(
            r#"{
                "1": {"owner_id": 1, "title": "Speed lamp", "city": "Sotboske"},
                "2": {"owner_id": 1, "title": "Blank corner", "city": "Bohbatev"}
            }"#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).map(|p| p.city), Some("Bohbatev".to_string()));
    }

    #[test]
    fn test_from_json_list_and_bad_input() {
        let store = InMemoryPropertyStore::from_json(
            r#"[{"id": 1, "title": "Port out"}, {"id": 2, "title": "Habit mix"}]"#,
        )
        .unwrap();
        assert_eq!(store.get(2).map(|p| p.title), Some("Habit mix".to_string()));

        assert!(InMemoryPropertyStore::from_json(r#"{"abc": {"title": "x"}}"#).is_err());
        assert!(InMemoryPropertyStore::from_json("not json").is_err());
    }

    #[test]
    fn test_list_entries_without_id_are_numbered_in_order() {
        let store = InMemoryPropertyStore::from_json(r#"[{"title": "a"}, {"title": "b"}]"#).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).map(|p| p.title), Some("a".to_string()));
        assert_eq!(store.get(2).map(|p| p.title), Some("b".to_string()));
    }

    #[test]
    fn test_seed_ids_must_be_contiguous() {
        let err = InMemoryPropertyStore::from_json(
            r#"[{"id": 1}, {"id": 3, "title": "seeded three"}]"#,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::FileError(_)));

        assert!(InMemoryPropertyStore::from_json(r#"{"2": {"title": "x"}}"#).is_err());
        assert!(InMemoryPropertyStore::from_json(r#"[{"id": 1}, {"id": 1}]"#).is_err());
        let unnumbered = vec![property(0, "Nowhere", 1, None)];
        assert!(InMemoryPropertyStore::with_properties(unnumbered).is_err());
    }

    #[tokio::test]
    async fn test_create_after_seed_keeps_seeded_rows() {
        let store = InMemoryPropertyStore::from_json(
            r#"[{"title": "seeded one"}, {"title": "seeded two"}]"#,
        )
        .unwrap();

        let first = store.create(CreatePropertyDto::default()).await.unwrap();
        let second = store.create(CreatePropertyDto::default()).await.unwrap();

        assert_eq!((first.id, second.id), (3, 4));
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(2).map(|p| p.title), Some("seeded two".to_string()));
    }
}
