//! Data access facade
//!
//! Bundles the injected stores behind the six booking operations.

use std::sync::Arc;

use lb_core::config::{AppConfig, PropertyStorage};
use lb_core::{Id, LbResult};

use crate::pool::Database;
use crate::properties::{CreatePropertyDto, PropertyRepository, PropertyRow};
use crate::property_search::PropertySearch;
use crate::property_store::InMemoryPropertyStore;
use crate::repository::{
    Lookup, PropertyStore, RepositoryError, RepositoryResult, ReservationStore, UserStore,
};
use crate::reservations::{GuestReservationRow, ReservationRepository};
use crate::users::{CreateUserDto, UserRepository, UserRow};

#[derive(Clone)]
pub struct DataAccess {
    users: Arc<dyn UserStore>,
    reservations: Arc<dyn ReservationStore>,
    properties: Arc<dyn PropertyStore>,
    default_limit: i64,
}

impl DataAccess {
    pub fn new(
        users: Arc<dyn UserStore>,
        reservations: Arc<dyn ReservationStore>,
        properties: Arc<dyn PropertyStore>,
    ) -> Self {
        Self {
            users,
            reservations,
            properties,
            default_limit: lb_core::DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Connect to PostgreSQL and wire the stores selected by `config`
    pub async fn connect(config: &AppConfig) -> LbResult<Self> {
        let db = Database::connect(&config.database)
            .await
            .map_err(RepositoryError::from)?;
        Self::from_database(&db, config)
    }

    pub fn from_database(db: &Database, config: &AppConfig) -> LbResult<Self> {
        let pool = db.pool().clone();
        let city_match = config.search.city_match;

        let properties: Arc<dyn PropertyStore> = match config.properties.backend {
            PropertyStorage::Database => {
                Arc::new(PropertyRepository::new(pool.clone()).with_city_match(city_match))
            }
            PropertyStorage::Memory => {
                let store = match &config.properties.seed_path {
                    Some(path) => InMemoryPropertyStore::from_seed_file(path)?,
                    None => InMemoryPropertyStore::new(),
                };
                tracing::info!("Registering properties in memory only");
                Arc::new(store.with_city_match(city_match))
            }
        };

        Ok(Self::new(
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(ReservationRepository::new(pool)),
            properties,
        )
        .with_default_limit(config.search.default_limit))
    }

    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    fn limit(&self, limit: Option<i64>) -> RepositoryResult<i64> {
        match limit {
            Some(limit) if limit < 1 => Err(RepositoryError::Validation(format!(
                "limit must be at least 1, got {}",
                limit
            ))),
            Some(limit) => Ok(limit),
            None => Ok(self.default_limit),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Lookup<UserRow> {
        self.users.find_by_email(email).await.into()
    }

    pub async fn get_user_by_id(&self, id: Id) -> Lookup<UserRow> {
        self.users.find_by_id(id).await.into()
    }

    pub async fn add_user(&self, user: CreateUserDto) -> RepositoryResult<UserRow> {
        self.users.create(user).await
    }

    pub async fn get_reservations_for_guest(
        &self,
        guest_id: Id,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<GuestReservationRow>> {
        let limit = self.limit(limit)?;
        self.reservations.list_for_guest(guest_id, limit).await
    }

    pub async fn search_properties(
        &self,
        filters: &PropertySearch,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<PropertyRow>> {
        let limit = self.limit(limit)?;
        self.properties.search(filters, limit).await
    }

    pub async fn add_property(&self, property: CreatePropertyDto) -> RepositoryResult<PropertyRow> {
        self.properties.create(property).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockPropertyStore, MockReservationStore, MockUserStore};
    use mockall::predicate::eq;

    fn access(
        users: MockUserStore,
        reservations: MockReservationStore,
        properties: MockPropertyStore,
    ) -> DataAccess {
        DataAccess::new(Arc::new(users), Arc::new(reservations), Arc::new(properties))
    }

    fn user() -> UserRow {
        UserRow {
            id: 1,
            name: "Devin Sanders".into(),
            email: "tristanjacobs@gmail.com".into(),
            password: "$2a$10$FB/BOAVhpuLvpOREQVmvmezD4ED/.JBIDRh70tGevYzYzQgFId2u.".into(),
        }
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let mut users = MockUserStore::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let db = access(users, MockReservationStore::new(), MockPropertyStore::new());
        assert!(db.get_user_by_email("nope@example.com").await.is_not_found());
    }

    #[tokio::test]
    async fn test_store_failure_is_distinguished() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_id()
            .with(eq(9))
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));

        let db = access(users, MockReservationStore::new(), MockPropertyStore::new());
        assert!(matches!(db.get_user_by_id(9).await, Lookup::StoreError(_)));
    }

    #[tokio::test]
    async fn test_found_user() {
        let mut users = MockUserStore::new();
        users.expect_find_by_id().returning(|_| Ok(Some(user())));

        let db = access(users, MockReservationStore::new(), MockPropertyStore::new());
        assert_eq!(db.get_user_by_id(1).await.found(), Some(user()));
    }

    #[tokio::test]
    async fn test_default_limits_apply() {
        let mut reservations = MockReservationStore::new();
        reservations
            .expect_list_for_guest()
            .with(eq(1), eq(10))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let mut properties = MockPropertyStore::new();
        properties
            .expect_search()
            .withf(|filters, limit| filters.is_empty() && *limit == 25)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let db = access(MockUserStore::new(), reservations, properties);
        assert!(db.get_reservations_for_guest(1, None).await.unwrap().is_empty());

        let db = db.with_default_limit(25);
        assert!(db
            .search_properties(&PropertySearch::new(), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_explicit_limit_overrides_default() {
        let mut properties = MockPropertyStore::new();
        properties
            .expect_search()
            .withf(|_, limit| *limit == 5)
            .returning(|_, _| Ok(vec![]));

        let db = access(MockUserStore::new(), MockReservationStore::new(), properties);
        db.search_properties(&PropertySearch::new().city("Vancouver"), Some(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_positive_limit_is_rejected() {
        let mut reservations = MockReservationStore::new();
        reservations.expect_list_for_guest().never();
        let mut properties = MockPropertyStore::new();
        properties.expect_search().never();

        let db = access(MockUserStore::new(), reservations, properties);
        assert!(matches!(
            db.get_reservations_for_guest(1, Some(0)).await,
            Err(RepositoryError::Validation(_))
        ));
        assert!(matches!(
            db.search_properties(&PropertySearch::new(), Some(-3)).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_property_memory_backend() {
        let db = DataAccess::new(
            Arc::new(MockUserStore::new()),
            Arc::new(MockReservationStore::new()),
            Arc::new(InMemoryPropertyStore::new()),
        );

        let first = db.add_property(CreatePropertyDto::default()).await.unwrap();
        let second = db.add_property(CreatePropertyDto::default()).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
    }
}
