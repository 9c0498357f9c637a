//! Property search query builder
//!
//! Translates a [`PropertySearch`] into a parameterized statement. Row
//! predicates go into `WHERE`, the rating predicate goes into `HAVING`
//! because the average rating only exists after grouping.
//!
//! Predicates are collected as an ordered list and placeholders are numbered
//! while rendering, so the Nth bound value is always `$N`.

use lb_core::config::CityMatch;
use lb_core::Id;
use serde::{Deserialize, Serialize};

const BASE_QUERY: &str = r#"SELECT properties.*, AVG(property_reviews.rating)::float8 AS average_rating
FROM properties
JOIN property_reviews ON property_reviews.property_id = properties.id
WHERE 1=1"#;

/// Optional property search criteria
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PropertySearch {
    /// Substring of the property's city
    pub city: Option<String>,
    pub owner_id: Option<Id>,
    /// Inclusive lower bound on `cost_per_night`
    pub minimum_price_per_night: Option<i32>,
    /// Inclusive upper bound on `cost_per_night`
    pub maximum_price_per_night: Option<i32>,
    /// Inclusive lower bound on the average review rating
    pub minimum_rating: Option<f64>,
}

impl PropertySearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn owner(mut self, owner_id: Id) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn minimum_price(mut self, cost_per_night: i32) -> Self {
        self.minimum_price_per_night = Some(cost_per_night);
        self
    }

    pub fn maximum_price(mut self, cost_per_night: i32) -> Self {
        self.maximum_price_per_night = Some(cost_per_night);
        self
    }

    pub fn minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }

    /// City filter, with an empty string treated as absent
    pub fn city_filter(&self) -> Option<&str> {
        self.city.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.city_filter().is_none()
            && self.owner_id.is_none()
            && self.minimum_price_per_night.is_none()
            && self.maximum_price_per_night.is_none()
            && self.minimum_rating.is_none()
    }
}

/// Parameter for prepared statements
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Like,
    ILike,
    Equals,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl Comparison {
    fn as_sql(self) -> &'static str {
        match self {
            Comparison::Like => "LIKE",
            Comparison::ILike => "ILIKE",
            Comparison::Equals => "=",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::LessThanOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone)]
struct Predicate {
    column: &'static str,
    comparison: Comparison,
    value: SqlParam,
}

/// Assembled statement and its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Property search statement under construction
#[derive(Debug, Clone)]
pub struct PropertyQuery {
    predicates: Vec<Predicate>,
    having: Option<Predicate>,
    limit: i64,
}

impl PropertyQuery {
    pub fn new(filters: &PropertySearch, limit: i64, city_match: CityMatch) -> Self {
        let mut predicates = Vec::new();

        if let Some(city) = filters.city_filter() {
            let comparison = match city_match {
                CityMatch::CaseSensitive => Comparison::Like,
                CityMatch::CaseInsensitive => Comparison::ILike,
            };
            predicates.push(Predicate {
                column: "properties.city",
                comparison,
                value: SqlParam::Text(format!("%{}%", escape_like(city))),
            });
        }
        if let Some(owner_id) = filters.owner_id {
            predicates.push(Predicate {
                column: "properties.owner_id",
                comparison: Comparison::Equals,
                value: SqlParam::Int(owner_id),
            });
        }
        if let Some(min) = filters.minimum_price_per_night {
            predicates.push(Predicate {
                column: "properties.cost_per_night",
                comparison: Comparison::GreaterThanOrEqual,
                value: SqlParam::Int(min),
            });
        }
        if let Some(max) = filters.maximum_price_per_night {
            predicates.push(Predicate {
                column: "properties.cost_per_night",
                comparison: Comparison::LessThanOrEqual,
                value: SqlParam::Int(max),
            });
        }

        let having = filters.minimum_rating.map(|rating| Predicate {
            column: "AVG(property_reviews.rating)",
            comparison: Comparison::GreaterThanOrEqual,
            value: SqlParam::Float(rating),
        });

        Self {
            predicates,
            having,
            limit,
        }
    }

    /// Render the statement, numbering placeholders in bind order
    pub fn build(&self) -> BuiltQuery {
        let mut sql = String::from(BASE_QUERY);
        let mut params = Vec::with_capacity(self.predicates.len() + 2);

        for predicate in &self.predicates {
            params.push(predicate.value.clone());
            sql.push_str(&format!(
                "\nAND {} {} ${}",
                predicate.column,
                predicate.comparison.as_sql(),
                params.len()
            ));
        }

        sql.push_str("\nGROUP BY properties.id");

        if let Some(having) = &self.having {
            params.push(having.value.clone());
            sql.push_str(&format!(
                "\nHAVING {} {} ${}",
                having.column,
                having.comparison.as_sql(),
                params.len()
            ));
        }

        params.push(SqlParam::BigInt(self.limit));
        sql.push_str(&format!("\nLIMIT ${}", params.len()));

        BuiltQuery { sql, params }
    }
}

/// Escape LIKE metacharacters so the city matches literally
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
