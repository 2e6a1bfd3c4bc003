#![allow(dead_code)]

use baserepo::config::{DatabaseConfig, RepositoryConfig};
use baserepo::{db, EntityStore, Repository};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub mod employee {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Default, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "employees")]
    #[serde(default)]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub department: String,
        pub age: i32,
        #[sea_orm(unique)]
        pub email: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub const STAFF: [(&str, &str, i32); 6] = [
    ("alice", "test", 35),
    ("bob", "test", 28),
    ("carol", "develop", 41),
    ("dave", "develop", 30),
    ("erin", "test", 45),
    ("frank", "sales", 30),
];

/// Fresh in-memory database with the six seeded employees.
pub async fn setup() -> DatabaseConnection {
    let conn = db::connect(&DatabaseConfig::default()).await.unwrap();
    db::create_table(&conn, employee::Entity).await.unwrap();

    let repo = Repository::new(employee::Entity, &conn);
    for (name, department, age) in STAFF {
        repo.create(json!({
            "name": name,
            "department": department,
            "age": age,
            "email": format!("{}@example.com", name),
        }))
        .await
        .unwrap();
    }
    conn
}

pub fn debug_config() -> RepositoryConfig {
    RepositoryConfig {
        debug: true,
        ..RepositoryConfig::default()
    }
}

/// Names from a list of JSON rows.
pub fn names(rows: &[serde_json::Value]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row["name"].as_str().map(str::to_string))
        .collect()
}

/// Empty in-memory database, for statements that are built but never run.
pub async fn memory() -> DatabaseConnection {
    db::connect(&DatabaseConfig::default()).await.unwrap()
}
