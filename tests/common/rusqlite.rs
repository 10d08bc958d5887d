use ::rusqlite::{Connection, params};
use canopy::prelude::*;
use canopy::sqlite::pragma;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// In-memory database with the test tables and the two-category fixture.
pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    create_tables(&conn);
    seed_categories(&conn);
    conn
}

fn create_tables(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL
        );
        CREATE TABLE categories (
            id TEXT PRIMARY KEY,
            parent_id TEXT REFERENCES categories(id),
            name TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            owner TEXT,
            created_by INTEGER REFERENCES users(id),
            updated_by INTEGER REFERENCES users(id),
            created_at TEXT
        );
        CREATE TABLE memberships (
            user_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, group_id)
        );
        CREATE TABLE events (body TEXT);",
    )
    .expect("Failed to create tables");
}

fn seed_categories(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO users (id, display_name) VALUES (1, 'Ada'), (2, 'Grace');
        INSERT INTO categories (id, parent_id, name, position, owner, created_by, updated_by)
        VALUES
            ('e1', NULL, 'Electronics', 1, 'alice', 1, 2),
            ('e2', 'e1', 'Phones', 2, 'bob', 2, NULL);",
    )
    .expect("Failed to seed categories");
}

/// Adds `count` categories, each the child of a random earlier one (or of
/// `e2`), and returns their ids in insertion order.
pub fn seed_random_categories(conn: &Connection, count: usize, rng_seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut ids: Vec<String> = vec!["e2".to_string()];
    for i in 0..count {
        let id = format!("r{i}");
        let parent = ids[rng.random_range(0..ids.len())].clone();
        conn.execute(
            "INSERT INTO categories (id, parent_id, name, position) VALUES (?1, ?2, ?3, ?4)",
            params![id, parent, format!("Random {i}"), i as i64 + 10],
        )
        .expect("Failed to insert category");
        ids.push(id);
    }
    ids.split_off(1)
}

pub fn categories(conn: &Connection) -> EntitySchema {
    pragma::table_info(conn, "categories").expect("categories schema")
}

pub fn users(conn: &Connection) -> EntitySchema {
    pragma::table_info(conn, "users").expect("users schema")
}
