use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Geocoded searches; root of every other table
        CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_query TEXT NOT NULL UNIQUE,
            formatted_query TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS weathers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            forecast TEXT,
            time TEXT NOT NULL,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_weathers_location_id ON weathers(location_id);
        CREATE INDEX IF NOT EXISTS idx_weathers_created_at ON weathers(created_at);

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            link TEXT,
            name TEXT,
            summary TEXT,
            event_date TEXT,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_location_id ON events(location_id);
        CREATE INDEX IF NOT EXISTS idx_events_created_at ON events(created_at);

        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            overview TEXT,
            average_votes REAL,
            total_votes INTEGER,
            image_url TEXT,
            popularity REAL,
            released_on TEXT,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_movies_location_id ON movies(location_id);
        CREATE INDEX IF NOT EXISTS idx_movies_created_at ON movies(created_at);

        -- Businesses
        CREATE TABLE IF NOT EXISTS yelps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            image_url TEXT,
            price TEXT,
            rating REAL,
            url TEXT,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_yelps_location_id ON yelps(location_id);
        CREATE INDEX IF NOT EXISTS idx_yelps_created_at ON yelps(created_at);

        CREATE TABLE IF NOT EXISTS trails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            location TEXT,
            length REAL,
            stars REAL,
            star_votes INTEGER,
            summary TEXT,
            trail_url TEXT,
            conditions TEXT,
            condition_date TEXT,
            condition_time TEXT,
            location_id INTEGER NOT NULL REFERENCES locations(id),
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trails_location_id ON trails(location_id);
        CREATE INDEX IF NOT EXISTS idx_trails_created_at ON trails(created_at);
        "#,
    )
    .await?;

    Ok(())
}
