//! SQL DDL for the Taurus Engine repository.
//!
//! Defines the `instance_status_history`, `lock`, `metric`, and `metric_data`
//! tables. All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// Table names in dependency order (referenced tables first).
pub const TABLES: &[&str] = &["instance_status_history", "lock", "metric", "metric_data"];

const SCHEMA_SQL: &str = r#"
-- Server status transitions
CREATE TABLE IF NOT EXISTS instance_status_history (
    server VARCHAR(100) NOT NULL DEFAULT '',
    timestamp TIMESTAMP NOT NULL DEFAULT '0000-00-00 00:00:00',
    status VARCHAR(32) NOT NULL DEFAULT '',
    PRIMARY KEY (server, timestamp)
);

-- Named application locks
CREATE TABLE IF NOT EXISTS lock (
    name VARCHAR(40) NOT NULL PRIMARY KEY
);

-- Monitored metrics and their model state
CREATE TABLE IF NOT EXISTS metric (
    uid VARCHAR(40) NOT NULL PRIMARY KEY,
    datasource VARCHAR(100),
    name VARCHAR(255),
    description VARCHAR(200),
    server VARCHAR(100),
    location VARCHAR(200),
    parameters TEXT,
    status INTEGER DEFAULT 0,
    message TEXT,
    collector_error TEXT,
    last_timestamp TIMESTAMP,
    poll_interval INTEGER DEFAULT 60,
    tag_name VARCHAR(200),
    model_params TEXT,
    last_rowid INTEGER
);

CREATE INDEX IF NOT EXISTS datasource_idx ON metric(datasource);
CREATE INDEX IF NOT EXISTS location_idx ON metric(location);
CREATE INDEX IF NOT EXISTS server_idx ON metric(server);

-- Metric samples with anomaly scores
CREATE TABLE IF NOT EXISTS metric_data (
    uid VARCHAR(40) NOT NULL DEFAULT '',
    rowid INTEGER NOT NULL DEFAULT 0,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    metric_value DOUBLE NOT NULL,
    raw_anomaly_score DOUBLE,
    anomaly_score DOUBLE,
    display_value INTEGER,
    PRIMARY KEY (uid, rowid),
    CONSTRAINT metric_data_to_metric_fk FOREIGN KEY (uid) REFERENCES metric(uid)
        ON UPDATE CASCADE ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS anomaly_score_idx ON metric_data(anomaly_score);
CREATE INDEX IF NOT EXISTS timestamp_idx ON metric_data(timestamp);
"#;

/// Initialize all tables and seed the `metrics` lock row. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute("INSERT OR IGNORE INTO lock (name) VALUES ('metrics')", [])?;
    Ok(())
}
