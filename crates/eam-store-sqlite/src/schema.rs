//! SQL schema for the asset SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Named local slots (offline queue, saved draft). Values are JSON.
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- One row per received payload. The same asset_id may arrive more than once;
-- reads return the latest. payload_json keeps the document as received.
CREATE TABLE IF NOT EXISTS assets (
    record_id            TEXT PRIMARY KEY,
    asset_id             TEXT NOT NULL,
    barcode              TEXT,
    asset_type           TEXT,
    parent_asset_id      TEXT,
    serial_number        TEXT,

    account_head         TEXT,
    category             TEXT,
    sub_category         TEXT,
    asset_group          TEXT,
    asset_model          TEXT,
    manufacturer         TEXT,

    asset_name           TEXT,
    purchase_date        TEXT,            -- YYYY-MM-DD or NULL
    capitalization_date  TEXT,
    vendor               TEXT,
    invoice_number       TEXT,
    asset_value          REAL,
    warranty_start       TEXT,
    warranty_end         TEXT,
    amc_applicable       INTEGER,

    cpu                  TEXT,
    ram                  TEXT,
    storage              TEXT,
    os                   TEXT,
    ip_address           TEXT,
    mac_address          TEXT,
    hostname             TEXT,
    software_license     TEXT,

    dimensions           TEXT,
    capacity             TEXT,
    material_type        TEXT,
    power_rating         TEXT,
    installation_date    TEXT,

    department           TEXT,
    cost_center          TEXT,
    location             TEXT,
    sub_location         TEXT,
    assigned_to          TEXT,
    custodian            TEXT,

    asset_status         TEXT,
    verification_status  TEXT,
    verification_cycle   TEXT,
    remarks              TEXT,

    latitude             REAL,
    longitude            REAL,
    accuracy             REAL,
    captured_by          TEXT,
    captured_at_location TEXT,
    captured_at          TEXT,            -- metadata.timestamp, RFC 3339

    received_at          TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    payload_json         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS asset_images (
    image_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id   TEXT NOT NULL REFERENCES assets(record_id),
    asset_id    TEXT NOT NULL,
    image_index INTEGER,
    image_data  TEXT,
    captured_at TEXT
);

CREATE INDEX IF NOT EXISTS assets_asset_id_idx    ON assets(asset_id);
CREATE INDEX IF NOT EXISTS assets_category_idx    ON assets(category);
CREATE INDEX IF NOT EXISTS assets_received_idx    ON assets(received_at);
CREATE INDEX IF NOT EXISTS asset_images_record_idx ON asset_images(record_id);

PRAGMA user_version = 1;
";
