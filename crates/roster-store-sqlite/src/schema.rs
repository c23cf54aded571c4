//! SQL schemas for the provider and the private store.
//!
//! Executed once at connection startup. Idempotent thanks to
//! `CREATE ... IF NOT EXISTS`.

/// Provider schema: aggregates, raw records, typed data rows, and
/// full-resolution photos. The views expose the joined read model.
pub const PROVIDER_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per aggregate. Created implicitly when a raw contact is inserted
-- without an explicit contact_id; dropped once its last raw contact goes.
CREATE TABLE IF NOT EXISTS contacts (
    contact_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    lookup_key  TEXT    NOT NULL UNIQUE,
    starred     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS raw_contacts (
    raw_contact_id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id     INTEGER NOT NULL REFERENCES contacts(contact_id),
    account_name   TEXT,
    account_type   TEXT
);

-- Generic slots; their meaning depends on mimetype:
--   name:   data2 given, data3 family, data5 middle
--   phone / email / postal / event:  data1 value, data2 type code
--   note:   data1 text
--   photo:  data15 thumbnail bytes
CREATE TABLE IF NOT EXISTS data (
    data_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    raw_contact_id INTEGER NOT NULL
                   REFERENCES raw_contacts(raw_contact_id) ON DELETE CASCADE,
    mimetype       TEXT    NOT NULL,
    data1          TEXT,
    data2,
    data3          TEXT,
    data5          TEXT,
    data15         BLOB
);

CREATE TABLE IF NOT EXISTS display_photos (
    raw_contact_id INTEGER PRIMARY KEY
                   REFERENCES raw_contacts(raw_contact_id) ON DELETE CASCADE,
    content_hash   TEXT NOT NULL,   -- SHA-256 hex of photo
    photo          BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS raw_contacts_contact_idx ON raw_contacts(contact_id);
CREATE INDEX IF NOT EXISTS data_raw_contact_idx     ON data(raw_contact_id, mimetype);

CREATE TRIGGER IF NOT EXISTS raw_contacts_drop_orphan_on_delete
AFTER DELETE ON raw_contacts
BEGIN
    DELETE FROM contacts
     WHERE contact_id = old.contact_id
       AND NOT EXISTS (SELECT 1 FROM raw_contacts WHERE contact_id = old.contact_id);
END;

CREATE TRIGGER IF NOT EXISTS raw_contacts_drop_orphan_on_move
AFTER UPDATE OF contact_id ON raw_contacts
BEGIN
    DELETE FROM contacts
     WHERE contact_id = old.contact_id
       AND NOT EXISTS (SELECT 1 FROM raw_contacts WHERE contact_id = old.contact_id);
END;

-- A thumbnail row and its full-resolution photo live and die together.
CREATE TRIGGER IF NOT EXISTS data_photo_removed
AFTER DELETE ON data
WHEN old.mimetype = 'vnd.android.cursor.item/photo'
BEGIN
    DELETE FROM display_photos WHERE raw_contact_id = old.raw_contact_id;
END;

CREATE VIEW IF NOT EXISTS contacts_view AS
SELECT
    c.contact_id,
    c.lookup_key,
    c.starred,
    (SELECT 'content://roster/display_photo/' || dp.content_hash
       FROM display_photos dp
       JOIN raw_contacts r ON r.raw_contact_id = dp.raw_contact_id
      WHERE r.contact_id = c.contact_id
      ORDER BY dp.raw_contact_id
      LIMIT 1) AS photo_uri,
    CASE WHEN EXISTS (
        SELECT 1
          FROM data d
          JOIN raw_contacts r ON r.raw_contact_id = d.raw_contact_id
         WHERE r.contact_id = c.contact_id
           AND d.mimetype = 'vnd.android.cursor.item/photo')
    THEN 'content://roster/contacts/' || c.contact_id || '/photo'
    END AS photo_thumbnail_uri
FROM contacts c;

CREATE VIEW IF NOT EXISTS data_view AS
SELECT
    d.data_id, d.raw_contact_id, d.mimetype,
    d.data1, d.data2, d.data3, d.data5, d.data15,
    r.contact_id, r.account_name, r.account_type,
    cv.starred, cv.lookup_key, cv.photo_uri, cv.photo_thumbnail_uri
FROM data d
JOIN raw_contacts  r  ON r.raw_contact_id = d.raw_contact_id
JOIN contacts_view cv ON cv.contact_id    = r.contact_id;

PRAGMA user_version = 1;
";

/// Private store schema: one self-contained row per contact. Collections are
/// compact JSON arrays.
pub const LOCAL_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT    NOT NULL DEFAULT '',
    middle_name   TEXT    NOT NULL DEFAULT '',
    surname       TEXT    NOT NULL DEFAULT '',
    photo         BLOB,
    phone_numbers TEXT    NOT NULL DEFAULT '[]',
    emails        TEXT    NOT NULL DEFAULT '[]',
    addresses     TEXT    NOT NULL DEFAULT '[]',
    events        TEXT    NOT NULL DEFAULT '[]',
    starred       INTEGER NOT NULL DEFAULT 0,
    notes         TEXT    NOT NULL DEFAULT ''
);

PRAGMA user_version = 1;
";

/// Seeds the id sequence so the first private contact gets `?1 + 1`.
pub const SEED_LOCAL_SEQUENCE: &str = "
INSERT INTO sqlite_sequence (name, seq)
SELECT 'contacts', ?1
 WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'contacts');
";
