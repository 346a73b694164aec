pub const SCHEMA: &str = r#"
-- Items table: the album/photo/movie tree
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER REFERENCES items(id),
    type TEXT NOT NULL,              -- 'album', 'photo' or 'movie'
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT,
    level INTEGER NOT NULL,
    weight INTEGER NOT NULL DEFAULT 0,

    -- Album ordering
    sort_column TEXT NOT NULL DEFAULT 'weight',
    sort_order TEXT NOT NULL DEFAULT 'ASC',

    album_cover_item_id INTEGER,

    -- Denormalized, may be NULL; recomputed from the ancestor chain
    relative_path_cache TEXT,        -- rawurlencoded names joined by '/'
    relative_url_cache TEXT,         -- slugs joined by '/'

    owner_id INTEGER,
    captured INTEGER,                -- unix seconds from EXIF
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL,
    view_count INTEGER NOT NULL DEFAULT 0,
    rand_key REAL NOT NULL DEFAULT 0,

    -- Media
    width INTEGER,
    height INTEGER,
    mime_type TEXT
);

CREATE INDEX IF NOT EXISTS idx_items_parent ON items(parent_id);
CREATE INDEX IF NOT EXISTS idx_items_relative_path ON items(relative_path_cache);
CREATE INDEX IF NOT EXISTS idx_items_relative_url ON items(relative_url_cache);
CREATE INDEX IF NOT EXISTS idx_items_level_name ON items(level, name);
CREATE INDEX IF NOT EXISTS idx_items_level_slug ON items(level, slug);
CREATE INDEX IF NOT EXISTS idx_items_weight ON items(weight);
CREATE INDEX IF NOT EXISTS idx_items_rand_key ON items(rand_key);

-- Users and groups
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL DEFAULT '',
    admin INTEGER NOT NULL DEFAULT 0,
    guest INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    special INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS groups_users (
    group_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    PRIMARY KEY (group_id, user_id),
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Per-item grants, one row per (item, group)
CREATE TABLE IF NOT EXISTS access_cache (
    item_id INTEGER NOT NULL,
    group_id INTEGER NOT NULL,
    view INTEGER NOT NULL DEFAULT 0,
    edit INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (item_id, group_id),
    FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_access_cache_group ON access_cache(group_id);

-- Short-lived key/value entries (display context and friends)
CREATE TABLE IF NOT EXISTS caches (
    key TEXT PRIMARY KEY,
    tags TEXT NOT NULL DEFAULT '',   -- comma separated, wrapped in commas
    expiration INTEGER,              -- unix seconds, NULL = never
    cache TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_caches_expiration ON caches(expiration);
"#;

/// Seed rows every gallery starts with: the two special groups, the guest and
/// admin users, and a root album viewable by everybody.
pub const SEED: &str = r#"
INSERT OR IGNORE INTO groups (id, name, special) VALUES (1, 'Everybody', 1);
INSERT OR IGNORE INTO groups (id, name, special) VALUES (2, 'Registered Users', 1);

INSERT OR IGNORE INTO users (id, name, full_name, admin, guest) VALUES (1, 'guest', 'Guest User', 0, 1);
INSERT OR IGNORE INTO users (id, name, full_name, admin, guest) VALUES (2, 'admin', 'Gallery Administrator', 1, 0);

INSERT OR IGNORE INTO items (
    id, parent_id, type, name, slug, title, level, weight,
    relative_path_cache, relative_url_cache, owner_id, created, updated, rand_key
) VALUES (
    1, NULL, 'album', '', '', 'Gallery', 1, 1,
    '', '', 2, strftime('%s', 'now'), strftime('%s', 'now'), 0.5
);

INSERT OR IGNORE INTO access_cache (item_id, group_id, view, edit) VALUES (1, 1, 1, 0);
INSERT OR IGNORE INTO access_cache (item_id, group_id, view, edit) VALUES (1, 2, 1, 0);
"#;

/// Migrations to add columns to existing tables.
/// These are run after the main schema, errors are ignored (column may already exist).
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE items ADD COLUMN width INTEGER",
    "ALTER TABLE items ADD COLUMN height INTEGER",
    "ALTER TABLE items ADD COLUMN mime_type TEXT",
];
