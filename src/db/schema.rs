//! Database schema migrations for catnews.
//!
//! Each entry is applied in order inside a transaction and recorded in the
//! `schema_version` table.

/// All schema migrations, in order.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and OAuth provider links
    r#"
    CREATE TABLE users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        username        TEXT NOT NULL,
        email           TEXT NOT NULL,
        discord_id      TEXT,
        github_id       TEXT,
        password_hash   TEXT NOT NULL DEFAULT '',
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE UNIQUE INDEX idx_users_username ON users(username);
    CREATE UNIQUE INDEX idx_users_email ON users(email);
    CREATE UNIQUE INDEX idx_users_discord_id ON users(discord_id);
    CREATE UNIQUE INDEX idx_users_github_id ON users(github_id);

    CREATE TABLE oauth_links (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        provider        TEXT NOT NULL,
        user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        access_token    TEXT NOT NULL,
        refresh_token   TEXT,
        expires_at      TEXT,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (user_id, provider)
    );
    "#,
    // v2: feeds, subscriptions, articles and feed-article links
    r#"
    CREATE TABLE feeds (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        title           TEXT NOT NULL,
        url             TEXT NOT NULL,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE UNIQUE INDEX idx_feeds_url ON feeds(url);

    CREATE TABLE subscriptions (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        feed_id         INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (user_id, feed_id)
    );

    CREATE TABLE articles (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        title           TEXT NOT NULL,
        url             TEXT NOT NULL,
        content         TEXT,
        published_at    TEXT,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX idx_articles_url ON articles(url);

    CREATE TABLE feed_articles (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        feed_id         INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        article_id      INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (feed_id, article_id)
    );
    "#,
    // v3: tags and summaries
    r#"
    CREATE TABLE tags (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL
    );
    CREATE UNIQUE INDEX idx_tags_name ON tags(name);

    CREATE TABLE article_tags (
        article_id      INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
        tag_id          INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (article_id, tag_id)
    );

    CREATE TABLE summaries (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        article_id      INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
        content         TEXT NOT NULL,
        created_at      TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (article_id)
    );
    "#,
];
