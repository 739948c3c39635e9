use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

use super::data::{Asset, AssetId, AssetVariant, NewAsset, NewVariant, SiteContext};
use super::{AssetStore, SettingsStore};
use crate::config::IconConfig;
use crate::error::Result;

/// The Library manages the SQLite catalog database.
/// It stores uploaded files, their size variants, and per-site settings.
pub struct Library {
    conn: Connection,
    uploads_dir: PathBuf,
    base_url: String,
    /// None for in-memory catalogs
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open (or create) the catalog described by the config.
    ///
    /// The database file and the uploads directory both live in
    /// `config.data_dir`:
    /// - Linux: ~/.local/share/site-icon/site_icon.db
    /// - macOS: ~/Library/Application Support/site-icon/site_icon.db
    /// - Windows: %APPDATA%\site-icon\site_icon.db
    pub fn open(config: &IconConfig) -> Result<Self> {
        let db_path = config.db_path();
        let uploads_dir = config.uploads_dir();
        fs::create_dir_all(&uploads_dir)?;

        let conn = Connection::open(&db_path)?;
        tracing::info!("📁 Catalog opened at: {}", db_path.display());

        let library = Library {
            conn,
            uploads_dir,
            base_url: config.base_url.clone(),
            db_path: Some(db_path),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Open a catalog that lives only in memory. Files still go to
    /// `uploads_dir` on disk.
    pub fn open_in_memory(uploads_dir: &Path, base_url: &str) -> Result<Self> {
        fs::create_dir_all(uploads_dir)?;
        let library = Library {
            conn: Connection::open_in_memory()?,
            uploads_dir: uploads_dir.to_path_buf(),
            base_url: base_url.to_string(),
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Create all tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Stored files: uploads, previews and icon masters
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS assets (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                site_id         INTEGER NOT NULL,
                title           TEXT NOT NULL,
                path            TEXT NOT NULL,
                url             TEXT NOT NULL,
                mime_type       TEXT NOT NULL,
                width           INTEGER NOT NULL,
                height          INTEGER NOT NULL,
                parent_id       INTEGER,
                context         TEXT NOT NULL,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        // Square size variants generated from an asset
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS asset_variants (
                asset_id        INTEGER NOT NULL,
                size            INTEGER NOT NULL,
                path            TEXT NOT NULL,
                url             TEXT NOT NULL,
                width           INTEGER NOT NULL,
                height          INTEGER NOT NULL,
                PRIMARY KEY(asset_id, size),
                FOREIGN KEY(asset_id) REFERENCES assets(id) ON DELETE CASCADE
            )",
            [],
        )?;

        // Named settings per site
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS options (
                site_id         INTEGER NOT NULL,
                name            TEXT NOT NULL,
                value           TEXT NOT NULL,
                PRIMARY KEY(site_id, name)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assets_context
             ON assets(site_id, context)",
            [],
        )?;

        tracing::debug!("Catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Public URL for a file under the uploads directory
    pub fn url_for(&self, path: &Path) -> String {
        let relative = path
            .strip_prefix(&self.uploads_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    /// Get a count of assets with the given context for a site
    pub fn count_assets(&self, ctx: &SiteContext, context: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE site_id = ?1 AND context = ?2",
            params![ctx.site_id, context],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn remove_file(path: &str) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("⚠️  Could not delete {}: {}", path, e),
        }
    }
}

fn row_to_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        site_id: row.get(1)?,
        title: row.get(2)?,
        path: row.get(3)?,
        url: row.get(4)?,
        mime_type: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        parent_id: row.get(8)?,
        context: row.get(9)?,
    })
}

impl AssetStore for Library {
    fn upload_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn insert_asset(&self, ctx: &SiteContext, asset: &NewAsset) -> Result<Asset> {
        let url = self.url_for(Path::new(&asset.path));
        self.conn.execute(
            "INSERT INTO assets (site_id, title, path, url, mime_type, width, height, parent_id, context, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                ctx.site_id,
                asset.title,
                asset.path,
                url,
                asset.mime_type,
                asset.width,
                asset.height,
                asset.parent_id,
                asset.context,
                chrono::Utc::now().timestamp(),
            ],
        )?;

        Ok(Asset {
            id: self.conn.last_insert_rowid(),
            site_id: ctx.site_id,
            title: asset.title.clone(),
            path: asset.path.clone(),
            url,
            mime_type: asset.mime_type.clone(),
            width: asset.width,
            height: asset.height,
            parent_id: asset.parent_id,
            context: asset.context.clone(),
        })
    }

    fn get_asset(&self, id: AssetId) -> Result<Option<Asset>> {
        let asset = self
            .conn
            .query_row(
                "SELECT id, site_id, title, path, url, mime_type, width, height, parent_id, context
                 FROM assets WHERE id = ?1",
                [id],
                row_to_asset,
            )
            .optional()?;
        Ok(asset)
    }

    fn add_variant(&self, id: AssetId, variant: &NewVariant) -> Result<AssetVariant> {
        let url = self.url_for(Path::new(&variant.path));
        self.conn.execute(
            "INSERT OR REPLACE INTO asset_variants (asset_id, size, path, url, width, height)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, variant.size, variant.path, url, variant.width, variant.height],
        )?;
        Ok(AssetVariant {
            size: variant.size,
            path: variant.path.clone(),
            url,
            width: variant.width,
            height: variant.height,
        })
    }

    fn variants(&self, id: AssetId) -> Result<Vec<AssetVariant>> {
        let mut stmt = self.conn.prepare(
            "SELECT size, path, url, width, height FROM asset_variants
             WHERE asset_id = ?1 ORDER BY size DESC",
        )?;

        let variant_iter = stmt.query_map([id], |row| {
            Ok(AssetVariant {
                size: row.get(0)?,
                path: row.get(1)?,
                url: row.get(2)?,
                width: row.get(3)?,
                height: row.get(4)?,
            })
        })?;

        let mut variants = Vec::new();
        for variant in variant_iter {
            variants.push(variant?);
        }
        Ok(variants)
    }

    fn delete_asset(&self, id: AssetId) -> Result<bool> {
        let Some(asset) = self.get_asset(id)? else {
            return Ok(false);
        };

        for variant in self.variants(id)? {
            Self::remove_file(&variant.path);
        }
        Self::remove_file(&asset.path);

        self.conn
            .execute("DELETE FROM asset_variants WHERE asset_id = ?1", [id])?;
        self.conn.execute("DELETE FROM assets WHERE id = ?1", [id])?;

        tracing::debug!("🗑️  Deleted asset {} ({})", id, asset.title);
        Ok(true)
    }
}

impl SettingsStore for Library {
    fn get_option(&self, ctx: &SiteContext, name: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM options WHERE site_id = ?1 AND name = ?2",
                params![ctx.site_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_option(&self, ctx: &SiteContext, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO options (site_id, name, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(site_id, name) DO UPDATE SET value = excluded.value",
            params![ctx.site_id, name, value],
        )?;
        Ok(())
    }

    fn delete_option(&self, ctx: &SiteContext, name: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM options WHERE site_id = ?1 AND name = ?2",
            params![ctx.site_id, name],
        )?;
        Ok(changed > 0)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .field("uploads_dir", &self.uploads_dir)
            .finish()
    }
}
