use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Warehouse address as `host` or `host:port`
    #[serde(default = "default_store_account")]
    pub store_account: String,

    /// Warehouse user
    pub store_user: String,

    /// Warehouse password
    pub store_password: String,

    /// Database holding the books relation
    pub store_database: String,

    /// Schema holding the books relation
    #[serde(default = "default_store_schema")]
    pub store_schema: String,

    /// Name of the denormalized book interaction relation
    #[serde(default = "default_books_table")]
    pub books_table: String,

    /// Upper bound on pooled warehouse connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply the embedded schema migration at start-up
    #[serde(default)]
    pub run_migrations: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_store_account() -> String {
    "localhost:5432".to_string()
}

fn default_store_schema() -> String {
    "public".to_string()
}

fn default_books_table() -> String {
    "books".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

const DEFAULT_STORE_PORT: u16 = 5432;

/// Relation created by the embedded migration
pub const MIGRATED_RELATION: &str = "public.books";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects schema or table names that cannot be spliced into SQL verbatim,
    /// and migrations aimed at a relation the migration does not create
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("STORE_SCHEMA", &self.store_schema),
            ("BOOKS_TABLE", &self.books_table),
        ] {
            if !is_plain_identifier(value) {
                anyhow::bail!("{} must be a plain SQL identifier, got {:?}", name, value);
            }
        }
        self.store_endpoint()?;
        if self.run_migrations && self.books_relation() != MIGRATED_RELATION {
            anyhow::bail!(
                "RUN_MIGRATIONS only provisions {}, but the configured relation is {}",
                MIGRATED_RELATION,
                self.books_relation()
            );
        }
        Ok(())
    }

    /// Splits `store_account` into host and port
    pub fn store_endpoint(&self) -> anyhow::Result<(String, u16)> {
        match self.store_account.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    anyhow::anyhow!("STORE_ACCOUNT has an invalid port: {}", self.store_account)
                })?;
                Ok((host.to_string(), port))
            }
            None => Ok((self.store_account.clone(), DEFAULT_STORE_PORT)),
        }
    }

    /// Fully qualified books relation, e.g. `public.books`
    pub fn books_relation(&self) -> String {
        format!("{}.{}", self.store_schema, self.books_table)
    }
}

fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
