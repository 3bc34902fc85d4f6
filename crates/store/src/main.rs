//! `sealstore-demo` — end-to-end demonstration binary.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables
//!    (`ENCRYPTION_SECRET` must hold a base64-encoded 32-byte key).
//! 2. Initialise structured JSON logging.
//! 3. Decode the secret into process-wide [`KeyMaterial`].
//! 4. Register encryption policies for every entity type.
//! 5. Bind the dispatcher's lifecycle hooks and open the store.
//! 6. Run a small CRUD round trip, including an exact-match lookup over an
//!    encrypted searchable field.

mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use common::{DeclaredType, FieldValue};
use engine::config::Config;
use engine::crypto::search;
use engine::hooks::HookBus;
use engine::{EncryptionPolicy, FieldEncryptor, PolicyRegistry};
use store::{MemStore, Record};
use tracing::info;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "sealstore-demo starting");

    // -----------------------------------------------------------------------
    // 3. Key material
    // -----------------------------------------------------------------------
    let key = Arc::new(cfg.key_material()?);

    // -----------------------------------------------------------------------
    // 4. Encryption policies
    // -----------------------------------------------------------------------
    let registry = Arc::new(
        PolicyRegistry::builder()
            .register(
                EncryptionPolicy::for_entity("author")
                    .field("name", DeclaredType::Text)
                    .field("mobile", DeclaredType::Text),
            )
            .register(
                EncryptionPolicy::for_entity("book")
                    .field("title", DeclaredType::Text)
                    .field("publisher_name", DeclaredType::Text)
                    .searchable("title"),
            )
            .build()?,
    );
    info!(policies = registry.len(), "encryption policies registered");

    // -----------------------------------------------------------------------
    // 5. Hook binding and store
    // -----------------------------------------------------------------------
    let encryptor = FieldEncryptor::new(Arc::clone(&key), registry);
    let mut bus = HookBus::new();
    encryptor.bind(&mut bus);
    let mut db = MemStore::new(bus);

    // -----------------------------------------------------------------------
    // 6. CRUD round trip
    // -----------------------------------------------------------------------
    let author_id = db.insert(
        "author",
        Record::new()
            .with("name", FieldValue::Text("George Orwell".into()))
            .with("mobile", FieldValue::Text("+44 20 7946 0000".into())),
    )?;
    let book_id = db.insert(
        "book",
        Record::new()
            .with("title", FieldValue::Text("1984".into()))
            .with("publisher_name", FieldValue::Text("Secker & Warburg".into()))
            .with("author_id", FieldValue::Integer(author_id as i64)),
    )?;
    info!(author_id, book_id, "rows inserted (declared fields encrypted at rest)");

    let book = db.fetch("book", book_id)?;
    info!(
        title_is_plaintext = !book.field("title").map_or(false, FieldValue::is_ciphertext),
        "book materialised"
    );

    let digest = search::lookup_digest("1984", &key);
    let hits = db.find_by_digest("book", "title", &digest)?;
    info!(hits = hits.len(), "exact-match lookup over encrypted title");

    info!("sealstore-demo finished");
    Ok(())
}
