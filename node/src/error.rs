use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] agt_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] agt_store_lmdb::LmdbError),

    #[error("identity error: {0}")]
    Identity(#[from] agt_identity::IdentityError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
