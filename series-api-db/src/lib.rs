pub mod pool;
pub mod sql;
pub mod store;

pub use pool::{
    DatabasePool,
    PoolStatus,
    initialize_dbpool,
};

pub use store::{
    SeriesStore,
    StoreHealth,
};
