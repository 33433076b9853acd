use crate::{
    db::{DbPool, OrmConn, orm_from_pool},
    middleware::auth::SessionResolver,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sessions: SessionResolver,
}

impl AppState {
    pub fn new(pool: DbPool, sessions: SessionResolver) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            sessions,
        }
    }
}
