//! Typed access to the per-schema and per-request data attached to a
//! resolver's [`Context`].

use std::any::Any;

use async_graphql::Context;
use inkwell_db::DbPool;

use super::loaders::Loaders;
use crate::auth::jwt::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::Identity;

fn data<'a, T: Any + Send + Sync>(ctx: &Context<'a>) -> AppResult<&'a T> {
    ctx.data_opt::<T>().ok_or_else(|| {
        AppError::InternalError(format!(
            "{} missing from GraphQL context",
            std::any::type_name::<T>()
        ))
    })
}

pub fn pool<'a>(ctx: &Context<'a>) -> AppResult<&'a DbPool> {
    data::<DbPool>(ctx)
}

pub fn jwt<'a>(ctx: &Context<'a>) -> AppResult<&'a JwtConfig> {
    data::<JwtConfig>(ctx)
}

pub fn loaders<'a>(ctx: &Context<'a>) -> AppResult<&'a Loaders> {
    data::<Loaders>(ctx)
}

/// The requesting identity; anonymous unless the request authenticated.
pub fn identity<'a>(ctx: &Context<'a>) -> AppResult<&'a Identity> {
    data::<Identity>(ctx)
}
