//! The module contains the definition of an authenticated user.

use engine::{Actor, Role};
use sea_orm::entity::prelude::*;

use crate::ServerError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The engine-side principal for an authenticated user row.
pub fn actor(user: &Model) -> Result<Actor, ServerError> {
    let role = Role::try_from(user.role.as_str())
        .map_err(|_| ServerError::Generic(format!("unknown role for {}", user.username)))?;
    Ok(Actor {
        user_id: user.username.clone(),
        role,
    })
}

/// Shortcut for endpoints restricted to administrators.
pub fn require_admin(user: &Model) -> Result<Actor, ServerError> {
    let actor = actor(user)?;
    if actor.role != Role::Admin {
        return Err(ServerError::Engine(engine::EngineError::Forbidden(
            "admin only".to_string(),
        )));
    }
    Ok(actor)
}
