//! User account rules
//!
//! Role and activation changes go through here so the registry always has
//! at least one active admin left to administer it. Accounts are never
//! deleted; deactivation is the off switch.

use crate::error::{Conflict, Error};
use crate::model::*;
use crate::registry::Registry;

impl Registry {
    fn active_admin_count(&self) -> usize {
        self.world
            .query::<(&UserId, &Role, &UserProfile)>()
            .iter()
            .filter(|(_, (_, role, profile))| **role == Role::Admin && profile.active)
            .count()
    }

    /// Change a user's role. Refused when it would demote the last
    /// active admin.
    pub fn set_user_role(&mut self, user: UserId, role: Role) -> Result<User, Error> {
        let entity = self.require_user(user)?;

        let current = *self.world.get::<&Role>(entity).unwrap();
        let active = self.world.get::<&UserProfile>(entity).unwrap().active;
        if current == Role::Admin && role != Role::Admin && active && self.active_admin_count() <= 1
        {
            return Err(Conflict::LastActiveAdmin.into());
        }

        *self.world.get::<&mut Role>(entity).unwrap() = role;
        self.touch(entity);
        Ok(self.user_record(entity))
    }

    /// Activate or deactivate an account. Refused when it would switch
    /// off the last active admin.
    pub fn set_user_active(&mut self, user: UserId, active: bool) -> Result<User, Error> {
        let entity = self.require_user(user)?;

        let role = *self.world.get::<&Role>(entity).unwrap();
        let currently_active = self.world.get::<&UserProfile>(entity).unwrap().active;
        if currently_active && !active && role == Role::Admin && self.active_admin_count() <= 1 {
            return Err(Conflict::LastActiveAdmin.into());
        }

        self.world.get::<&mut UserProfile>(entity).unwrap().active = active;
        self.touch(entity);
        Ok(self.user_record(entity))
    }
}
