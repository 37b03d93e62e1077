//! Collaborator store contract.

use crate::model::collaborator::{Collaborator, CollaboratorId, NewCollaborator};
use crate::model::identity::UserId;
use crate::model::profile::ProfileId;
use crate::store::StoreResult;

/// Contract for the collaborator enrollment relation.
pub trait CollaboratorStore {
    /// Inserts an enrollment row and returns it.
    fn insert(&self, new: &NewCollaborator) -> StoreResult<Collaborator>;

    /// Finds the enrollment for one user on one profile, if any.
    fn find_for_user(
        &self,
        profile_id: ProfileId,
        user_id: UserId,
    ) -> StoreResult<Option<Collaborator>>;

    /// Lists a profile's enrollments, oldest first.
    fn list_for_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Collaborator>>;

    /// Lists the profile ids one user is enrolled on.
    fn profile_ids_for_user(&self, user_id: UserId) -> StoreResult<Vec<ProfileId>>;

    /// Removes one enrollment by row id.
    fn remove(&self, id: CollaboratorId) -> StoreResult<()>;

    /// Removes every enrollment on a profile (used when the owner switches
    /// it back to private).
    fn remove_all_for_profile(&self, profile_id: ProfileId) -> StoreResult<()>;
}
