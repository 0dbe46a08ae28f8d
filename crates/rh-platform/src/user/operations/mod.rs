//! User Operations

pub mod register;
pub mod change_role;
pub mod update_profile;

pub use register::{RegisterUserCommand, RegisterUserUseCase, RegisterOutcome, USER_EXISTS_MESSAGE};
pub use change_role::{ChangeRoleCommand, ChangeRoleUseCase, ROLE_UPDATED_MESSAGE};
pub use update_profile::{UpdateProfileCommand, UpdateProfileUseCase};
