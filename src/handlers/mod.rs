pub mod calls;
pub mod events;
pub mod health;
pub mod inventory;
