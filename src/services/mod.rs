pub mod classifier;
pub mod crm;
pub mod dialogue;
pub mod recommend;
pub mod tracker;
