pub mod ai;
pub mod booking;
pub mod dialogue;
pub mod intent;
pub mod knowledge;
pub mod normalize;
pub mod sessions;
pub mod storage;
