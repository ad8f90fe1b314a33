pub mod inbound;
pub mod intent;
pub mod lead;
pub mod reply;
pub mod session;

pub use inbound::Inbound;
pub use intent::Intent;
pub use lead::{LeadRecord, LeadSource, LeadStatus, MasterCategory};
pub use reply::Reply;
pub use session::{BookingStep, Session, SessionKey};
