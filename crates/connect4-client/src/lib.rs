pub mod lobby;
pub mod net_client;
pub mod session;
pub mod state;
