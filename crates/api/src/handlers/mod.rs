pub mod auth;
pub mod campaigns;
pub mod lists;
pub mod namespaces;
pub mod permissions;
pub mod shares;
pub mod users;
