pub mod admin;
pub mod credential;
pub mod events;
pub mod issuer;
pub mod mint;
pub mod proof;
pub mod prove;
pub mod request;
pub mod status;
