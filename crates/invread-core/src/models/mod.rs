//! Data models shared by the relay and the presenter.

pub mod config;
pub mod invoice;
pub mod response;
