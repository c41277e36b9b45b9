//! Message pipelines behind the command router.
//!
//! Each pipeline handles the failures it has a specific reply for and
//! returns everything else to the router's boundary.

pub mod chat;
pub mod image;
pub mod vision;
