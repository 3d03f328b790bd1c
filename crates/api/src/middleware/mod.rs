//! Request extractors.
//!
//! - [`identity::Identity`] -- The (possibly anonymous) author making the request.

pub mod identity;
