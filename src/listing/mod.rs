//! Listing data model
//!
//! - `ListingReference`: a link to one listing, as found on a results page
//! - `ListingRecord`: the structured record extracted from a listing page

mod record;
mod reference;

pub use record::{Contact, ListingRecord};
pub use reference::ListingReference;
