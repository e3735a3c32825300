//! Core domain entities.
//!
//! Plain data structures without infrastructure concerns. Creation inputs use
//! separate `New*` structs; everything else is immutable snapshots of
//! persisted rows.
//!
//! - [`Link`] - a short-id-to-target mapping, root or referral
//! - [`Visit`] - one redirect event with enrichment metadata
//! - [`ReferralRequest`] - the pending/approved/declined workflow ticket
//! - [`DeletedLink`] - retention archive row
//! - [`Account`] - link owners and requesters

pub mod account;
pub mod deleted_link;
pub mod link;
pub mod referral_request;
pub mod visit;

pub use account::{Account, NewAccount};
pub use deleted_link::DeletedLink;
pub use link::{Link, NewLink};
pub use referral_request::{NewReferralRequest, ReferralRequest, RequestStatus};
pub use visit::{GeoInfo, NewVisit, UNKNOWN, Visit};
