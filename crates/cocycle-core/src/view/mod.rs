//! View-model derivation for the ride page.
//!
//! Pure functions from fetched entities to display-ready fields: countdown,
//! date/time labels, distance, type colour, host resolution, participant
//! partition and privacy badges. Nothing here performs I/O or mutates its
//! inputs, and missing optional fields always resolve to a placeholder.

pub mod format;
pub mod ride_detail;

pub use format::{
    format_countdown, format_distance, format_ride_date, format_ride_time, truncate_string,
};
pub use ride_detail::{
    deep_link, partition_participants, privacy_badges, BuildContext, CafeStop, HostView,
    ParticipantRow, PrivacyBadge, RideDetailView, RidePage, TypeColor, DEFAULT_DEEP_LINK_SCHEME,
};
