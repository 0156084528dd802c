//! Display model for the ride detail page.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::cache::QueryState;
use crate::models::{Coordinate, Participant, Ride, RideType};

use super::format::{
    format_coordinate, format_countdown, format_distance, format_optional, format_ride_date,
    format_ride_time, non_empty,
};

/// Placeholder name for riders without one
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Placeholder level for riders without one
pub const DEFAULT_LEVEL: &str = "Cyclist";

/// Label for a café stop the host did not name
pub const DEFAULT_CAFE_NAME: &str = "Café Stop";

/// Scheme of the native app deep link
pub const DEFAULT_DEEP_LINK_SCHEME: &str = "cocycle";

/// Display colour of a ride type badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeColor {
    Blue,
    Orange,
    Green,
    Red,
    Neutral,
}

impl TypeColor {
    pub fn for_ride_type(ride_type: &RideType) -> Self {
        match ride_type {
            RideType::Social => TypeColor::Blue,
            RideType::Training => TypeColor::Orange,
            RideType::Chill => TypeColor::Green,
            RideType::Fast => TypeColor::Red,
            RideType::Other(_) => TypeColor::Neutral,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TypeColor::Blue => "bg-[#5B7FFF]",
            TypeColor::Orange => "bg-[#FF8A5B]",
            TypeColor::Green => "bg-green-500",
            TypeColor::Red => "bg-red-500",
            TypeColor::Neutral => "bg-gray-500",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            TypeColor::Blue => (0x5B, 0x7F, 0xFF),
            TypeColor::Orange => (0xFF, 0x8A, 0x5B),
            TypeColor::Green => (0x22, 0xC5, 0x5E),
            TypeColor::Red => (0xEF, 0x44, 0x44),
            TypeColor::Neutral => (0x6B, 0x72, 0x80),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyBadge {
    InviteOnly,
    WomenOnly,
}

impl PrivacyBadge {
    pub fn label(&self) -> &'static str {
        match self {
            PrivacyBadge::InviteOnly => "Invite Only",
            PrivacyBadge::WomenOnly => "Women Only",
        }
    }
}

/// Both badges are independent and may appear together
pub fn privacy_badges(ride: &Ride) -> Vec<PrivacyBadge> {
    let mut badges = Vec::new();
    if ride.invite_only {
        badges.push(PrivacyBadge::InviteOnly);
    }
    if ride.women_only {
        badges.push(PrivacyBadge::WomenOnly);
    }
    badges
}

/// Who is hosting, resolved from the best available source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostView {
    pub name: String,
    pub avatar: Option<String>,
    pub level: String,
}

impl HostView {
    /// The participant flagged as creator wins, then the ride's own creator
    /// fields, then placeholders. Resolved per field.
    pub fn resolve(ride: &Ride, host: Option<&Participant>) -> Self {
        let name = non_empty(host.and_then(|h| h.name.as_deref()))
            .or_else(|| non_empty(ride.creator_name.as_deref()))
            .unwrap_or(ANONYMOUS_NAME)
            .to_string();

        let avatar = non_empty(host.and_then(|h| h.avatar.as_deref()))
            .or_else(|| non_empty(ride.creator_avatar.as_deref()))
            .map(str::to_string);

        let level = format_optional(host.and_then(|h| h.level.as_deref()), DEFAULT_LEVEL);

        Self {
            name,
            avatar,
            level,
        }
    }

    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// One non-host rider in the participant list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub user_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub level: String,
}

impl From<&Participant> for ParticipantRow {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.user_id.clone(),
            name: format_optional(p.name.as_deref(), ANONYMOUS_NAME),
            avatar: non_empty(p.avatar.as_deref()).map(str::to_string),
            level: format_optional(p.level.as_deref(), DEFAULT_LEVEL),
        }
    }
}

/// Split participants into the host and everyone else.
/// "Everyone else" keeps the original order.
pub fn partition_participants(participants: &[Participant]) -> (Option<&Participant>, Vec<&Participant>) {
    let host = participants.iter().find(|p| p.is_creator);
    let others = participants.iter().filter(|p| !p.is_creator).collect();
    (host, others)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CafeStop {
    pub name: String,
    /// Known only when the service sent both coordinates
    pub location: Option<Coordinate>,
}

/// Deep link into the native app for a ride
pub fn deep_link(scheme: &str, ride_id: &str) -> String {
    format!("{}://ride/{}", scheme, ride_id)
}

/// Inputs the builder needs besides the ride itself
#[derive(Debug, Clone)]
pub struct BuildContext<Tz: TimeZone> {
    pub now: DateTime<Utc>,
    /// Zone the date and time labels are shown in
    pub tz: Tz,
    pub deep_link_scheme: String,
}

impl<Tz: TimeZone> BuildContext<Tz> {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now,
            tz,
            deep_link_scheme: DEFAULT_DEEP_LINK_SCHEME.to_string(),
        }
    }
}

/// Everything the ride page shows, derived once from the fetched entities.
#[derive(Debug, Clone, PartialEq)]
pub struct RideDetailView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub ride_type: String,
    pub type_color: TypeColor,
    pub date_label: String,
    pub time_label: String,
    pub countdown: Option<String>,
    pub distance_label: String,
    /// "{min}-{max}", km/h
    pub pace_label: String,
    /// "{current}/{max}"
    pub riders_label: String,
    /// Present only while the ride has room
    pub spots_left: Option<u32>,
    pub badges: Vec<PrivacyBadge>,
    pub meeting_point: String,
    pub cafe: Option<CafeStop>,
    pub host: HostView,
    pub participants: Vec<ParticipantRow>,
    pub deep_link: String,
}

impl RideDetailView {
    /// Derive the page model. Never fails: rides that break their own
    /// invariants (overbooked, inverted pace range) still get a view.
    pub fn build<Tz>(ride: &Ride, participants: &[Participant], ctx: &BuildContext<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (host, others) = partition_participants(participants);

        let spots_left = (ride.current_participants < ride.max_participants)
            .then(|| ride.max_participants - ride.current_participants);

        let cafe = ride.has_cafe.then(|| CafeStop {
            name: format_optional(ride.cafe_name.as_deref(), DEFAULT_CAFE_NAME),
            location: ride.cafe(),
        });

        Self {
            id: ride.id.clone(),
            title: ride.title.clone(),
            description: non_empty(ride.description.as_deref()).map(str::to_string),
            ride_type: ride.ride_type.to_string(),
            type_color: TypeColor::for_ride_type(&ride.ride_type),
            date_label: format_ride_date(ride.start_time, &ctx.tz),
            time_label: format_ride_time(ride.start_time, &ctx.tz),
            countdown: format_countdown(ride.start_time, ctx.now),
            distance_label: format_distance(ride.distance),
            pace_label: format!("{}-{}", ride.pace_min, ride.pace_max),
            riders_label: format!("{}/{}", ride.current_participants, ride.max_participants),
            spots_left,
            badges: privacy_badges(ride),
            meeting_point: format_coordinate(ride.start_lat, ride.start_lng),
            cafe,
            host: HostView::resolve(ride, host),
            participants: others.into_iter().map(ParticipantRow::from).collect(),
            deep_link: deep_link(&ctx.deep_link_scheme, &ride.id),
        }
    }
}

/// What the ride page is showing
#[derive(Debug, Clone, PartialEq)]
pub enum RidePage {
    Loading,
    /// The ride failed to load or does not exist
    NotFound,
    Ready(Box<RideDetailView>),
}

impl RidePage {
    /// Combine the two queries behind the page.
    ///
    /// A ride error of any kind shows the not-found state. Participants never
    /// block the page: while loading or after an error they count as empty.
    pub fn resolve<Tz>(
        ride: &QueryState<Ride>,
        participants: &QueryState<Vec<Participant>>,
        ctx: &BuildContext<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match ride {
            QueryState::Loading => RidePage::Loading,
            QueryState::Error(_) => RidePage::NotFound,
            QueryState::Success(ride) => {
                let participants = participants.data().map(|p| p.as_slice()).unwrap_or(&[]);
                RidePage::Ready(Box::new(RideDetailView::build(ride, participants, ctx)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::RideStatus;
    use chrono::Duration;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn ride() -> Ride {
        Ride {
            id: "ride-1".to_string(),
            creator_id: "user-1".to_string(),
            creator_name: Some("Creator Sam".to_string()),
            creator_avatar: Some("https://cdn.example/sam.png".to_string()),
            title: "Saturday Bayside".to_string(),
            description: Some("Coffee at the end".to_string()),
            ride_type: RideType::Social,
            start_time: now() + Duration::hours(3),
            pace_min: 25.0,
            pace_max: 30.0,
            max_participants: 12,
            current_participants: 4,
            invite_only: false,
            women_only: false,
            route_id: None,
            route: None,
            distance: 42000.0,
            start_lat: -37.8,
            start_lng: 144.9,
            has_cafe: false,
            cafe_lat: None,
            cafe_lng: None,
            cafe_name: None,
            community_id: None,
            status: RideStatus::Upcoming,
            is_joined: None,
            is_creator: None,
            created_at: None,
        }
    }

    fn participant(id: &str, name: Option<&str>, is_creator: bool) -> Participant {
        Participant {
            user_id: id.to_string(),
            name: name.map(str::to_string),
            avatar: None,
            level: None,
            joined_at: None,
            is_creator,
        }
    }

    fn ctx() -> BuildContext<Utc> {
        BuildContext::new(now(), Utc)
    }

    #[test]
    fn test_type_color_is_total() {
        let colors = [
            TypeColor::for_ride_type(&RideType::Social),
            TypeColor::for_ride_type(&RideType::Training),
            TypeColor::for_ride_type(&RideType::Chill),
            TypeColor::for_ride_type(&RideType::Fast),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
            assert_ne!(*a, TypeColor::Neutral);
        }
        assert_eq!(
            TypeColor::for_ride_type(&RideType::Other("Gravel".into())),
            TypeColor::Neutral
        );
        assert_eq!(TypeColor::Neutral.css_class(), "bg-gray-500");
    }

    #[test]
    fn test_host_participant_beats_ride_creator() {
        let ride = ride();
        let participants = vec![
            participant("u2", Some("Alex"), false),
            participant("u1", Some("Host Sam"), true),
        ];
        let view = RideDetailView::build(&ride, &participants, &ctx());
        assert_eq!(view.host.name, "Host Sam");
        // Participant has no avatar, so the ride's creator avatar fills in
        assert_eq!(view.host.avatar.as_deref(), Some("https://cdn.example/sam.png"));
        assert_eq!(view.host.level, "Cyclist");
    }

    #[test]
    fn test_host_falls_back_to_ride_then_placeholder() {
        let mut ride = ride();
        let host = HostView::resolve(&ride, None);
        assert_eq!(host.name, "Creator Sam");

        ride.creator_name = Some(String::new());
        ride.creator_avatar = None;
        let host = HostView::resolve(&ride, Some(&participant("u1", None, true)));
        assert_eq!(host.name, "Anonymous");
        assert_eq!(host.avatar, None);
        assert_eq!(host.level, "Cyclist");
        assert_eq!(host.initials(), "A");
    }

    #[test]
    fn test_partition_preserves_order() {
        let participants = vec![
            participant("a", Some("A"), false),
            participant("h", Some("H"), true),
            participant("b", None, false),
            participant("c", Some("C"), false),
        ];
        let (host, others) = partition_participants(&participants);
        assert_eq!(host.map(|h| h.user_id.as_str()), Some("h"));
        let ids: Vec<&str> = others.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let view = RideDetailView::build(&ride(), &participants, &ctx());
        assert_eq!(view.participants[1].name, "Anonymous");
        assert_eq!(view.participants.len(), 3);
    }

    #[test]
    fn test_privacy_badges_independent() {
        let mut ride = ride();
        assert!(privacy_badges(&ride).is_empty());
        ride.women_only = true;
        assert_eq!(privacy_badges(&ride), vec![PrivacyBadge::WomenOnly]);
        ride.invite_only = true;
        assert_eq!(
            privacy_badges(&ride),
            vec![PrivacyBadge::InviteOnly, PrivacyBadge::WomenOnly]
        );
    }

    #[test]
    fn test_build_labels() {
        let mut ride = ride();
        ride.has_cafe = true;
        ride.cafe_lat = Some(-37.9);
        ride.cafe_lng = Some(145.0);
        let view = RideDetailView::build(&ride, &[], &ctx());

        assert_eq!(view.distance_label, "42 km");
        assert_eq!(view.pace_label, "25-30");
        assert_eq!(view.riders_label, "4/12");
        assert_eq!(view.spots_left, Some(8));
        assert_eq!(view.meeting_point, "-37.8000, 144.9000");
        assert_eq!(view.countdown.as_deref(), Some("Starts in 3 hours"));
        assert_eq!(view.deep_link, "cocycle://ride/ride-1");
        let cafe = view.cafe.expect("cafe stop");
        assert_eq!(cafe.name, "Café Stop");
        assert_eq!(cafe.location, Some(Coordinate::new(-37.9, 145.0)));
    }

    #[test]
    fn test_invariant_violations_still_render() {
        let mut ride = ride();
        ride.current_participants = 20;
        ride.max_participants = 10;
        ride.pace_min = 35.0;
        ride.pace_max = 20.0;
        ride.distance = -5.0;
        ride.start_time = now() - Duration::days(2);

        let view = RideDetailView::build(&ride, &[], &ctx());
        assert_eq!(view.riders_label, "20/10");
        assert_eq!(view.spots_left, None);
        assert_eq!(view.pace_label, "35-20");
        assert_eq!(view.countdown, None);
    }

    #[test]
    fn test_page_states() {
        let ctx = ctx();
        let no_participants: QueryState<Vec<Participant>> = QueryState::Loading;

        assert_eq!(
            RidePage::resolve(&QueryState::Loading, &no_participants, &ctx),
            RidePage::Loading
        );
        assert_eq!(
            RidePage::resolve(
                &QueryState::Error(ApiError::NotFound("ride".into())),
                &no_participants,
                &ctx
            ),
            RidePage::NotFound
        );
        assert_eq!(
            RidePage::resolve(
                &QueryState::Error(ApiError::Network("offline".into())),
                &no_participants,
                &ctx
            ),
            RidePage::NotFound
        );

        let failed_participants: QueryState<Vec<Participant>> =
            QueryState::Error(ApiError::Http {
                status: 500,
                message: "Request failed".into(),
            });
        match RidePage::resolve(&QueryState::Success(Arc::new(ride())), &failed_participants, &ctx) {
            RidePage::Ready(view) => {
                assert!(view.participants.is_empty());
                assert_eq!(view.host.name, "Creator Sam");
            }
            other => panic!("expected ready page, got {:?}", other),
        }
    }
}
