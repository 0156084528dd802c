use std::fmt;

/// Hierarchical cache key, compared by value.
///
/// Segments run from the broadest family to the most specific parameter, so
/// a shorter key acts as a prefix that addresses every entry below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Extend this key by one segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Key factory for ride resources.
///
/// ```text
/// rides
/// ├── list
/// │   └── upcoming [lat=..] [lng=..] [radius=..]
/// └── detail
///     └── {id}
///         └── participants
/// ```
pub mod ride_keys {
    use super::QueryKey;
    use crate::api::UpcomingFilter;

    pub fn all() -> QueryKey {
        QueryKey::new(["rides"])
    }

    pub fn lists() -> QueryKey {
        all().child("list")
    }

    pub fn upcoming(filter: &UpcomingFilter) -> QueryKey {
        let mut key = lists().child("upcoming");
        for (name, value) in [("lat", filter.lat), ("lng", filter.lng), ("radius", filter.radius)] {
            if let Some(v) = value {
                key = key.child(format!("{}={}", name, v));
            }
        }
        key
    }

    pub fn details() -> QueryKey {
        all().child("detail")
    }

    pub fn detail(id: &str) -> QueryKey {
        details().child(id)
    }

    pub fn participants(id: &str) -> QueryKey {
        detail(id).child("participants")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UpcomingFilter;
    use std::collections::HashSet;

    #[test]
    fn test_equal_keys_built_separately_are_equal() {
        assert_eq!(ride_keys::detail("42"), ride_keys::detail("42"));
        assert_eq!(
            ride_keys::detail("42"),
            QueryKey::new(["rides", "detail", "42"])
        );

        let mut set = HashSet::new();
        set.insert(ride_keys::participants("42"));
        assert!(set.contains(&ride_keys::participants("42")));
    }

    #[test]
    fn test_distinct_resources_have_distinct_keys() {
        let keys = [
            ride_keys::detail("42"),
            ride_keys::participants("42"),
            ride_keys::detail("43"),
            ride_keys::upcoming(&UpcomingFilter::default()),
            ride_keys::upcoming(&UpcomingFilter::near(-37.8, 144.9, 10.0)),
            ride_keys::upcoming(&UpcomingFilter::near(-37.8, 144.9, 20.0)),
            ride_keys::upcoming(&UpcomingFilter {
                lat: Some(-37.8),
                ..Default::default()
            }),
            ride_keys::upcoming(&UpcomingFilter {
                lng: Some(-37.8),
                ..Default::default()
            }),
        ];
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_participants_key_is_under_detail_prefix() {
        let participants = ride_keys::participants("42");
        assert!(participants.starts_with(&ride_keys::detail("42")));
        assert!(participants.starts_with(&ride_keys::all()));
        assert!(!participants.starts_with(&ride_keys::detail("4")));
        assert!(!ride_keys::upcoming(&UpcomingFilter::default()).starts_with(&ride_keys::details()));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ride_keys::upcoming(&UpcomingFilter::near(1.5, 2.0, 5.0)).to_string(),
            "rides/list/upcoming/lat=1.5/lng=2/radius=5"
        );
    }
}
