//! Finding journals: text search and the public feed.

use crate::model::Journal;

/// Journals whose title, description, city, or country contains `query`,
/// ignoring case. An empty query matches nothing.
pub fn search<'a>(journals: &'a [Journal], query: &str) -> Vec<&'a Journal> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    journals
        .iter()
        .filter(|j| {
            [
                Some(j.title.as_str()),
                Some(j.description.as_str()),
                j.city.as_deref(),
                j.country.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

/// Public journals by anyone other than `viewer`, newest first.
///
/// Journals with no owner are never in the feed.
pub fn feed<'a>(journals: &'a [Journal], viewer: Option<&str>) -> Vec<&'a Journal> {
    let mut feed: Vec<&Journal> = journals
        .iter()
        .filter(|j| j.public)
        .filter(|j| match (j.owner.as_deref(), viewer) {
            (None, _) => false,
            (Some(owner), Some(viewer)) => !owner.eq_ignore_ascii_case(viewer),
            (Some(_), None) => true,
        })
        .collect();
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use uuid::Uuid;

    fn journal(title: &str, owner: Option<&str>, public: bool, created: i64) -> Journal {
        Journal {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            city: Some("Kyoto".into()),
            country: Some("Japan".into()),
            owner: owner.map(String::from),
            cover_image: None,
            public,
            pinned: false,
            created_at: Timestamp::from_second(created).unwrap(),
            items: vec![],
        }
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let journals = [journal("Temples", None, false, 0), journal("Ramen", None, false, 0)];

        assert_eq!(search(&journals, "temp").len(), 1);
        assert_eq!(search(&journals, "KYOTO").len(), 2);
        assert_eq!(search(&journals, "japan").len(), 2);
        assert!(search(&journals, "lisbon").is_empty());
    }

    #[test]
    fn empty_search_matches_nothing() {
        let journals = [journal("Temples", None, false, 0)];
        assert!(search(&journals, "   ").is_empty());
    }

    #[test]
    fn feed_shows_others_public_journals_newest_first() {
        let journals = [
            journal("Mine", Some("ada"), true, 30),
            journal("Old", Some("grace"), true, 10),
            journal("Private", Some("grace"), false, 40),
            journal("New", Some("linus"), true, 20),
            journal("Anonymous", None, true, 50),
        ];

        let titles: Vec<&str> = feed(&journals, Some("Ada"))
            .iter()
            .map(|j| j.title.as_str())
            .collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn logged_out_feed_includes_every_owner() {
        let journals = [
            journal("Mine", Some("ada"), true, 30),
            journal("Old", Some("grace"), true, 10),
        ];

        assert_eq!(feed(&journals, None).len(), 2);
    }
}
