//! Attaches derived image URL maps to raw TMDB responses.
//!
//! Each resource has a table of [`Rule`]s. A rule names a location in the
//! document, the `*_path` field to read there and the sibling field to write.
//! Locations are dotted key paths from the root; a `[]` suffix fans out over
//! every element of an array and the empty location is the root itself.
//! Anything the rules do not name is left untouched, and locations missing
//! from the response are skipped.

use crate::images::ImageCategory::{Backdrop, Logo, Poster, Profile, Still};
use crate::images::{image_urls_value, ImageCategory};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Movie,
    Tv,
    Person,
    Company,
    Collection,
    MovieList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub at: &'static str,
    pub source: &'static str,
    pub target: &'static str,
    pub category: ImageCategory,
}

const fn rule(
    at: &'static str,
    source: &'static str,
    target: &'static str,
    category: ImageCategory,
) -> Rule {
    Rule {
        at,
        source,
        target,
        category,
    }
}

const MOVIE_RULES: &[Rule] = &[
    rule("", "poster_path", "poster_urls", Poster),
    rule("", "backdrop_path", "backdrop_urls", Backdrop),
    rule("belongs_to_collection", "poster_path", "poster_urls", Poster),
    rule("belongs_to_collection", "backdrop_path", "backdrop_urls", Backdrop),
    rule("production_companies[]", "logo_path", "logo_urls", Logo),
    rule("images.backdrops[]", "file_path", "urls", Backdrop),
    rule("images.logos[]", "file_path", "urls", Logo),
    rule("images.posters[]", "file_path", "urls", Poster),
    rule("credits.cast[]", "profile_path", "profile_urls", Profile),
    rule("credits.crew[]", "profile_path", "profile_urls", Profile),
];

// Season posters carry the logo size set, not the poster one.
const TV_RULES: &[Rule] = &[
    rule("", "poster_path", "poster_urls", Poster),
    rule("", "backdrop_path", "backdrop_urls", Backdrop),
    rule("created_by[]", "profile_path", "profile_urls", Profile),
    rule("production_companies[]", "logo_path", "logo_urls", Logo),
    rule("networks[]", "logo_path", "logo_urls", Logo),
    rule("seasons[]", "poster_path", "poster_urls", Logo),
    rule("images.backdrops[]", "file_path", "urls", Backdrop),
    rule("images.logos[]", "file_path", "urls", Logo),
    rule("images.posters[]", "file_path", "urls", Poster),
    rule("credits.cast[]", "profile_path", "profile_urls", Profile),
    rule("credits.crew[]", "profile_path", "profile_urls", Profile),
    rule("last_episode_to_air", "still_path", "still_urls", Still),
    rule("next_episode_to_air", "still_path", "still_urls", Still),
];

const PERSON_RULES: &[Rule] = &[
    rule("", "profile_path", "profile_urls", Profile),
    rule("combined_credits.cast[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("combined_credits.cast[]", "poster_path", "poster_urls", Poster),
    rule("combined_credits.crew[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("combined_credits.crew[]", "poster_path", "poster_urls", Poster),
    rule("movie_credits.cast[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("movie_credits.cast[]", "poster_path", "poster_urls", Poster),
    rule("movie_credits.crew[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("movie_credits.crew[]", "poster_path", "poster_urls", Poster),
    rule("tv_credits.cast[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("tv_credits.cast[]", "poster_path", "poster_urls", Poster),
    rule("tv_credits.crew[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("tv_credits.crew[]", "poster_path", "poster_urls", Poster),
    rule("images.profiles[]", "file_path", "urls", Profile),
];

const COMPANY_RULES: &[Rule] = &[rule("", "logo_path", "logo_urls", Logo)];

const COLLECTION_RULES: &[Rule] = &[
    rule("", "poster_path", "poster_urls", Poster),
    rule("", "backdrop_path", "backdrop_urls", Backdrop),
    rule("images.backdrops[]", "file_path", "urls", Backdrop),
    rule("images.posters[]", "file_path", "urls", Poster),
    rule("parts[]", "poster_path", "poster_urls", Poster),
    rule("parts[]", "backdrop_path", "backdrop_urls", Backdrop),
];

// List posters carry the backdrop size set.
const MOVIE_LIST_RULES: &[Rule] = &[
    rule("results[]", "backdrop_path", "backdrop_urls", Backdrop),
    rule("results[]", "poster_path", "poster_urls", Backdrop),
];

impl Resource {
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Resource::Movie => MOVIE_RULES,
            Resource::Tv => TV_RULES,
            Resource::Person => PERSON_RULES,
            Resource::Company => COMPANY_RULES,
            Resource::Collection => COLLECTION_RULES,
            Resource::MovieList => MOVIE_LIST_RULES,
        }
    }
}

/// Runs every rule registered for `resource` over `doc`.
pub fn enrich(resource: Resource, mut doc: Value) -> Value {
    for rule in resource.rules() {
        apply_rule(&mut doc, rule);
    }
    doc
}

pub fn apply_rule(doc: &mut Value, rule: &Rule) {
    let segments: Vec<&str> = if rule.at.is_empty() {
        Vec::new()
    } else {
        rule.at.split('.').collect()
    };
    for_each_object(doc, &segments, &mut |obj: &mut Map<String, Value>| {
        let urls = image_urls_value(obj.get(rule.source), rule.category);
        obj.insert(rule.target.to_string(), urls);
    });
}

fn for_each_object(
    value: &mut Value,
    segments: &[&str],
    f: &mut dyn FnMut(&mut Map<String, Value>),
) {
    let Some((head, rest)) = segments.split_first() else {
        if let Value::Object(obj) = value {
            f(obj);
        }
        return;
    };
    let (key, fan_out) = match head.strip_suffix("[]") {
        Some(key) => (key, true),
        None => (*head, false),
    };
    let Some(child) = value.get_mut(key) else {
        return;
    };
    if !fan_out {
        for_each_object(child, rest, f);
        return;
    }
    if let Value::Array(items) = child {
        for item in items {
            for_each_object(item, rest, f);
        }
    }
}
