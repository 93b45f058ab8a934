use std::collections::HashSet;

use tracing::{debug, warn};

use crate::artwork::Artwork;

/// Enforces slug and id uniqueness over a freshly fetched collection.
///
/// Source order is preserved. When two records share a slug or an id the
/// first one wins and the later one is dropped.
pub fn normalize(artworks: Vec<Artwork>) -> Vec<Artwork> {
    let total = artworks.len();
    let mut slugs = HashSet::with_capacity(total);
    let mut ids = HashSet::with_capacity(total);

    let kept: Vec<Artwork> = artworks
        .into_iter()
        .filter(|artwork| {
            if !ids.insert(artwork.id.clone()) {
                warn!("dropping artwork with duplicate id '{}'", artwork.id);
                return false;
            }
            if !slugs.insert(artwork.slug.clone()) {
                warn!(
                    "dropping artwork '{}' with duplicate slug '{}'",
                    artwork.id, artwork.slug
                );
                return false;
            }
            true
        })
        .collect();

    debug!("normalized artworks (kept: {}, dropped: {})", kept.len(), total - kept.len());
    kept
}

/// Lowercases and joins alphanumeric runs with single dashes.
///
/// Non-ASCII letters are kept as-is since titles are frequently Korean.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}
