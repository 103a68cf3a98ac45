//! Caption text shown under a photo on its detail page.

use crate::types::Photo;

const SEPARATOR: &str = ", ";

/// Join city, state and date, in that order, skipping fields that are
/// absent or blank. A photo with none of them gets an empty caption.
pub fn compose_caption(photo: &Photo) -> String {
    let meta = &photo.metadata;
    [&meta.city, &meta.state, &meta.date]
        .into_iter()
        .filter_map(|field| field.as_deref().map(str::trim))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
