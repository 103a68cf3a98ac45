//! Pure calculation functions for thumbnail geometry.

/// Calculate thumbnail dimensions from aspect ratio and short edge size.
///
/// # Examples
/// ```
/// # use keyword_gallery::imaging::calculate_thumbnail_dimensions;
/// // Square 300px thumbnails
/// assert_eq!(calculate_thumbnail_dimensions((1, 1), 300), (300, 300));
///
/// // 16:9 landscape with short edge 180px → 320x180
/// assert_eq!(calculate_thumbnail_dimensions((16, 9), 180), (320, 180));
/// ```
pub fn calculate_thumbnail_dimensions(aspect: (u32, u32), short_edge: u32) -> (u32, u32) {
    let (aspect_w, aspect_h) = aspect;

    if aspect_w <= aspect_h {
        // Portrait or square: width is the short edge
        let w = short_edge;
        let h = (w as f64 * aspect_h as f64 / aspect_w as f64).round() as u32;
        (w, h)
    } else {
        // Landscape: height is the short edge
        let h = short_edge;
        let w = (h as f64 * aspect_w as f64 / aspect_h as f64).round() as u32;
        (w, h)
    }
}
