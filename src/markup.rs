//! Icon markup for document heads and syndication feeds.

use crate::state::data::SiteIcon;

/// Favicon size used in `<link rel="icon">` and both feed formats
pub const FAVICON_SIZE: u32 = 32;
/// Home screen icon size
pub const TOUCH_ICON_SIZE: u32 = 180;
/// Start screen tile size
pub const TILE_SIZE: u32 = 270;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<link>`/`<meta>` tags for the document head
pub fn head_tags(icon: &SiteIcon) -> Vec<String> {
    vec![
        format!(
            r#"<link rel="icon" href="{}" sizes="{size}x{size}" />"#,
            escape(icon.url_for_size(FAVICON_SIZE)),
            size = FAVICON_SIZE
        ),
        format!(
            r#"<link rel="apple-touch-icon-precomposed" href="{}">"#,
            escape(icon.url_for_size(TOUCH_ICON_SIZE))
        ),
        format!(
            r#"<meta name="msapplication-TileImage" content="{}">"#,
            escape(icon.url_for_size(TILE_SIZE))
        ),
    ]
}

/// `<img>` tag for the icon at `size`, as shown on the settings page
pub fn img_tag(icon: &SiteIcon, size: u32, alt: Option<&str>) -> String {
    let alt = alt.filter(|a| !a.is_empty()).unwrap_or("Site Icon");
    format!(
        "<img alt='{}' src='{}' class='avatar avatar-{size}' height='{size}' width='{size}' />",
        escape(alt),
        escape(icon.url_for_size(size)),
        size = size
    )
}

/// RSS 2.0 channel `<image>` block
pub fn rss2_image(icon: &SiteIcon, title: &str, link: &str) -> String {
    format!(
        "<image>\n\t<url>{}</url>\n\t<title>{}</title>\n\t<link>{}</link>\n\t<width>{size}</width>\n\t<height>{size}</height>\n</image>",
        escape(icon.url_for_size(FAVICON_SIZE)),
        escape(title),
        escape(link),
        size = FAVICON_SIZE
    )
}

/// Atom feed `<icon>` element
pub fn atom_icon(icon: &SiteIcon) -> String {
    format!("<icon>{}</icon>", escape(icon.url_for_size(FAVICON_SIZE)))
}
