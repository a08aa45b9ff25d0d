//! Server-rendered HTML for the three pages of the site.
//!
//! Markup is deliberately plain. Every piece of user- or catalog-supplied text
//! goes through [`escape_html`] before it lands in a page.

use std::fmt::Write as _;

use crate::catalog::{SearchItem, VideoMeta};
use crate::display::{format_published, format_views};
use crate::identity::UserId;
use crate::player::{MountPoint, SLIDER_STEPS, TransportView, WidgetConfig};

pub const SITE_TITLE: &str = "Locked YouTube";
pub const PLAYER_MOUNT_ID: &str = "player-container";

/// What the home page shows under the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NotSearched,
    Results(Vec<SearchItem>),
    Failed(String),
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// `/home`, or `/home?search=...` when a query should be restored.
pub fn home_link(search: &str) -> String {
    let search = search.trim();
    if search.is_empty() {
        "/home".to_string()
    } else {
        format!("/home?search={}", urlencoding::encode(search))
    }
}

pub fn player_link(id: &str, search: &str) -> String {
    let mut link = format!("/player/{}", urlencoding::encode(id));
    let search = search.trim();
    if !search.is_empty() {
        let _ = write!(link, "?search={}", urlencoding::encode(search));
    }
    link
}

pub fn sign_in_page() -> String {
    let body = "<main>\n<header>\n<h1>Locked YouTube Browser</h1>\n\
        <p>Enter your numeric User ID to continue.</p>\n</header>\n\
        <form method=\"post\" action=\"/\">\n\
        <label for=\"uid\">User ID</label>\n\
        <input id=\"uid\" name=\"uid\" inputmode=\"numeric\" pattern=\"\\d*\" placeholder=\"e.g. 123456\" required>\n\
        <button type=\"submit\">Sign in</button>\n\
        <p>Only numeric IDs are accepted.</p>\n</form>\n\
        <p>After signing in, you'll be redirected to <a href=\"/home\">the home page</a>.</p>\n</main>";
    layout("Sign in", body)
}

pub fn home_page(uid: &UserId, query: &str, outcome: &SearchOutcome) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<aside>\n<nav><a href=\"/home\">Home</a></nav>\n\
         <p>Signed in as <strong>{}</strong></p>\n\
         <form method=\"post\" action=\"/signout\"><button type=\"submit\">Sign out</button></form>\n</aside>\n",
        escape_html(uid.as_str())
    );
    let _ = write!(
        body,
        "<header>\n<div>{SITE_TITLE}</div>\n\
         <form method=\"get\" action=\"/home\">\n\
         <input name=\"search\" value=\"{}\" placeholder=\"Search\" aria-label=\"Search\">\n\
         <button type=\"submit\">Search</button>\n</form>\n</header>\n<main>\n",
        escape_html(query)
    );

    match outcome {
        SearchOutcome::Failed(message) => {
            let _ = writeln!(body, "<div class=\"error\" role=\"alert\">{}</div>", escape_html(message));
        }
        SearchOutcome::Results(items) if !items.is_empty() => {
            body.push_str("<ul class=\"results\">\n");
            for item in items {
                let _ = writeln!(
                    body,
                    "<li><a href=\"{}\" aria-label=\"Open {}\">\
                     <img src=\"{}\" alt=\"\" loading=\"lazy\">\
                     <h3>{}</h3><p>{}</p></a></li>",
                    escape_html(&player_link(&item.id, query)),
                    escape_html(&item.title),
                    escape_html(&item.thumbnail),
                    escape_html(&item.title),
                    escape_html(&item.channel_title),
                );
            }
            body.push_str("</ul>\n");
        }
        SearchOutcome::Results(_) | SearchOutcome::NotSearched => {
            body.push_str("<div class=\"empty\">Try a search to see results.</div>\n");
        }
    }
    body.push_str("</main>");
    layout(SITE_TITLE, &body)
}

/// Embed URL for `content_id` with the control surface's widget settings.
pub fn embed_src(content_id: &str, config: &WidgetConfig, origin: &str) -> String {
    let query = config
        .player_vars(origin)
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}/embed/{}?{query}",
        config.host,
        urlencoding::encode(content_id)
    )
}

/// Custom transport chrome for one frame of `view`.
///
/// Each control names the adapter operation it drives in `data-action`.
pub fn transport_controls(view: &TransportView) -> String {
    let mut out = String::from("<div class=\"controls\">\n");
    let _ = writeln!(
        out,
        "<div class=\"seek\">\
         <span class=\"time\">{elapsed}</span>\
         <input type=\"range\" data-action=\"seek\" min=\"0\" max=\"{SLIDER_STEPS}\" step=\"1\" \
         value=\"{permille}\" aria-label=\"Seek\">\
         <span class=\"time\">{duration}</span></div>",
        elapsed = escape_html(&view.elapsed_label),
        permille = view.slider_permille,
        duration = escape_html(&view.duration_label),
    );
    let _ = writeln!(
        out,
        "<div class=\"buttons\">\
         <button type=\"button\" data-action=\"toggle-play\">{play}</button>\
         <button type=\"button\" data-action=\"toggle-mute\">{mute}</button>\
         <input type=\"range\" data-action=\"volume\" min=\"0\" max=\"100\" step=\"1\" \
         value=\"{volume}\" aria-label=\"Volume\">\
         <span class=\"volume-value\">{volume}</span>\
         <button type=\"button\" data-action=\"toggle-fullscreen\">{fullscreen}</button>\
         </div>",
        play = if view.playing { "Pause" } else { "Play" },
        mute = if view.muted { "Unmute" } else { "Mute" },
        volume = view.volume,
        fullscreen = if view.fullscreen { "Exit Fullscreen" } else { "Fullscreen" },
    );
    if !view.ready {
        out.push_str("<span class=\"loading\">Loading player…</span>\n");
    }
    out.push_str("</div>");
    out
}

/// One line such as `1,234 views • Mar 5, 2024`, skipping missing parts.
pub fn meta_line(meta: Option<&VideoMeta>) -> String {
    let Some(meta) = meta else {
        return String::new();
    };
    [
        format_views(meta.view_count.as_deref()),
        format_published(meta.published_at.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" • ")
}

pub fn player_page(
    uid: &UserId,
    id: &str,
    search: &str,
    meta: Option<&VideoMeta>,
    origin: &str,
) -> String {
    let fallback_title = format!("Video {id}");
    let title = meta
        .map(|meta| meta.title.as_str())
        .filter(|title| !title.is_empty())
        .unwrap_or(&fallback_title);
    let channel = meta
        .map(|meta| meta.channel_title.as_str())
        .filter(|channel| !channel.is_empty())
        .unwrap_or("Unknown channel");
    let mount = MountPoint::new(PLAYER_MOUNT_ID);
    let src = embed_src(id, &WidgetConfig::embedded(), origin);

    let body = format!(
        "<header>\n<a href=\"{back}\">&larr; Back to search</a>\n\
         <div>Signed in as {uid}</div>\n</header>\n\
         <main>\n<section>\n\
         <div id=\"{mount}\" data-video-id=\"{id_attr}\">\n\
         <iframe src=\"{src}\" title=\"{title}\" allow=\"autoplay; fullscreen\" allowfullscreen></iframe>\n\
         <div class=\"click-blocker\" aria-hidden=\"true\"></div>\n\
         {controls}\n\
         </div>\n\
         <h1>{title}</h1>\n<div class=\"meta\">{meta}</div>\n<div class=\"channel\">{channel}</div>\n\
         </section>\n</main>",
        back = escape_html(&home_link(search)),
        uid = escape_html(uid.as_str()),
        mount = escape_html(&mount.0),
        id_attr = escape_html(id),
        src = escape_html(&src),
        controls = transport_controls(&TransportView::loading(id)),
        title = escape_html(title),
        meta = escape_html(&meta_line(meta)),
        channel = escape_html(channel),
    );
    layout(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        UserId::parse("123").unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn links_keep_the_search() {
        assert_eq!(home_link("  "), "/home");
        assert_eq!(home_link("cats & dogs"), "/home?search=cats%20%26%20dogs");
        assert_eq!(player_link("abc", ""), "/player/abc");
        assert_eq!(player_link("abc", "lofi"), "/player/abc?search=lofi");
    }

    #[test]
    fn home_lists_results_escaped() {
        let outcome = SearchOutcome::Results(vec![SearchItem {
            id: "v1".into(),
            title: "<script>".into(),
            channel_title: "Chan".into(),
            thumbnail: "https://i/x.jpg".into(),
        }]);
        let html = home_page(&uid(), "q", &outcome);
        assert!(html.contains("href=\"/player/v1?search=q\""));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Signed in as <strong>123</strong>"));
    }

    #[test]
    fn home_shows_error_and_empty_states() {
        let failed = home_page(&uid(), "q", &SearchOutcome::Failed("Search failed (500)".into()));
        assert!(failed.contains("role=\"alert\">Search failed (500)</div>"));
        let empty = home_page(&uid(), "", &SearchOutcome::NotSearched);
        assert!(empty.contains("Try a search to see results."));
    }

    #[test]
    fn embed_src_carries_widget_settings() {
        let src = embed_src("abc", &WidgetConfig::embedded(), "https://site.test");
        assert!(src.starts_with("https://www.youtube-nocookie.com/embed/abc?"));
        assert!(src.contains("autoplay=0"));
        assert!(src.contains("controls=0"));
        assert!(src.contains("origin=https%3A%2F%2Fsite.test"));
    }

    #[test]
    fn player_page_uses_meta_or_fallbacks() {
        let meta = VideoMeta {
            title: "Talk".into(),
            channel_title: "Conf".into(),
            view_count: Some("1234".into()),
            published_at: Some("2024-03-05T17:00:00Z".into()),
        };
        let html = player_page(&uid(), "abc", "rust", Some(&meta), "https://site.test");
        assert!(html.contains("<h1>Talk</h1>"));
        assert!(html.contains("1,234 views • Mar 5, 2024"));
        assert!(html.contains("href=\"/home?search=rust\""));
        assert!(html.contains("id=\"player-container\""));
        assert!(html.contains("class=\"click-blocker\""));
        assert!(html.contains("data-action=\"toggle-play\""));

        let bare = player_page(&uid(), "abc", "", None, "https://site.test");
        assert!(bare.contains("<h1>Video abc</h1>"));
        assert!(bare.contains("Unknown channel"));
        assert!(bare.contains("href=\"/home\""));
    }

    #[test]
    fn controls_follow_the_view() {
        let html = transport_controls(&TransportView::loading("abc"));
        assert!(html.contains("data-action=\"seek\" min=\"0\" max=\"1000\""));
        assert!(html.contains(">Play</button>"));
        assert!(html.contains(">Mute</button>"));
        assert!(html.contains("<span class=\"volume-value\">100</span>"));
        assert!(html.contains(">Fullscreen</button>"));
        assert!(html.contains("Loading player…"));

        let view = TransportView {
            ready: true,
            playing: true,
            muted: true,
            fullscreen: true,
            slider_permille: 250,
            elapsed_label: "0:50".into(),
            duration_label: "3:20".into(),
            ..TransportView::loading("abc")
        };
        let html = transport_controls(&view);
        assert!(html.contains("value=\"250\" aria-label=\"Seek\""));
        assert!(html.contains("<span class=\"time\">0:50</span>"));
        assert!(html.contains("<span class=\"time\">3:20</span>"));
        assert!(html.contains(">Pause</button>"));
        assert!(html.contains(">Unmute</button>"));
        assert!(html.contains(">Exit Fullscreen</button>"));
        assert!(!html.contains("Loading player"));
    }

    #[test]
    fn home_signs_out_through_the_form_route() {
        let html = home_page(&uid(), "", &SearchOutcome::NotSearched);
        assert!(html.contains("action=\"/signout\""));
    }

    #[test]
    fn meta_line_skips_missing_parts() {
        let meta = VideoMeta {
            title: String::new(),
            channel_title: String::new(),
            view_count: None,
            published_at: Some("2024-03-05T17:00:00Z".into()),
        };
        assert_eq!(meta_line(Some(&meta)), "Mar 5, 2024");
        assert_eq!(meta_line(None), "");
    }
}
