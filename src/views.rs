use core::fmt::Write;

use regex::Regex;
use reqwest::Url;

use crate::entities::{Bookmark, Category, Post, PostStatus, StoredFile, UserProfile};
use crate::routes::{Decision, Route};
use crate::session::GuardState;

const EXCERPT_LEN: usize = 80;

::lazy_static::lazy_static! {
    static ref BLOCK_END: Regex = Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|blockquote|pre)>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// editor html as terminal text; block ends become line breaks.
pub fn plain_text(html: &str) -> String {
    let broken = BLOCK_END.replace_all(html, "\n");
    let stripped = TAG.replace_all(&broken, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    BLANK_LINES
        .replace_all(decoded.trim(), "\n\n")
        .into_owned()
}

fn excerpt(html: &str) -> String {
    let text = plain_text(html).split_whitespace().collect::<Vec<_>>().join(" ");

    match text.char_indices().nth(EXCERPT_LEN) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text,
    }
}

pub fn profile(p: &UserProfile) -> String {
    let mut s = String::new();

    let _ = writeln!(s, "{} {}", p.full_name, handle(p));
    let _ = writeln!(s, "  id       : {}", p.user_id);
    let _ = writeln!(
        s,
        "  email    : {}{}",
        p.email,
        match p.email_verified {
            true => "",
            false => " (unverified)",
        }
    );
    let _ = writeln!(s, "  provider : {}", p.provider);
    if let Some(a) = &p.avatar_url {
        let _ = writeln!(s, "  avatar   : {}", a);
    }
    let _ = write!(s, "  joined   : {}", p.created_at.format("%Y-%m-%d"));

    s
}

pub fn post(p: &Post, image: Option<&Url>) -> String {
    let mut s = String::new();

    let _ = writeln!(s, "# {}", p.title);
    let _ = writeln!(
        s,
        "  {} | /{} | by {} | {}{}",
        p.id,
        p.slug,
        p.user_id,
        p.created_at.format("%Y-%m-%d %H:%M"),
        match p.status {
            PostStatus::Active => "",
            PostStatus::Inactive => " | inactive",
        }
    );
    if let Some(c) = &p.category {
        let _ = writeln!(s, "  category: {}", c);
    }
    if let Some(u) = image {
        let _ = writeln!(s, "  image: {}", u);
    }
    let _ = write!(s, "\n{}", plain_text(&p.content));

    s
}

pub fn post_line(n: u32, p: &Post) -> String {
    format!(
        "{:>3}. {} [{}]{}\n     {}",
        n,
        p.title,
        p.id,
        match p.status {
            PostStatus::Active => "",
            PostStatus::Inactive => " (inactive)",
        },
        excerpt(&p.content)
    )
}

pub fn bookmark_line(n: u32, b: &Bookmark) -> String {
    format!(
        "{:>3}. post {} (since {})",
        n,
        b.post_id,
        b.created_at.format("%Y-%m-%d")
    )
}

pub fn category(c: &Category) -> String { format!("{} ({}) [{}]", c.name, c.slug, c.id) }

pub fn stored_file(f: &StoredFile, preview: &Url) -> String {
    format!(
        "{} [{}] {} {} bytes\n  preview: {}",
        f.name, f.id, f.mime_type, f.size, preview
    )
}

/// `page 2 (11..=20 of 34)`
pub fn page_footer(page: u32, page_size: u32, shown: usize, total: u64) -> String {
    match shown {
        0 => format!("page {} (nothing here, {} in total)", page, total),
        n => {
            let first = u64::from(page.saturating_sub(1)) * u64::from(page_size) + 1;
            format!(
                "page {} ({}..={} of {})",
                page,
                first,
                first + n as u64 - 1,
                total
            )
        },
    }
}

/// `(@name)`, or a hint when the profile document is not written yet.
fn handle(u: &UserProfile) -> String {
    match u.username.is_empty() {
        true => "(no profile yet)".to_string(),
        false => format!("(@{})", u.username),
    }
}

pub fn guard_state(state: GuardState, user: Option<&UserProfile>) -> String {
    match (state, user) {
        (GuardState::Authenticated, Some(u)) => format!("signed in as {} {}", u.email, handle(u)),
        (GuardState::AuthenticatedUnverified, Some(u)) =>
            format!("signed in as {} {}, email not verified", u.email, handle(u)),
        (GuardState::Unauthenticated, _) => "signed out".to_string(),
        (s, _) => format!("{:?}", s).to_lowercase(),
    }
}

pub fn decision(route: &Route, d: &Decision) -> String {
    match d {
        Decision::Render => format!("{} -> render", route),
        Decision::Redirect(to) => format!("{} -> redirect to {}", route, to),
        Decision::Loading => format!("{} -> loading", route),
    }
}

pub fn countdown(n: u32) -> String { format!("redirecting to / in {}...", n) }

pub fn redirect(to: &Route) -> String { format!("-> {}", to) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_becomes_paragraphs() {
        let html = "<h1>Title</h1><p>Hello &amp; <b>welcome</b>.</p><p>Second<br/>line</p>";

        assert_eq!(plain_text(html), "Title\nHello & welcome.\nSecond\nline");
    }

    #[test]
    fn excerpt_is_cut_on_chars() {
        let long = format!("<p>{}</p>", "é".repeat(100));

        let e = excerpt(&long);

        assert_eq!(e.chars().count(), EXCERPT_LEN + 3);
        assert!(e.ends_with("..."));
    }

    #[test]
    fn footer_counts_from_page_start() {
        assert_eq!(page_footer(2, 10, 10, 34), "page 2 (11..=20 of 34)");
        assert_eq!(page_footer(4, 10, 4, 34), "page 4 (31..=34 of 34)");
        assert_eq!(page_footer(9, 10, 0, 34), "page 9 (nothing here, 34 in total)");
    }

    #[test]
    fn unwritten_profile_has_no_handle() {
        let mut u = UserProfile {
            user_id: "u1".into(),
            username: String::new(),
            full_name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            email_verified: true,
            avatar_url: None,
            provider: crate::entities::Provider::Github,
            created_at: ::chrono::Utc::now(),
        };

        assert_eq!(
            guard_state(GuardState::Authenticated, Some(&u)),
            "signed in as grace@example.com (no profile yet)"
        );

        u.username = "ghopper1906".to_string();
        assert_eq!(
            guard_state(GuardState::Authenticated, Some(&u)),
            "signed in as grace@example.com (@ghopper1906)"
        );
    }
}
