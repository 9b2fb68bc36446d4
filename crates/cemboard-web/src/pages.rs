//! Server-rendered pages of the public site
//!
//! Every renderer takes a loaded view controller and returns the full page.

use crate::html::{encode_query, escape, layout};
use cemboard_core::calendar;
use cemboard_core::config::SiteConfig;
use cemboard_core::models::Notice;
use cemboard_core::stats::CemeteryStats;
use cemboard_core::views::detail::NOT_FOUND;
use cemboard_core::views::finder::{FINDER_STEP, NO_RESULTS};
use cemboard_core::views::grave_grid::{AVAILABLE_MESSAGE, GRID_STEP};
use cemboard_core::views::notices::NOTICE_NOT_FOUND;
use cemboard_core::views::{GraveDetail, GraveFinder, GraveGrid, NoticeBoard, NoticeDetail};
use cemboard_core::LoadState;

const UNAVAILABLE: &str = "Records are unavailable right now. Please try again later.";

fn unavailable(site: &SiteConfig, title: &str) -> String {
    layout(
        site,
        title,
        &format!(r#"<h2>{}</h2><p class="muted">{}</p>"#, escape(title), UNAVAILABLE),
    )
}

fn notice_card(notice: &Notice) -> String {
    let date = calendar::long_date(notice.date.as_deref())
        .unwrap_or_else(|| calendar::NO_DATE.to_string());
    let image = notice
        .image()
        .map(|src| format!(r#"<img src="{}" alt="">"#, escape(src)))
        .unwrap_or_default();
    format!(
        r#"<div class="card">{image}<h3><a href="/notice/{id}">{title}</a></h3><p class="muted">{kind} · {date}</p></div>"#,
        image = image,
        id = escape(&notice.id),
        title = escape(&notice.title),
        kind = notice.kind,
        date = escape(&date),
    )
}

// ===== Home =====

pub fn home(site: &SiteConfig, board: &NoticeBoard) -> String {
    let mut body = format!(
        r#"<h2>Welcome to {}</h2>
<p>Browse the grave map, find a loved one, or read the latest notices and events.</p>
<h2>Latest notices</h2>"#,
        escape(&site.name)
    );

    if board.state() == LoadState::Ready {
        if board.latest().is_empty() {
            body.push_str(r#"<p class="muted">No notices yet.</p>"#);
        } else {
            body.push_str(r#"<div class="cards">"#);
            body.extend(board.latest().iter().map(notice_card));
            body.push_str("</div>");
        }
        if board.has_more() {
            body.push_str(r#"<a class="more" href="/notices">See more</a>"#);
        }
    } else {
        body.push_str(&format!(r#"<p class="muted">{}</p>"#, UNAVAILABLE));
    }

    layout(site, "Home", &body)
}

// ===== Grave grid =====

/// Grave map with the "available" dialog when a free grave was clicked
pub fn graves(site: &SiteConfig, grid: &GraveGrid) -> String {
    if grid.state() != LoadState::Ready {
        return unavailable(site, "Graves");
    }

    let block = grid.filter().label().to_string();
    let mut body = format!(
        r#"<h2>Graves</h2>
<p>Total: {} · Used: {} · Available: {}</p>
<p class="blocks">"#,
        grid.total(),
        grid.used_count(),
        grid.available_count()
    );

    let mut labels = vec![cemboard_core::graves::ALL_BLOCKS.to_string()];
    labels.extend(grid.blocks());
    for label in &labels {
        let class = if *label == block { "active" } else { "" };
        body.push_str(&format!(
            r#"<a class="{}" href="/graves?block={}">{}</a>"#,
            class,
            encode_query(label),
            escape(label)
        ));
    }
    body.push_str("</p>");

    if let Some(grave) = grid.dialog() {
        body.push_str(&format!(
            r#"<div class="card"><strong>Grave {}</strong><p>{}</p></div>"#,
            escape(grave),
            AVAILABLE_MESSAGE
        ));
    }

    body.push_str(r#"<div class="grid">"#);
    let shown = grid.revealed();
    for cell in grid.visible_cells() {
        let (class, href) = match &cell.record_id {
            Some(id) => ("used", format!("/grave/{}", escape(id))),
            None => (
                "free",
                format!(
                    "/graves?block={}&show={}&grave={}",
                    encode_query(&block),
                    shown,
                    encode_query(&cell.grave)
                ),
            ),
        };
        body.push_str(&format!(
            r#"<a class="cell {}" href="{}">{}</a>"#,
            class,
            href,
            escape(&cell.grave)
        ));
    }
    body.push_str("</div>");

    if grid.has_more() {
        body.push_str(&format!(
            r#"<a class="more" href="/graves?block={}&show={}">View more</a>"#,
            encode_query(&block),
            shown + GRID_STEP
        ));
    }

    layout(site, "Graves", &body)
}

// ===== Finder =====

pub fn finder(site: &SiteConfig, finder: &GraveFinder) -> String {
    let query = finder.query();
    let mut body = format!(
        r#"<h2>Find a loved one</h2>
<form method="get" action="/find"><input name="q" value="{}" placeholder="Name or grave number"> <button type="submit">Search</button></form>"#,
        escape(query)
    );

    if finder.state() != LoadState::Ready {
        body.push_str(&format!(r#"<p class="muted">{}</p>"#, UNAVAILABLE));
        return layout(site, "Find a loved one", &body);
    }

    let cards = finder.cards();
    if cards.is_empty() {
        body.push_str(&format!(r#"<p class="muted">{}</p>"#, NO_RESULTS));
    } else {
        body.push_str(r#"<div class="cards">"#);
        for card in &cards {
            let image = card
                .image
                .as_deref()
                .map(|src| format!(r#"<img src="{}" alt="">"#, escape(src)))
                .unwrap_or_default();
            body.push_str(&format!(
                r#"<div class="card">{image}<h3><a href="{link}">{name}</a></h3><p>Grave: {grave}</p><p class="muted">{hijri}<br>{long}</p></div>"#,
                image = image,
                link = escape(&card.link),
                name = escape(&card.name),
                grave = escape(&card.grave),
                hijri = escape(&card.death_hijri),
                long = escape(&card.death_long),
            ));
        }
        body.push_str("</div>");
    }

    if finder.has_more() {
        body.push_str(&format!(
            r#"<a class="more" href="/find?q={}&show={}">View more</a>"#,
            encode_query(query),
            finder.revealed() + FINDER_STEP
        ));
    }

    layout(site, "Find a loved one", &body)
}

// ===== Grave detail =====

pub fn grave_detail(site: &SiteConfig, detail: &GraveDetail) -> String {
    if detail.state() == LoadState::Failed {
        return unavailable(site, "Grave");
    }
    let Some(p) = detail.profile() else {
        return layout(site, NOT_FOUND, &format!("<h2>{}</h2>", NOT_FOUND));
    };

    let rows = [
        ("Grave number", &p.grave),
        ("Born", &p.born),
        ("Died", &p.died),
        ("Died (Hijri)", &p.died_hijri),
        ("Age", &p.age),
        ("Gender", &p.gender),
        ("Native", &p.native),
        ("Address", &p.address),
        ("Place of death", &p.where_died),
        ("Father", &p.father),
        ("Mother", &p.mother),
        ("Guardian", &p.guardian),
        ("Created", &p.created),
        ("Updated", &p.updated),
    ];
    let table: String = rows
        .iter()
        .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>", label, escape(value)))
        .collect();
    let description = p
        .description
        .as_deref()
        .map(|d| format!("<p>{}</p>", escape(d)))
        .unwrap_or_default();

    let body = format!(
        r#"<h2>{name}</h2>
<div class="card"><img src="{image}" alt="{name}"><table>{table}</table>{description}</div>"#,
        name = escape(&p.name),
        image = escape(&p.image),
        table = table,
        description = description,
    );
    layout(site, &p.name, &body)
}

// ===== Notices =====

pub fn notices(site: &SiteConfig, board: &NoticeBoard) -> String {
    if board.state() != LoadState::Ready {
        return unavailable(site, "Notices");
    }
    let mut body = String::from("<h2>Notices &amp; events</h2>");
    if board.all().is_empty() {
        body.push_str(r#"<p class="muted">No notices yet.</p>"#);
    } else {
        body.push_str(r#"<div class="cards">"#);
        body.extend(board.all().iter().map(notice_card));
        body.push_str("</div>");
    }
    layout(site, "Notices", &body)
}

pub fn notice_detail(site: &SiteConfig, detail: &NoticeDetail) -> String {
    let Some(notice) = detail.notice() else {
        return layout(
            site,
            NOTICE_NOT_FOUND,
            &format!(r#"<h2>{}</h2><a href="/notices">Back to notices</a>"#, NOTICE_NOT_FOUND),
        );
    };

    let date = calendar::long_date(notice.date.as_deref())
        .unwrap_or_else(|| calendar::NO_DATE.to_string());
    let image = notice
        .image()
        .map(|src| format!(r#"<img src="{}" alt="">"#, escape(src)))
        .unwrap_or_default();
    let mut body = format!(
        r#"<div class="card">{image}<h2>{title}</h2><p class="muted">{kind} · {date}</p><p>{description}</p></div>"#,
        image = image,
        title = escape(&notice.title),
        kind = notice.kind,
        date = escape(&date),
        description = escape(&notice.description),
    );

    if !detail.others().is_empty() {
        body.push_str(r#"<h2 style="margin-top:2rem">More notices</h2><div class="cards">"#);
        body.extend(detail.others().iter().map(notice_card));
        body.push_str("</div>");
    }
    layout(site, &notice.title, &body)
}

// ===== Statistics =====

pub fn stats(site: &SiteConfig, stats: Option<&CemeteryStats>) -> String {
    let Some(stats) = stats else {
        return unavailable(site, "Statistics");
    };
    let ages: String = stats
        .ages
        .iter()
        .map(|a| format!("<tr><td>{}</td><td>{}</td></tr>", a.range, a.count))
        .collect();
    let body = format!(
        r#"<h2>Statistics</h2>
<table>
<tr><th>Total records</th><td>{total}</td></tr>
<tr><th>Native</th><td>{native}</td></tr>
<tr><th>Foreign</th><td>{foreign}</td></tr>
<tr><th>Male</th><td>{male}</td></tr>
<tr><th>Female</th><td>{female}</td></tr>
</table>
<h2 style="margin-top:2rem">Age distribution</h2>
<table><tr><th>Age</th><th>Records</th></tr>{ages}</table>"#,
        total = stats.total,
        native = stats.native,
        foreign = stats.foreign,
        male = stats.male,
        female = stats.female,
        ages = ages,
    );
    layout(site, "Statistics", &body)
}

// ===== Static pages =====

pub fn contact(site: &SiteConfig) -> String {
    let body = format!(
        r#"<h2>Contact</h2>
<div class="card">
<p><strong>Phone:</strong> {phone}</p>
<p><strong>Location:</strong> {location}</p>
<p><strong>Meeting hours:</strong> {hours}</p>
</div>
<h2 style="margin-top:2rem">Send a message</h2>
<form method="post" action="{action}">
<p><input name="name" placeholder="Your name" required></p>
<p><input name="email" type="email" placeholder="Email" required></p>
<p><textarea name="message" rows="5" placeholder="Message" required></textarea></p>
<button type="submit">Send</button>
</form>"#,
        phone = escape(&site.contact_phone),
        location = escape(&site.contact_location),
        hours = escape(&site.meeting_hours),
        action = escape(&site.contact_form_action),
    );
    layout(site, "Contact", &body)
}

pub fn location(site: &SiteConfig) -> String {
    let address: String = site
        .address_lines
        .iter()
        .map(|l| format!("{}<br>", escape(l)))
        .collect();
    let hours: String = site
        .opening_hours
        .iter()
        .map(|h| format!("<li>{}</li>", escape(h)))
        .collect();
    let body = format!(
        r#"<h2>Location</h2>
<div class="card">
<p>{address}</p>
<ul>{hours}</ul>
</div>
<iframe src="{map}" width="100%" height="400" style="border:0;margin-top:1rem" loading="lazy"></iframe>"#,
        address = address,
        hours = hours,
        map = escape(&site.map_embed_url),
    );
    layout(site, "Location", &body)
}

/// Administration happens from the command line
pub fn login(site: &SiteConfig) -> String {
    let body = r#"<h2>Administration</h2>
<div class="card">
<p>Administrators sign in from the command line:</p>
<p><code>cemboard login --token &lt;TOKEN&gt;</code></p>
<p>Your session has ended or was rejected. Sign in again to continue.</p>
</div>"#;
    layout(site, "Login", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_uses_configured_relay() {
        let site = SiteConfig {
            contact_form_action: "https://relay.example/x".to_string(),
            ..Default::default()
        };
        let page = contact(&site);
        assert!(page.contains(r#"action="https://relay.example/x""#));
        assert!(page.contains(&site.meeting_hours));
    }

    #[test]
    fn test_stats_unavailable() {
        let page = stats(&SiteConfig::default(), None);
        assert!(page.contains(UNAVAILABLE));
    }

    #[test]
    fn test_stats_table() {
        let computed = CemeteryStats::compute(&[]);
        let page = stats(&SiteConfig::default(), Some(&computed));
        assert!(page.contains("<td>61+</td><td>0</td>"));
    }
}
