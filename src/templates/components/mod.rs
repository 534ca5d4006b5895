use chrono::DateTime;
use maud::{html, Markup};

use crate::domain::need::NeedSummary;
use crate::domain::resource::ResourceSummary;
use crate::domain::status::{NeedStatus, ReportType};
use crate::domain::target::{Target, TargetKind};
use crate::domain::trust::{TrustReport, TrustState};

pub mod error;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Unix seconds as `YYYY-MM-DD HH:MM` (UTC).
pub fn timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

pub fn status_badge(status: NeedStatus) -> Markup {
    html! {
        span class=(format!("badge badge-{}", status)) { (status) }
    }
}

/// Verified / flagged markers. Kinds without the columns render nothing.
pub fn trust_badges(state: &TrustState) -> Markup {
    html! {
        @if state.is_verified == Some(true) {
            span class="badge badge-verified" { "Verified" }
        }
        @if let Some(n) = state.flag_count.filter(|n| *n > 0) {
            span class="badge badge-flagged" { "Flagged (" (n) ")" }
        }
    }
}

pub fn need_row(s: &NeedSummary) -> Markup {
    let need = &s.need;
    html! {
        li class=(if need.status.is_active() { "need-row" } else { "need-row closed" }) {
            a href=(format!("/needs/{}", need.id)) { (need.title) }
            " "
            (status_badge(need.status))
            @if need.is_verified {
                span class="badge badge-verified" { "Verified" }
            }
            @if need.is_flagged {
                span class="badge badge-flagged" { "Flagged" }
            }
            small {
                " " (s.disaster_name)
                @if let Some(category) = &s.category_name { " · " (category) }
                @if !need.city.is_empty() { " · " (need.city) }
            }
        }
    }
}

pub fn need_list(needs: &[NeedSummary]) -> Markup {
    html! {
        @if needs.is_empty() {
            p class="empty" { "Nothing here yet." }
        } @else {
            ul class="need-list" {
                @for s in needs { (need_row(s)) }
            }
        }
    }
}

/// Page for a target when it has one, else its JSON trust record.
pub fn target_path(target: Target) -> String {
    match target.kind {
        TargetKind::Need => format!("/needs/{}", target.id),
        TargetKind::Resource => format!("/resources/{}", target.id),
        TargetKind::Organization => format!("/organizations/{}", target.id),
        _ => format!("/api/trust/{}/{}", target.kind, target.id),
    }
}

/// Report, verify and clear-flags forms for one target.
pub fn trust_actions(trust: &TrustReport, signed_in: bool, is_moderator: bool) -> Markup {
    let target = trust.state.target;
    let base = format!("/{}s/{}", target.kind, target.id);
    html! {
        form method="post" action=(format!("{base}/report")) class="report-form" {
            select name="report_type" {
                @for t in ReportType::ALL {
                    option value=(t) { (t) }
                }
            }
            input type="text" name="description" placeholder="What is wrong?" required;
            @if !signed_in {
                input type="email" name="reporter_email" placeholder="Your email" required;
            }
            button type="submit" { "Report" }
        }
        @if is_moderator && trust.state.is_verified.is_some() {
            form method="post" action=(format!("{base}/verify")) {
                input type="text" name="notes" placeholder="Verification notes";
                button type="submit" { "Verify" }
            }
        }
        @if is_moderator && trust.state.flag_count.is_some_and(|n| n > 0) {
            form method="post" action=(format!("{base}/clear-flags")) {
                button type="submit" { "Clear flags" }
            }
        }
    }
}

pub fn history_card(trust: &TrustReport) -> Markup {
    card("History", html! {
        ol class="history" {
            @for entry in &trust.history {
                li {
                    small { (timestamp(entry.timestamp)) } " "
                    strong { (entry.action) } " " (entry.description)
                }
            }
        }
        @if trust.open_reports > 0 {
            p { (trust.open_reports) " open report(s)" }
        }
    })
}

pub fn resource_row(s: &ResourceSummary) -> Markup {
    let r = &s.resource;
    html! {
        li class="resource-row" {
            a href=(format!("/resources/{}", r.id)) { (r.description) }
            @if !r.quantity.is_empty() { " (" (r.quantity) ")" }
            " · " (r.status)
            @if r.is_verified {
                span class="badge badge-verified" { "Verified" }
            }
            small {
                " for " a href=(format!("/needs/{}", r.need_id)) { (s.need_title) }
                @if let Some(provider) = &s.provider_name { " · by " (provider) }
                @if let Some(category) = &s.category_name { " · " (category) }
            }
        }
    }
}

