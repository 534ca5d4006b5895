use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, is_moderator: bool, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Relief Board" }
                link rel="icon" href="/static/favicon/favicon.ico";
                link rel="stylesheet" href="/static/main.css";
                script src="/static/htmx.js" defer {};
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    h3 { a href="/" { "Relief Board" } }
                    nav {
                        ul {
                            li { a href="/" { "Home" } }
                            li { a href="/needs?type=problem" { "Problems" } }
                            li { a href="/needs?type=service" { "Services" } }
                            li { a href="/resources" { "Resources" } }
                            li { a href="/disasters" { "Disasters" } }
                            @if is_moderator {
                                li { a href="/moderation" { "Moderation" } }
                            }
                        }
                    }
                }
                main class="container" {
                    (content)
                }
            }
        }
    }
}
