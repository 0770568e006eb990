use dioxus::prelude::*;
use dioxus_router::Link;
use olympiad_core::model::{Blog, ReaderFilter, find_by_slug, related};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::state::{ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::{format_date, markdown_excerpt, markdown_to_html};

const EXCERPT_CHARS: usize = 160;
const RELATED_POSTS: usize = 3;

fn use_published_blogs() -> Resource<Result<Vec<Blog>, ViewError>> {
    let ctx = use_context::<AppContext>();
    let blogs = ctx.blogs();
    use_resource(move || {
        let blogs = blogs.clone();
        async move { Ok::<_, ViewError>(blogs.list().await?) }
    })
}

/// Public blog index with search plus category and tag chips.
#[component]
pub fn BlogListView() -> Element {
    let mut posts = use_published_blogs();
    let mut filter = use_signal(ReaderFilter::default);

    let body = match view_state_from_resource(&posts) {
        ViewState::Error(error) => rsx! {
            ErrorPanel { error, on_retry: move |()| posts.restart() }
        },
        ViewState::Loading | ViewState::Idle => rsx! {
            p { class: "muted", "Loading articles..." }
        },
        ViewState::Ready(all) => {
            let current = filter();
            let categories = ReaderFilter::categories(&all);
            let tags = ReaderFilter::tags(&all);
            let shown: Vec<Blog> = current.apply(&all).into_iter().cloned().collect();
            rsx! {
                div { class: "chips",
                    button {
                        class: if current.category.is_none() { "chip chip-active" } else { "chip" },
                        onclick: move |_| filter.write().category = None,
                        "All"
                    }
                    for category in categories {
                        button {
                            key: "{category}",
                            class: if current.category.as_deref() == Some(category.as_str()) { "chip chip-active" } else { "chip" },
                            onclick: {
                                let category = category.clone();
                                move |_| filter.write().category = Some(category.clone())
                            },
                            "{category}"
                        }
                    }
                }
                if !tags.is_empty() {
                    div { class: "chips chips-tags",
                        for tag in tags {
                            button {
                                key: "{tag}",
                                class: if current.tag.as_deref() == Some(tag.as_str()) { "chip chip-active" } else { "chip" },
                                onclick: {
                                    let tag = tag.clone();
                                    move |_| {
                                        let mut filter = filter.write();
                                        filter.tag = if filter.tag.as_deref() == Some(tag.as_str()) {
                                            None
                                        } else {
                                            Some(tag.clone())
                                        };
                                    }
                                },
                                "#{tag}"
                            }
                        }
                    }
                }
                if shown.is_empty() {
                    p { class: "empty", "No articles match your search." }
                } else {
                    div { class: "card-grid",
                        for blog in shown {
                            PostCard { key: "{blog.id}", blog: blog.clone() }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "page public-page",
            header { class: "page-header",
                h2 { "Blog" }
                Link { class: "btn", to: Route::Login {}, "Login" }
            }
            input {
                class: "input search",
                r#type: "search",
                placeholder: "Search articles...",
                value: "{filter.read().search}",
                oninput: move |evt| filter.write().search = evt.value(),
            }
            {body}
        }
    }
}

#[component]
fn PostCard(blog: Blog) -> Element {
    let summary = if blog.excerpt.trim().is_empty() {
        markdown_excerpt(&blog.content, EXCERPT_CHARS)
    } else {
        blog.excerpt.clone()
    };
    let published = format_date(blog.published_date);

    rsx! {
        article { class: "card blog-card",
            if let Some(url) = blog.image_url.clone() {
                img { class: "blog-cover", src: "{url}", alt: "{blog.title}" }
            }
            span { class: "category", "{blog.category}" }
            h3 {
                Link { to: Route::BlogPost { slug: blog.slug.clone() }, "{blog.title}" }
            }
            p { class: "excerpt", "{summary}" }
            p { class: "muted", "{blog.author} · {published}" }
        }
    }
}

/// One post by slug, with related reading below it.
#[component]
pub fn BlogPostView(slug: String) -> Element {
    let mut posts = use_published_blogs();

    let body = match view_state_from_resource(&posts) {
        ViewState::Error(error) => rsx! {
            ErrorPanel { error, on_retry: move |()| posts.restart() }
        },
        ViewState::Loading | ViewState::Idle => rsx! {
            p { class: "muted", "Loading article..." }
        },
        ViewState::Ready(all) => match find_by_slug(&all, &slug) {
            None => rsx! {
                div { class: "error-panel",
                    p { class: "error", "This article does not exist." }
                    Link { class: "btn", to: Route::Blogs {}, "Back to Blog" }
                }
            },
            Some(post) => {
                let html = markdown_to_html(&post.content);
                let published = format_date(post.published_date);
                let read_time = post.read_time.clone().unwrap_or_default();
                let others: Vec<Blog> = related(&all, post, RELATED_POSTS)
                    .into_iter()
                    .cloned()
                    .collect();
                rsx! {
                    article { class: "card blog-post",
                        if let Some(url) = post.image_url.clone() {
                            img { class: "blog-cover", src: "{url}", alt: "{post.title}" }
                        }
                        span { class: "category", "{post.category}" }
                        h1 { "{post.title}" }
                        p { class: "muted", "{post.author} · {published} · {read_time}" }
                        div { class: "markdown", dangerous_inner_html: "{html}" }
                        if !post.tags.is_empty() {
                            p { class: "tags",
                                for tag in post.tags.clone() {
                                    span { key: "{tag}", class: "tag", "#{tag}" }
                                }
                            }
                        }
                    }
                    if !others.is_empty() {
                        section { class: "related",
                            h3 { "Related Articles" }
                            div { class: "card-grid",
                                for blog in others {
                                    PostCard { key: "{blog.id}", blog: blog.clone() }
                                }
                            }
                        }
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "page public-page",
            Link { class: "btn", to: Route::Blogs {}, "← All articles" }
            {body}
        }
    }
}
