use std::path::Path;

use dioxus::prelude::*;
use olympiad_core::model::{
    Blog, BlogDraft, BlogFilter, BlogId, BlogImage, Capability, DraftErrors, FeaturedFilter,
};
use services::ListState;

use crate::context::{AppContext, SessionHandle};
use crate::views::form::{ConfirmDialog, FormMode, TextArea, TextField, field_error};
use crate::views::state::{Banner, ErrorPanel, ViewError, ViewState, view_state_from_resource};
use crate::vm::{format_date, markdown_excerpt, markdown_to_html};

const EXCERPT_CHARS: usize = 160;

/// Reads the cover image picked by path; blank means "keep the current one".
async fn read_image(path: &str) -> Result<Option<BlogImage>, DraftErrors> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        let mut errors = DraftErrors::new();
        errors.push("image", format!("Could not read image: {err}"));
        errors
    })?;
    let file_name = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned());
    BlogImage::new(file_name, bytes).map(Some)
}

#[component]
pub fn BlogsView() -> Element {
    let ctx = use_context::<AppContext>();
    let session = use_context::<SessionHandle>();
    let blogs = ctx.blogs();

    let list = use_signal(ListState::<Blog>::new);
    let mut filter = use_signal(BlogFilter::default);
    let banner = use_signal(|| None::<String>);
    let mut mode = use_signal(|| FormMode::<BlogId>::Closed);
    let mut draft = use_signal(BlogDraft::default);
    let mut tag_input = use_signal(String::new);
    let mut image_path = use_signal(String::new);
    let mut errors = use_signal(|| None::<DraftErrors>);
    let saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<Blog>);

    let mut loader = use_resource({
        let blogs = blogs.clone();
        move || {
            let blogs = blogs.clone();
            let mut list = list;
            async move {
                let ticket = list.write().begin_fetch();
                let rows = blogs.list().await?;
                list.write().finish_fetch(ticket, rows);
                Ok::<_, ViewError>(())
            }
        }
    });

    let on_save = {
        let blogs = blogs.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            let Some(viewer) = session.current() else {
                return;
            };
            let blogs = blogs.clone();
            let target = mode();
            let submitted = draft();
            let path = image_path();
            let (mut list, mut banner, mut saving) = (list, banner, saving);
            spawn(async move {
                let image = match read_image(&path).await {
                    Ok(image) => image,
                    Err(found) => {
                        errors.set(Some(found));
                        return;
                    }
                };
                saving.set(true);
                let outcome = match &target {
                    FormMode::Edit(id) => blogs.update(&viewer, id, submitted, image).await,
                    _ => blogs.create(&viewer, submitted, image).await,
                };
                saving.set(false);
                match outcome {
                    Ok(blog) => {
                        if target.is_edit() {
                            list.write().apply_updated(blog);
                        } else {
                            list.write().apply_created(blog);
                        }
                        errors.set(None);
                        image_path.set(String::new());
                        mode.set(FormMode::Closed);
                    }
                    Err(err) => {
                        errors.set(err.field_errors().cloned());
                        banner.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let on_confirm_delete = {
        let blogs = blogs.clone();
        move |()| {
            let Some(blog) = pending_delete.take() else {
                return;
            };
            let Some(viewer) = session.current() else {
                return;
            };
            let blogs = blogs.clone();
            let (mut list, mut banner) = (list, banner);
            spawn(async move {
                match blogs.remove(&viewer, &blog.id).await {
                    Ok(()) => list.write().apply_removed(&blog.id),
                    Err(err) => banner.set(Some(err.user_message())),
                }
            });
        }
    };

    let mut add_tag = move || {
        let tag = tag_input();
        if draft.write().add_tag(&tag) {
            tag_input.set(String::new());
        }
    };

    let can_manage = session
        .current()
        .is_some_and(|user| user.allows(Capability::ManageBlogs));
    let current_filter = filter();
    let rows: Vec<Blog> = current_filter
        .apply(list.read().items())
        .into_iter()
        .cloned()
        .collect();
    let loaded = list.read().is_loaded();
    let load_state = view_state_from_resource(&loader);
    let preview = markdown_to_html(&draft.read().content);
    let tags = draft.read().tags.clone();

    rsx! {
        div { class: "page",
            header { class: "page-header",
                h2 { "Blogs" }
                if can_manage {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| {
                            draft.set(BlogDraft::default());
                            image_path.set(String::new());
                            errors.set(None);
                            mode.set(FormMode::Create);
                        },
                        "New Post"
                    }
                }
            }
            Banner { message: banner }
            div { class: "filters",
                input {
                    class: "input search",
                    r#type: "search",
                    placeholder: "Search by title, author or category...",
                    value: "{current_filter.search}",
                    oninput: move |evt| filter.write().search = evt.value(),
                }
                select {
                    class: "input",
                    value: current_filter.featured.as_str(),
                    onchange: move |evt| filter.write().featured = FeaturedFilter::parse(&evt.value()),
                    option { value: "all", "All Posts" }
                    option { value: "featured", "Featured" }
                    option { value: "not_featured", "Not Featured" }
                }
            }
            if mode.read().is_open() {
                form { class: "card form-card blog-form", onsubmit: on_save,
                    h3 { if mode.read().is_edit() { "Edit Post" } else { "New Post" } }
                    TextField {
                        label: "Title",
                        value: draft.read().title.clone(),
                        on_input: move |value| draft.write().title = value,
                        error: field_error(&errors, "title"),
                    }
                    TextField {
                        label: "Author",
                        value: draft.read().author.clone(),
                        on_input: move |value| draft.write().author = value,
                        error: field_error(&errors, "author"),
                    }
                    TextField {
                        label: "Category",
                        value: draft.read().category.clone(),
                        on_input: move |value| draft.write().category = value,
                        error: field_error(&errors, "category"),
                    }
                    TextField {
                        label: "Read Time",
                        placeholder: "5 min read",
                        value: draft.read().read_time.clone(),
                        on_input: move |value| draft.write().read_time = value,
                    }
                    TextArea {
                        label: "Excerpt",
                        rows: 2,
                        value: draft.read().excerpt.clone(),
                        on_input: move |value| draft.write().excerpt = value,
                        error: field_error(&errors, "excerpt"),
                    }
                    div { class: "editor-split",
                        TextArea {
                            label: "Content (Markdown)",
                            rows: 12,
                            value: draft.read().content.clone(),
                            on_input: move |value| draft.write().content = value,
                            error: field_error(&errors, "content"),
                        }
                        div { class: "markdown-preview", dangerous_inner_html: "{preview}" }
                    }
                    div { class: "field",
                        span { class: "field-label", "Tags" }
                        div { class: "tag-input",
                            input {
                                class: "input",
                                value: "{tag_input}",
                                oninput: move |evt| tag_input.set(evt.value()),
                                onkeydown: move |evt| {
                                    if evt.data.key() == Key::Enter {
                                        evt.prevent_default();
                                        add_tag();
                                    }
                                },
                            }
                            button { class: "btn", r#type: "button", onclick: move |_| add_tag(), "Add" }
                        }
                        div { class: "tags",
                            for tag in tags {
                                span { class: "tag",
                                    "{tag}"
                                    button {
                                        class: "tag-remove",
                                        r#type: "button",
                                        onclick: move |_| draft.write().remove_tag(&tag),
                                        "×"
                                    }
                                }
                            }
                        }
                    }
                    TextField {
                        label: "Image URL",
                        value: draft.read().image_url.clone(),
                        on_input: move |value| draft.write().image_url = value,
                        error: field_error(&errors, "image_url"),
                    }
                    TextField {
                        label: "Upload Image (file path)",
                        placeholder: "/path/to/cover.png",
                        value: image_path(),
                        on_input: move |value| image_path.set(value),
                        error: field_error(&errors, "image"),
                    }
                    label { class: "checkbox",
                        input {
                            r#type: "checkbox",
                            checked: draft.read().featured,
                            onchange: move |evt| draft.write().featured = evt.checked(),
                        }
                        span { "Featured post" }
                    }
                    div { class: "form-actions",
                        button {
                            class: "btn",
                            r#type: "button",
                            onclick: move |_| mode.set(FormMode::Closed),
                            "Cancel"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: saving(),
                            if saving() { "Saving..." } else { "Publish" }
                        }
                    }
                }
            }
            match load_state {
                ViewState::Error(error) if !loaded => rsx! {
                    ErrorPanel { error, on_retry: move |()| loader.restart() }
                },
                ViewState::Loading | ViewState::Idle if !loaded => rsx! {
                    p { class: "muted", "Loading posts..." }
                },
                _ => rsx! {
                    if rows.is_empty() {
                        p { class: "empty", "No posts found." }
                    } else {
                        div { class: "blog-grid",
                            for blog in rows.iter() {
                                BlogCard {
                                    key: "{blog.id}",
                                    blog: blog.clone(),
                                    can_manage,
                                    on_edit: move |blog: Blog| {
                                        draft.set(blog.to_draft());
                                        image_path.set(String::new());
                                        errors.set(None);
                                        mode.set(FormMode::Edit(blog.id));
                                    },
                                    on_delete: move |blog: Blog| pending_delete.set(Some(blog)),
                                }
                            }
                        }
                    }
                },
            }
            if let Some(blog) = pending_delete.read().clone() {
                ConfirmDialog {
                    message: format!("Delete \"{}\"? This cannot be undone.", blog.title),
                    confirm_label: "Delete",
                    on_confirm: on_confirm_delete,
                    on_cancel: move |()| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn BlogCard(
    blog: Blog,
    can_manage: bool,
    on_edit: EventHandler<Blog>,
    on_delete: EventHandler<Blog>,
) -> Element {
    let summary = if blog.excerpt.trim().is_empty() {
        markdown_excerpt(&blog.content, EXCERPT_CHARS)
    } else {
        blog.excerpt.clone()
    };
    let published = format_date(blog.published_date);
    let read_time = blog.read_time.clone().unwrap_or_default();
    let edit_target = blog.clone();
    let delete_target = blog.clone();

    rsx! {
        article { class: "card blog-card",
            if let Some(url) = blog.image_url.clone() {
                img { class: "blog-cover", src: "{url}", alt: "{blog.title}" }
            }
            div { class: "blog-meta",
                span { class: "category", "{blog.category}" }
                if blog.featured {
                    span { class: "badge badge-featured", "Featured" }
                }
            }
            h3 { "{blog.title}" }
            p { class: "excerpt", "{summary}" }
            p { class: "muted", "{blog.author} · {published} · {read_time}" }
            div { class: "tags",
                for tag in blog.tags.iter() {
                    span { class: "tag", "{tag}" }
                }
            }
            if can_manage {
                div { class: "actions",
                    button { class: "btn btn-small", onclick: move |_| on_edit.call(edit_target.clone()), "Edit" }
                    button {
                        class: "btn btn-small btn-danger",
                        onclick: move |_| on_delete.call(delete_target.clone()),
                        "Delete"
                    }
                }
            }
        }
    }
}
