use std::fmt;

use chrono::NaiveDate;
use url::Url;

use crate::model::ids::BlogId;
use crate::model::validation::{DraftErrors, normalize_optional, trimmed};

/// A published blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub read_time: Option<String>,
    pub published_date: Option<NaiveDate>,
}

impl Blog {
    #[must_use]
    pub fn to_draft(&self) -> BlogDraft {
        BlogDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            excerpt: self.excerpt.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
            featured: self.featured,
            read_time: self.read_time.clone().unwrap_or_default(),
        }
    }
}

/// Featured dropdown on the blog list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeaturedFilter {
    #[default]
    All,
    Featured,
    NotFeatured,
}

impl FeaturedFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Featured => "featured",
            Self::NotFeatured => "not_featured",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "featured" => Self::Featured,
            "not_featured" => Self::NotFeatured,
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub search: String,
    pub featured: FeaturedFilter,
}

impl BlogFilter {
    /// Search hits title, author or category, case-insensitively.
    #[must_use]
    pub fn matches(&self, blog: &Blog) -> bool {
        let term = self.search.trim().to_lowercase();
        let search_ok = term.is_empty()
            || [&blog.title, &blog.author, &blog.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
        let featured_ok = match self.featured {
            FeaturedFilter::All => true,
            FeaturedFilter::Featured => blog.featured,
            FeaturedFilter::NotFeatured => !blog.featured,
        };
        search_ok && featured_ok
    }

    #[must_use]
    pub fn apply<'a>(&self, blogs: &'a [Blog]) -> Vec<&'a Blog> {
        blogs.iter().filter(|blog| self.matches(blog)).collect()
    }
}

/// Search box plus category and tag chips on the public blog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderFilter {
    pub search: String,
    /// `None` means every category.
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl ReaderFilter {
    /// Search hits title or excerpt, case-insensitively.
    #[must_use]
    pub fn matches(&self, blog: &Blog) -> bool {
        let term = self.search.trim().to_lowercase();
        let search_ok = term.is_empty()
            || blog.title.to_lowercase().contains(&term)
            || blog.excerpt.to_lowercase().contains(&term);
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| blog.category == category);
        let tag_ok = self
            .tag
            .as_deref()
            .is_none_or(|tag| blog.tags.iter().any(|existing| existing == tag));
        search_ok && category_ok && tag_ok
    }

    #[must_use]
    pub fn apply<'a>(&self, blogs: &'a [Blog]) -> Vec<&'a Blog> {
        blogs.iter().filter(|blog| self.matches(blog)).collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(blogs: &[Blog]) -> Vec<String> {
        first_seen(blogs.iter().map(|blog| blog.category.as_str()))
    }

    #[must_use]
    pub fn tags(blogs: &[Blog]) -> Vec<String> {
        first_seen(blogs.iter().flat_map(|blog| blog.tags.iter().map(String::as_str)))
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.trim().is_empty() && !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Looks a post up by its URL slug.
#[must_use]
pub fn find_by_slug<'a>(blogs: &'a [Blog], slug: &str) -> Option<&'a Blog> {
    blogs.iter().find(|blog| blog.slug == slug)
}

/// Up to `limit` other posts, same category first.
#[must_use]
pub fn related<'a>(blogs: &'a [Blog], post: &Blog, limit: usize) -> Vec<&'a Blog> {
    let others = || blogs.iter().filter(|blog| blog.id != post.id);
    others()
        .filter(|blog| blog.category == post.category)
        .chain(others().filter(|blog| blog.category != post.category))
        .take(limit)
        .collect()
}

/// Cover image attached to a blog write.
#[derive(Clone, PartialEq, Eq)]
pub struct BlogImage {
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl BlogImage {
    /// Accepts PNG and JPEG files, detected from the file's leading bytes.
    ///
    /// # Errors
    ///
    /// Returns `DraftErrors` for any other file type.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DraftErrors> {
        let content_type = if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            "image/png"
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            "image/jpeg"
        } else {
            let mut errors = DraftErrors::new();
            errors.push("image", "Please upload a valid image file (PNG, JPG, or JPEG)");
            return Err(errors);
        };
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for BlogImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlogImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Create/edit blog form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub featured: bool,
    pub read_time: String,
}

impl BlogDraft {
    /// Adds a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|existing| existing != tag);
    }

    /// # Errors
    ///
    /// Returns missing title, content, author or category and an unparseable
    /// image URL.
    pub fn validate(self) -> Result<ValidBlog, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("title", "Title", &self.title);
        errors.require("content", "Content", &self.content);
        errors.require("author", "Author", &self.author);
        errors.require("category", "Category", &self.category);
        let image_url = normalize_optional(Some(self.image_url));
        if let Some(raw) = image_url.as_deref() {
            if Url::parse(raw).is_err() {
                errors.push("image_url", "Image URL must be a valid URL");
            }
        }
        errors.into_result()?;

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = trimmed(&tag);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(ValidBlog {
            title: trimmed(&self.title),
            content: self.content,
            excerpt: trimmed(&self.excerpt),
            author: trimmed(&self.author),
            category: trimmed(&self.category),
            tags,
            image_url,
            featured: self.featured,
            read_time: normalize_optional(Some(self.read_time)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBlog {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub read_time: Option<String>,
}

impl ValidBlog {
    /// URL slug derived from the title.
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        for ch in self.title.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }

    /// The record as it looks once stored under `id`.
    #[must_use]
    pub fn into_blog(self, id: BlogId, published_date: Option<NaiveDate>) -> Blog {
        let slug = self.slug();
        Blog {
            id,
            title: self.title,
            slug,
            content: self.content,
            excerpt: self.excerpt,
            author: self.author,
            category: self.category,
            tags: self.tags,
            image_url: self.image_url,
            featured: self.featured,
            read_time: self.read_time,
            published_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BlogDraft {
        BlogDraft {
            title: "  Olympiad Prep: 5 Tips!  ".into(),
            content: "# Start early".into(),
            author: "Team".into(),
            category: "Guides".into(),
            tags: vec!["maths".into(), " maths ".into(), "".into(), "science".into()],
            ..BlogDraft::default()
        }
    }

    #[test]
    fn validate_requires_core_fields() {
        let errors = BlogDraft::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|err| err.field).collect();
        assert_eq!(fields, vec!["title", "content", "author", "category"]);
    }

    #[test]
    fn validate_dedupes_tags_and_builds_slug() {
        let valid = draft().validate().unwrap();
        assert_eq!(valid.tags, vec!["maths", "science"]);
        assert_eq!(valid.slug(), "olympiad-prep-5-tips");
    }

    #[test]
    fn rejects_bad_image_url() {
        let errors = BlogDraft {
            image_url: "not a url".into(),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert!(errors.message_for("image_url").is_some());
    }

    #[test]
    fn add_tag_skips_duplicates() {
        let mut draft = BlogDraft::default();
        assert!(draft.add_tag(" news "));
        assert!(!draft.add_tag("news"));
        assert!(!draft.add_tag("  "));
        draft.remove_tag("news");
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn image_accepts_png_and_jpeg_only() {
        let png = BlogImage::new("a.png", vec![0x89, b'P', b'N', b'G', 0x0D]).unwrap();
        assert_eq!(png.content_type(), "image/png");
        let jpeg = BlogImage::new("a.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert_eq!(jpeg.content_type(), "image/jpeg");
        assert!(BlogImage::new("a.gif", b"GIF89a".to_vec()).is_err());
    }

    #[test]
    fn reader_finds_by_slug_and_filters_by_tag() {
        let first = draft().validate().unwrap().into_blog(BlogId::new("1"), None);
        let mut second = first.clone();
        second.id = BlogId::new("2");
        second.slug = "exam-day".into();
        second.title = "Exam day".into();
        second.category = "News".into();
        second.tags = vec!["events".into()];
        let blogs = vec![first, second];

        assert_eq!(find_by_slug(&blogs, "exam-day").map(|blog| blog.id.clone()), Some(BlogId::new("2")));
        assert!(find_by_slug(&blogs, "missing").is_none());
        assert_eq!(ReaderFilter::categories(&blogs), vec!["Guides", "News"]);
        assert_eq!(ReaderFilter::tags(&blogs), vec!["maths", "science", "events"]);

        let filter = ReaderFilter {
            tag: Some("maths".into()),
            ..ReaderFilter::default()
        };
        assert_eq!(filter.apply(&blogs)[0].id, BlogId::new("1"));
        let filter = ReaderFilter {
            search: "EXAM".into(),
            category: Some("News".into()),
            tag: None,
        };
        assert_eq!(filter.apply(&blogs).len(), 1);
        assert_eq!(related(&blogs, &blogs[0], 3).len(), 1);
    }

    #[test]
    fn filter_by_featured_and_search() {
        let featured = draft()
            .validate()
            .unwrap()
            .into_blog(BlogId::new("1"), None);
        let mut plain = featured.clone();
        plain.id = BlogId::new("2");
        plain.featured = false;
        plain.author = "Someone".into();
        let mut featured = featured;
        featured.featured = true;
        let blogs = vec![featured, plain];

        let filter = BlogFilter {
            search: String::new(),
            featured: FeaturedFilter::NotFeatured,
        };
        assert_eq!(filter.apply(&blogs).len(), 1);
        let filter = BlogFilter {
            search: "someone".into(),
            featured: FeaturedFilter::All,
        };
        assert_eq!(filter.apply(&blogs)[0].id, BlogId::new("2"));
    }
}
