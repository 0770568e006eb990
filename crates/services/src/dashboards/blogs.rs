use std::sync::Arc;

use olympiad_core::model::{Blog, BlogDraft, BlogId, BlogImage, Capability, SessionUser};
use storage::repository::BlogRepository;
use tracing::info;

use super::authorize;
use crate::error::DashboardError;

const ADMIN_ONLY: &str = "Only admins can manage blogs";

#[derive(Clone)]
pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
}

impl BlogService {
    #[must_use]
    pub fn new(blogs: Arc<dyn BlogRepository>) -> Self {
        Self { blogs }
    }

    /// Blogs are public; no role check.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Api` on request failure.
    pub async fn list(&self) -> Result<Vec<Blog>, DashboardError> {
        Ok(self.blogs.list_blogs().await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid`, `DashboardError::Forbidden` or
    /// `DashboardError::Api`.
    pub async fn create(
        &self,
        viewer: &SessionUser,
        draft: BlogDraft,
        image: Option<BlogImage>,
    ) -> Result<Blog, DashboardError> {
        authorize(viewer, Capability::ManageBlogs, ADMIN_ONLY)?;
        let valid = draft.validate()?;
        let blog = self.blogs.create_blog(&valid, image.as_ref()).await?;
        info!(blog_id = %blog.id, with_image = image.is_some(), "blog created");
        Ok(blog)
    }

    /// # Errors
    ///
    /// Same as `create`.
    pub async fn update(
        &self,
        viewer: &SessionUser,
        id: &BlogId,
        draft: BlogDraft,
        image: Option<BlogImage>,
    ) -> Result<Blog, DashboardError> {
        authorize(viewer, Capability::ManageBlogs, ADMIN_ONLY)?;
        let valid = draft.validate()?;
        Ok(self.blogs.update_blog(id, &valid, image.as_ref()).await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` or `DashboardError::Api`.
    pub async fn remove(&self, viewer: &SessionUser, id: &BlogId) -> Result<(), DashboardError> {
        authorize(viewer, Capability::ManageBlogs, ADMIN_ONLY)?;
        self.blogs.delete_blog(id).await?;
        info!(blog_id = %id, "blog deleted");
        Ok(())
    }
}
