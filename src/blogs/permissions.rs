use axum::http::Method;

use crate::{auth::repo_types::UserId, blogs::repo_types::BlogRecord};

/// Methods that never modify a blog.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Anyone may read a blog; only its author may modify it.
pub fn is_owner_or_read_only(method: &Method, blog: &BlogRecord, caller: Option<UserId>) -> bool {
    if is_safe_method(method) {
        return true;
    }
    caller == Some(blog.author_id)
}
