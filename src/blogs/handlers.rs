use axum::{
    extract::State,
    http::{Method, StatusCode},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{AuthUser, MaybeAuthUser},
    blogs::{
        dto::{BlogInput, BlogPatch, BlogResponse},
        permissions::is_owner_or_read_only,
        repo_types::{BlogChanges, BlogId, BlogRecord, NewBlog},
    },
    error::AppError,
    extract::{Json, Path},
    state::AppState,
};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs/", get(list_blogs).post(create_blog))
        .route(
            "/blogs/:id/",
            get(get_blog)
                .put(replace_blog)
                .patch(patch_blog)
                .delete(delete_blog),
        )
}

/// Loads a blog and applies the ownership predicate for `method`.
async fn authorized_blog(
    state: &AppState,
    method: &Method,
    id: BlogId,
    caller: &MaybeAuthUser,
) -> Result<BlogRecord, AppError> {
    let blog = state.blogs.find(id).await?.ok_or(AppError::NotFound)?;

    if !is_owner_or_read_only(method, &blog, caller.id()) {
        return Err(match caller.id() {
            None => AppError::AuthenticationRequired,
            Some(user_id) => {
                warn!(blog_id = id, user_id, author_id = blog.author_id, "non-owner write attempt");
                AppError::PermissionDenied
            }
        });
    }
    Ok(blog)
}

#[instrument(skip(state, _caller))]
pub async fn list_blogs(
    State(state): State<AppState>,
    _caller: MaybeAuthUser,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = state.blogs.list().await?;
    Ok(Json(blogs.into_iter().map(BlogResponse::from).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id, username = %user.username))]
pub async fn create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BlogInput>,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let BlogChanges { title, content } = payload.into();
    let blog = state
        .blogs
        .insert(NewBlog {
            author_id: user.id,
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
        })
        .await?;

    info!(blog_id = blog.id, "blog created");
    Ok((StatusCode::CREATED, Json(blog.into())))
}

#[instrument(skip(state, caller))]
pub async fn get_blog(
    State(state): State<AppState>,
    method: Method,
    caller: MaybeAuthUser,
    Path(id): Path<BlogId>,
) -> Result<Json<BlogResponse>, AppError> {
    let blog = authorized_blog(&state, &method, id, &caller).await?;
    Ok(Json(blog.into()))
}

/// Full update: both `title` and `content` are required.
#[instrument(skip(state, caller, payload))]
pub async fn replace_blog(
    State(state): State<AppState>,
    method: Method,
    caller: MaybeAuthUser,
    Path(id): Path<BlogId>,
    payload: Result<Json<BlogInput>, AppError>,
) -> Result<Json<BlogResponse>, AppError> {
    authorized_blog(&state, &method, id, &caller).await?;
    let Json(input) = payload?;
    update(&state, id, input.into()).await
}

/// Partial update: any subset of `title` and `content`.
#[instrument(skip(state, caller, payload))]
pub async fn patch_blog(
    State(state): State<AppState>,
    method: Method,
    caller: MaybeAuthUser,
    Path(id): Path<BlogId>,
    payload: Result<Json<BlogPatch>, AppError>,
) -> Result<Json<BlogResponse>, AppError> {
    authorized_blog(&state, &method, id, &caller).await?;
    let Json(patch) = payload?;
    update(&state, id, patch.into()).await
}

async fn update(
    state: &AppState,
    id: BlogId,
    changes: BlogChanges,
) -> Result<Json<BlogResponse>, AppError> {
    // A concurrent delete between the permission check and here surfaces as 404.
    let blog = state
        .blogs
        .update(id, changes)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(blog_id = id, "blog updated");
    Ok(Json(blog.into()))
}

#[instrument(skip(state, caller))]
pub async fn delete_blog(
    State(state): State<AppState>,
    method: Method,
    caller: MaybeAuthUser,
    Path(id): Path<BlogId>,
) -> Result<StatusCode, AppError> {
    authorized_blog(&state, &method, id, &caller).await?;

    if !state.blogs.delete(id).await? {
        return Err(AppError::NotFound);
    }

    info!(blog_id = id, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
